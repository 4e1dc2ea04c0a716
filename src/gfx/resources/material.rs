//! Reflectance definitions shared across scene nodes.
//!
//! A [`Material`] is plain data; the render engine packs it into the
//! per-draw uniform each time a node using it is drawn. One instance is
//! typically shared by many nodes (every tree top references the same
//! `Rc<Material>`), so the scene carries one reflectance definition per
//! *kind* of surface, not per node.

use cgmath::Vector3;

/// Phong-style reflectance: emission plus ambient/diffuse/specular response.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Emitted radiance, independent of any light
    pub emission: Vector3<f32>,
    /// Ambient reflectivity
    pub ambient: Vector3<f32>,
    /// Diffuse reflectivity
    pub diffuse: Vector3<f32>,
    /// Specular reflectivity
    pub specular: Vector3<f32>,
    /// Specular exponent
    pub shine: f32,
}

impl Material {
    pub fn new(
        emission: Vector3<f32>,
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
        specular: Vector3<f32>,
        shine: f32,
    ) -> Self {
        Self {
            emission,
            ambient,
            diffuse,
            specular,
            shine,
        }
    }

    /// A matte material with only the diffuse channel set.
    pub fn matte(diffuse: Vector3<f32>) -> Self {
        Self {
            diffuse,
            ..Self::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            emission: Vector3::new(0.0, 0.0, 0.0),
            ambient: Vector3::new(0.0, 0.0, 0.0),
            diffuse: Vector3::new(0.5, 0.5, 0.5),
            specular: Vector3::new(0.0, 0.0, 0.0),
            shine: 1.0,
        }
    }
}
