//! GPU uniform layouts.
//!
//! Two uniform blocks drive the scene shader: one per frame (projection,
//! view, sun and lamps, with light vectors pre-transformed into view space so
//! the fragment shader never needs the inverse view matrix) and one per
//! draw (model matrix plus the bound material and the normal-map switch).

use cgmath::{Matrix4, Vector3, Vector4};

use crate::gfx::camera::Camera;
use crate::gfx::resources::Material;
use crate::world::{World, MAX_LAMPS};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// View-space sun travel direction; w unused.
    pub sun_direction: [f32; 4],
    pub sun_intensity: [f32; 4],
    /// View-space lamp positions; w = 1 for live lamps, 0 for empty slots.
    pub lamp_positions: [[f32; 4]; MAX_LAMPS],
    pub lamp_intensity: [f32; 4],
}

impl FrameUniform {
    pub fn new(camera: &Camera, world: &World) -> Self {
        let view = camera.view_matrix();

        // Directions rotate but never translate.
        let mut rotation_only = view;
        rotation_only.w = Vector4::new(0.0, 0.0, 0.0, 1.0);
        let sun_view = rotation_only * world.sun_direction().extend(0.0);

        let mut lamp_positions = [[0.0f32; 4]; MAX_LAMPS];
        for (i, lamp) in world.lamp_positions().iter().enumerate() {
            let p = view * lamp.extend(1.0);
            let live = if i < world.lamp_count() { 1.0 } else { 0.0 };
            lamp_positions[i] = [p.x, p.y, p.z, live];
        }

        Self {
            proj: camera.projection_matrix().into(),
            view: view.into(),
            sun_direction: [sun_view.x, sun_view.y, sun_view.z, 0.0],
            sun_intensity: vec3_to_array(world.sun_intensity()),
            lamp_positions,
            lamp_intensity: vec3_to_array(world.lamp_intensity()),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub emission: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// x = specular exponent, y = normal-map switch; z, w unused.
    pub params: [f32; 4],
}

impl DrawUniform {
    pub fn new(model: Matrix4<f32>, material: &Material, normal_map: bool) -> Self {
        Self {
            model: model.into(),
            emission: vec3_to_array(material.emission),
            ambient: vec3_to_array(material.ambient),
            diffuse: vec3_to_array(material.diffuse),
            specular: vec3_to_array(material.specular),
            params: [material.shine, if normal_map { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }
}

fn vec3_to_array(v: Vector3<f32>) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_uniform_packs_the_material() {
        let material = Material::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.2, 0.4, 0.6),
            Vector3::new(0.5, 0.5, 0.5),
            40.0,
        );
        let uniform = DrawUniform::new(cgmath::SquareMatrix::identity(), &material, true);
        assert_eq!(uniform.diffuse, [0.2, 0.4, 0.6, 0.0]);
        assert_eq!(uniform.params, [40.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        // The shader-side structs mirror these sizes exactly; a drift here
        // corrupts every draw.
        assert_eq!(std::mem::size_of::<FrameUniform>(), 64 * 2 + 16 * 2 + 16 * 12 + 16);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 64 + 16 * 5);
    }
}
