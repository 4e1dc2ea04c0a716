//! # Primitive Shape Generation
//!
//! Cone, cylinder, disk, cube and quad tessellators.
//!
//! The circular shapes are built in the xy plane and extrude along +Z, so a
//! group transform of rotate(-X, pi/2) stands them upright in the Y-up
//! world. Cones and cylinders are open; see
//! [`crate::world::builders::capped_cone`] and
//! [`crate::world::builders::capped_cylinder`] for the closed variants.

use cgmath::{InnerSpace, Vector3};
use std::f32::consts::TAU;

use super::MeshData;

/// Generate an open cone with its base circle in the xy plane and its apex
/// at (0, 0, `height`).
///
/// # Arguments
/// * `radius` - Radius of the base circle
/// * `height` - Apex distance along +Z
/// * `slices` - Number of segments around the circle (min 3)
pub fn generate_cone(radius: f32, height: f32, slices: u32) -> MeshData {
    let mut data = MeshData::new();
    let slices = slices.max(3);

    for x in 0..slices {
        let theta0 = TAU * x as f32 / slices as f32;
        let theta1 = TAU * (x + 1) as f32 / slices as f32;
        // The apex normal is sampled halfway along the slice so shading
        // stays symmetric around the seam.
        let mid = (theta0 + theta1) / 2.0;

        data.push_vertex(
            [radius * theta0.cos(), radius * theta0.sin(), 0.0],
            cone_normal(radius, height, theta0),
        );
        data.push_vertex([0.0, 0.0, height], cone_normal(radius, height, mid));

        data.push_triangle(x * 2, ((x + 1) % slices) * 2, x * 2 + 1);
    }

    data
}

fn cone_normal(radius: f32, height: f32, theta: f32) -> [f32; 3] {
    let rim = Vector3::new(radius * theta.cos(), radius * theta.sin(), 0.0);
    let outward = rim.normalize();
    let slant = (rim - Vector3::new(0.0, 0.0, height)).normalize();
    let tangent = outward.cross(slant).normalize();
    slant.cross(tangent).normalize().into()
}

/// Generate an open cylinder from z = 0 to z = `height`.
///
/// # Arguments
/// * `radius` - Radius of the tube
/// * `height` - Extent along +Z
/// * `slices` - Number of segments around the circle (min 3)
pub fn generate_cylinder(radius: f32, height: f32, slices: u32) -> MeshData {
    let mut data = MeshData::new();
    let slices = slices.max(3);

    for x in 0..slices {
        let theta = TAU * x as f32 / slices as f32;
        let (sin, cos) = theta.sin_cos();
        let normal = [cos, sin, 0.0];

        data.push_vertex([radius * cos, radius * sin, height], normal);
        data.push_vertex([radius * cos, radius * sin, 0.0], normal);

        let s0 = x * 2;
        let s1 = ((x + 1) % slices) * 2; // 0--2 ...
        data.push_triangle(s0, s0 + 1, s1 + 1); // |  |
        data.push_triangle(s1 + 1, s1, s0); // 1--3 ...
    }

    data
}

/// Generate a disk in the xy plane facing +Z, centered at the origin.
pub fn generate_disk(radius: f32, slices: u32) -> MeshData {
    let mut data = MeshData::new();
    let slices = slices.max(3);
    let up = [0.0, 0.0, 1.0];

    for x in 0..slices {
        let theta = TAU * x as f32 / slices as f32;
        data.push_vertex([radius * theta.cos(), radius * theta.sin(), 0.0], up);
        data.push_triangle(x, (x + 1) % slices, slices);
    }
    // Fan center
    data.push_vertex([0.0, 0.0, 0.0], up);

    data
}

/// Generate a cube with the given side length, centered at the origin.
///
/// Each face carries its own four vertices so normals stay flat.
pub fn generate_cube(side: f32) -> MeshData {
    let mut data = MeshData::new();
    let h = side * 0.5;

    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +Z
        (
            [0.0, 0.0, 1.0],
            [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        ),
        // -Z
        (
            [0.0, 0.0, -1.0],
            [[-h, -h, -h], [-h, h, -h], [h, h, -h], [h, -h, -h]],
        ),
        // -X
        (
            [-1.0, 0.0, 0.0],
            [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
        ),
        // +X
        (
            [1.0, 0.0, 0.0],
            [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]],
        ),
        // +Y
        (
            [0.0, 1.0, 0.0],
            [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]],
        ),
        // -Y
        (
            [0.0, -1.0, 0.0],
            [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
        ),
    ];

    for (normal, corners) in faces {
        let start = data.vertex_count() as u32;
        for corner in corners {
            data.push_vertex(corner, normal);
        }
        data.push_triangle(start, start + 1, start + 2);
        data.push_triangle(start + 2, start + 3, start);
    }

    data
}

/// Generate a two-triangle quad from four corners given in counter-clockwise
/// order, with a single flat normal.
pub fn generate_quad(corners: [[f32; 3]; 4]) -> MeshData {
    let mut data = MeshData::new();

    // Reverse so the winding comes out counter-clockwise for the rasterizer.
    let p: Vec<Vector3<f32>> = corners.iter().rev().map(|&c| Vector3::from(c)).collect();
    let normal: [f32; 3] = (p[1] - p[0]).cross(p[2] - p[0]).normalize().into();

    for corner in &p {
        data.push_vertex((*corner).into(), normal);
    }
    data.push_triangle(0, 1, 2);
    data.push_triangle(0, 2, 3);

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::InnerSpace;

    #[test]
    fn cone_counts() {
        let cone = generate_cone(1.0, 4.0, 16);
        assert_eq!(cone.vertex_count(), 32); // rim + apex per slice
        assert_eq!(cone.triangle_count(), 16);
    }

    #[test]
    fn cone_normals_are_unit_and_outward() {
        let cone = generate_cone(1.0, 2.0, 8);
        for (p, n) in cone.positions.iter().zip(&cone.normals) {
            let n = cgmath::Vector3::from(*n);
            assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);
            // Slant normals must not point into the cone axis.
            if p[2] == 0.0 {
                assert!(n.x * p[0] + n.y * p[1] > 0.0);
            }
        }
    }

    #[test]
    fn cylinder_counts() {
        let cyl = generate_cylinder(0.4, 2.0, 8);
        assert_eq!(cyl.vertex_count(), 16);
        assert_eq!(cyl.triangle_count(), 16); // two per slice
    }

    #[test]
    fn disk_has_fan_center_last() {
        let disk = generate_disk(1.0, 12);
        assert_eq!(disk.vertex_count(), 13);
        assert_eq!(disk.triangle_count(), 12);
        assert_eq!(disk.positions[12], [0.0, 0.0, 0.0]);
        // Every triangle fans from the center vertex.
        for tri in disk.indices.chunks(3) {
            assert_eq!(tri[2], 12);
        }
    }

    #[test]
    fn cube_counts_and_extent() {
        let cube = generate_cube(0.5);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        for p in &cube.positions {
            for c in p {
                assert!(c.abs() <= 0.25 + 1e-6);
            }
        }
    }

    #[test]
    fn quad_normal_faces_up_for_floor_ordering() {
        // Same corner ordering the world uses for its ground quad.
        let quad = generate_quad([
            [1.0, 0.0, -1.0],
            [1.0, 0.0, 1.0],
            [-1.0, 0.0, 1.0],
            [-1.0, 0.0, -1.0],
        ]);
        assert_eq!(quad.triangle_count(), 2);
        for n in &quad.normals {
            assert_relative_eq!(n[1], 1.0, epsilon = 1e-5);
        }
    }
}
