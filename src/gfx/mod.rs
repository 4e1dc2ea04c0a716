//! # Graphics Module
//!
//! Everything between the scene description and the pixels:
//!
//! - **Camera System** ([`camera`]) - orthonormal-basis free camera with
//!   chase/photo/observer control
//! - **Scene Graph** ([`scene`]) - transform-linked nodes, groups and the
//!   drivable car
//! - **Geometry** ([`geometry`]) - primitive and structure tessellation
//! - **Resources** ([`resources`]) - shared meshes, materials, textures
//! - **Rendering** ([`rendering`]) - the wgpu forward pass

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::Camera;
pub use rendering::RenderEngine;
