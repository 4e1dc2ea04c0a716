//! Camera system: the orthonormal-basis free camera and its controller.

pub mod controller;
pub mod fly_camera;

pub use controller::{CameraController, CameraMode};
pub use fly_camera::Camera;
