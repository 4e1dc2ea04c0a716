//! Raceline
//!
//! An interactive 3D driving-demo renderer built on wgpu and winit. A JSON
//! scene description becomes a forest of transform-linked entity groups
//! (track, trees, lamps, buildings, ground and a drivable car), the track
//! surface gets a procedurally generated normal map, and each frame is
//! rendered from one of three selectable camera viewpoints.

pub mod app;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod procedural;
pub mod wgpu_utils;
pub mod world;

pub use app::RacelineApp;
pub use error::{Error, Result};
