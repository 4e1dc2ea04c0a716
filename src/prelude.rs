//! Convenience imports for typical raceline applications.
//!
//! ```no_run
//! use raceline::prelude::*;
//!
//! fn main() -> raceline::Result<()> {
//!     let world = World::load("assets/race.json")?;
//!     RacelineApp::new(world)?.run()
//! }
//! ```

pub use crate::app::RacelineApp;
pub use crate::error::{Error, Result};
pub use crate::gfx::camera::{Camera, CameraController, CameraMode};
pub use crate::gfx::resources::{Material, Mesh};
pub use crate::gfx::scene::{DrawCall, DrawSink, EntityGroup, MobileEntity, SceneNode};
pub use crate::world::{SceneDescription, World};

pub use cgmath::{InnerSpace, Matrix4, Vector3};
