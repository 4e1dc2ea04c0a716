//! Scene graph: transform-linked nodes, groups and drivable entities.

pub mod entity;
pub mod mobile;
pub mod vertex;

pub use entity::{DrawCall, DrawSink, EntityGroup, SceneNode};
pub use mobile::MobileEntity;
pub use vertex::Vertex3D;
