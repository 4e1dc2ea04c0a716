//! wgpu rendering: the forward engine and its uniform layouts.

pub mod render_engine;
pub mod uniforms;

pub use render_engine::RenderEngine;
pub use uniforms::{DrawUniform, FrameUniform};
