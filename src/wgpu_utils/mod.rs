//! Small wgpu helpers shared by the rendering module.

pub mod uniform_buffer;

pub use uniform_buffer::UniformBuffer;
