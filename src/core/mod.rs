//! Data handed to the renderer.

pub mod uniforms;

pub use uniforms::CameraUniform;
