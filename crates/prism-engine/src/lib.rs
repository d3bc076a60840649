//! Prism engine crate.
//!
//! This crate owns the platform + GPU runtime pieces the shader element sits on:
//! the winit event loop and element window, the wgpu device/surface, frame timing,
//! input translation and the renderers used to draw the shader and its overlay.

pub mod core;
pub mod coords;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
