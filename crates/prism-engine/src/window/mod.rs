//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the element window, and wires them to the GPU layer.

mod host;
mod runtime;

pub use host::{Host, MonitorInfo};
pub use runtime::{FullscreenTarget, Runtime, RuntimeCommand, RuntimeConfig, RuntimeCtx};
