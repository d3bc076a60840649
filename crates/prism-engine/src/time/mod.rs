//! Time subsystem.
//!
//! One `FrameClock` per element window; call `tick()` once per rendered frame.
//! `FrameTime::elapsed` is the value fed to shader `time` uniforms.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
