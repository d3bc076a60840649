//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and the element
//! it hosts: lifecycle callbacks plus the contexts handed to them.

mod app;
mod ctx;

pub use app::{AppControl, Element, SurfaceRequest};
pub use ctx::{EventCtx, FrameCtx, WindowCtx};
