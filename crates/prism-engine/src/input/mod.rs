//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types. The runtime
//! translates window events into `InputEvent`s (see `platform`).

pub(crate) mod platform;
mod state;
mod types;

pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, MouseButton, PointerButtonEvent};
