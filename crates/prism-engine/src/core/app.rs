use anyhow::Result;

use crate::input::InputEvent;
use crate::window::{Host, MonitorInfo};

use super::ctx::{EventCtx, FrameCtx};

/// Control directive returned by element callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Initial window size an element asks for, in logical pixels.
///
/// Zero is allowed; the runtime clamps to one pixel since native surfaces
/// cannot be empty.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SurfaceRequest {
    pub width: u32,
    pub height: u32,
}

/// Element contract implemented by higher layers.
///
/// Lifecycle: `connected` runs once the event loop is live and before the
/// window exists; if it fails the runtime reports the error and exits.
/// Per-frame and event callbacks only run between a successful `connected`
/// and the matching `disconnected`.
pub trait Element {
    fn connected(&mut self, host: &Host<'_>) -> Result<SurfaceRequest>;

    fn on_input(&mut self, ctx: &mut EventCtx<'_>, event: &InputEvent) -> AppControl {
        let _ = (ctx, event);
        AppControl::Continue
    }

    /// The window entered (`Some`) or left (`None`) fullscreen.
    fn on_fullscreen_change(
        &mut self,
        ctx: &mut EventCtx<'_>,
        monitor: Option<&MonitorInfo>,
    ) -> AppControl {
        let _ = (ctx, monitor);
        AppControl::Continue
    }

    /// Called once per rendered frame. An error ends the run and is returned
    /// from `Runtime::run`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;

    /// Called when the window goes away; release everything acquired in `connected`.
    fn disconnected(&mut self) {}
}
