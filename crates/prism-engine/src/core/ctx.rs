use anyhow::{anyhow, Result};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::InputState;
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    pub(crate) fn new(id: WindowId, window: &'a Window) -> Self {
        Self { id, window }
    }

    /// Logical window size as `(width, height)`.
    pub fn logical_size(&self) -> (f32, f32) {
        let logical: winit::dpi::LogicalSize<f64> =
            self.window.inner_size().to_logical(self.window.scale_factor());
        (logical.width as f32, logical.height as f32)
    }

    pub fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }
}

/// Context passed to input and fullscreen callbacks.
pub struct EventCtx<'a> {
    pub window: WindowCtx<'a>,
    pub input: &'a InputState,
    pub runtime: &'a mut RuntimeCtx,
}

/// Per-frame context passed to `Element::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Clears the surface with `clear`, calls `draw` with a ready [`RenderCtx`]
    /// and [`RenderTarget`], then presents the frame.
    ///
    /// Transient surface errors skip the frame; fatal ones are returned.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> Result<()>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let (w, h) = self.window.logical_size();

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let message = err.to_string();
                let action = self.gpu.handle_surface_error(err);
                log::debug!("surface error: {message} ({action:?})");
                return surface_error_outcome(action, &message);
            }
        };

        // Clear pass; dropped before the encoder is lent to the draw callback.
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            Viewport::new(w, h),
            self.window.scale_factor(),
        );

        let size = frame.size();
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, size);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        Ok(())
    }
}

fn surface_error_outcome(action: SurfaceErrorAction, message: &str) -> Result<()> {
    match action {
        SurfaceErrorAction::Fatal => Err(anyhow!("GPU surface failed: {message}")),
        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_surface_errors_skip_the_frame() {
        assert!(surface_error_outcome(SurfaceErrorAction::SkipFrame, "timeout").is_ok());
        assert!(surface_error_outcome(SurfaceErrorAction::Reconfigured, "lost").is_ok());
    }

    #[test]
    fn fatal_surface_error_is_an_error() {
        let err = surface_error_outcome(SurfaceErrorAction::Fatal, "out of memory").unwrap_err();
        assert!(err.to_string().contains("out of memory"));
    }
}
