use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowId};

use crate::core::{AppControl, Element, EventCtx, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::InputState;
use crate::time::FrameClock;

use super::host::{Host, MonitorInfo};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
        }
    }
}

/// Where a fullscreen request should land.
#[derive(Debug, Clone, PartialEq)]
pub enum FullscreenTarget {
    /// Borderless fullscreen on whatever display holds the window.
    Current,
    /// Borderless fullscreen on a specific display.
    Monitor(MonitorInfo),
    /// Leave fullscreen.
    Off,
}

/// Runtime context passed to the element.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    commands: Vec<RuntimeCommand>,
}

impl RuntimeCtx {
    pub fn push(&mut self, command: RuntimeCommand) {
        self.commands.push(command);
    }

    pub fn exit(&mut self) {
        self.commands.push(RuntimeCommand::Exit);
    }
}

/// Window-level operation requested by the element.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCommand {
    SetFullscreen(FullscreenTarget),
    /// Resize the window's client area (logical pixels).
    RequestInnerSize { width: u32, height: u32 },
    Redraw,
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the event loop until the element window closes.
    ///
    /// A failure raised while connecting or rendering is logged, ends the loop
    /// and is returned here.
    pub fn run<E>(config: RuntimeConfig, gpu_init: GpuInit, element: E) -> Result<()>
    where
        E: Element + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, element);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<E>
where
    E: Element + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    element: E,

    entry: Option<WindowEntry>,
    connected: bool,
    /// Fullscreen monitor last reported to the element.
    observed_fullscreen: Option<MonitorInfo>,

    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<E> AppState<E>
where
    E: Element + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, element: E) -> Self {
        Self {
            config,
            gpu_init,
            element,
            entry: None,
            connected: false,
            observed_fullscreen: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.detach();
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.request_exit(event_loop);
    }

    /// Connects the element, then opens its window and GPU surface.
    fn attach(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let host = Host::new(event_loop);
        let request = self.element.connected(&host)?;
        self.connected = true;

        let size = LogicalSize::new(request.width.max(1) as f64, request.height.max(1) as f64);
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            clock: FrameClock::new(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()?;

        entry.with_window(|w| w.request_redraw());
        self.observed_fullscreen = None;
        self.entry = Some(entry);
        Ok(())
    }

    /// Tears down the window and lets the element release what it holds.
    fn detach(&mut self) {
        self.entry = None;
        self.observed_fullscreen = None;
        if self.connected {
            self.connected = false;
            self.element.disconnected();
            log::debug!("element disconnected");
        }
    }

    /// Reports a fullscreen transition to the element if the window's
    /// fullscreen state differs from the last one it saw.
    fn observe_fullscreen(&mut self, runtime_ctx: &mut RuntimeCtx) -> AppControl {
        let (element, observed) = (&mut self.element, &mut self.observed_fullscreen);
        let Some(entry) = self.entry.as_mut() else {
            return AppControl::Continue;
        };

        let mut control = AppControl::Continue;
        entry.with_mut(|fields| {
            let now = fullscreen_monitor(fields.window);
            if now == *observed {
                return;
            }

            log::debug!(
                "fullscreen changed: {:?} -> {:?}",
                observed.as_ref().map(|m| m.name.clone()),
                now.as_ref().map(|m| m.name.clone())
            );
            *observed = now.clone();

            let id = fields.window.id();
            let mut ctx = EventCtx {
                window: WindowCtx::new(id, fields.window),
                input: fields.input_state,
                runtime: &mut *runtime_ctx,
            };
            control = element.on_fullscreen_change(&mut ctx, now.as_ref());
        });
        control
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            let Some(entry) = self.entry.as_mut() else {
                break;
            };

            match cmd {
                RuntimeCommand::SetFullscreen(target) => entry.with_window(|w| apply_fullscreen(w, target)),
                RuntimeCommand::RequestInnerSize { width, height } => {
                    let size = LogicalSize::new(width.max(1) as f64, height.max(1) as f64);
                    // `Some` means the platform resized synchronously and no
                    // `Resized` event will follow.
                    if let Some(applied) = entry.with_window(|w| w.request_inner_size(size)) {
                        entry.with_gpu_mut(|gpu| gpu.resize(applied));
                    }
                }
                RuntimeCommand::Redraw => entry.with_window(|w| w.request_redraw()),
                RuntimeCommand::Exit => {
                    self.detach();
                    self.request_exit(event_loop);
                }
            }
        }
    }
}

impl<E> ApplicationHandler for AppState<E>
where
    E: Element + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(err) = self.attach(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.detach();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // The shader animates every frame, so redraw continuously.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (element, entry) = (&mut self.element, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        let mut runtime_ctx = RuntimeCtx::default();
        let mut control = AppControl::Continue;

        entry.with_mut(|fields| {
            let Some(ev) = translate_window_event(fields.window, fields.input_state, &event) else {
                return;
            };
            fields.input_state.apply_event(&ev);

            let mut ctx = EventCtx {
                window: WindowCtx::new(window_id, fields.window),
                input: fields.input_state,
                runtime: &mut runtime_ctx,
            };
            control = element.on_input(&mut ctx, &ev);
        });

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                self.detach();
                self.request_exit(event_loop);
                return;
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
                if control == AppControl::Continue {
                    control = self.observe_fullscreen(&mut runtime_ctx);
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => {
                // Some platforms change fullscreen without a resize.
                if control == AppControl::Continue {
                    control = self.observe_fullscreen(&mut runtime_ctx);
                }

                let element = &mut self.element;
                let mut frame = Ok(control);
                if let (AppControl::Continue, Some(entry)) = (control, self.entry.as_mut()) {
                    entry.with_mut(|fields| {
                        let time = fields.clock.tick();
                        let mut ctx = FrameCtx {
                            window: WindowCtx::new(window_id, fields.window),
                            gpu: fields.gpu,
                            input: fields.input_state,
                            time,
                            runtime: &mut runtime_ctx,
                        };
                        frame = element.on_frame(&mut ctx);
                    });
                }

                match frame {
                    Ok(c) => control = c,
                    Err(err) => {
                        self.fail(event_loop, err.context("frame failed"));
                        return;
                    }
                }
            }

            _ => {}
        }

        if control == AppControl::Exit {
            runtime_ctx.exit();
        }

        self.apply_commands(event_loop, runtime_ctx);
    }
}

/// Display the window is fullscreen on, or `None` when windowed.
fn fullscreen_monitor(window: &Window) -> Option<MonitorInfo> {
    let handle = match window.fullscreen()? {
        Fullscreen::Exclusive(mode) => Some(mode.monitor()),
        Fullscreen::Borderless(handle) => handle.or_else(|| window.current_monitor()),
    };

    Some(match handle {
        Some(h) => MonitorInfo::from_handle(&h),
        // Platform gave no monitor; describe the window itself.
        None => {
            let size = window.inner_size();
            MonitorInfo {
                name: None,
                position: (0, 0),
                size: (size.width, size.height),
                scale_factor: window.scale_factor(),
                refresh_millihertz: None,
            }
        }
    })
}

/// How a fullscreen request maps onto the displays currently connected.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum FullscreenPlan {
    Windowed,
    Current,
    /// Index into the available monitors.
    Monitor(usize),
    /// The requested display is gone; stay as we are.
    Skip,
}

fn plan_fullscreen(target: &FullscreenTarget, available: &[MonitorInfo]) -> FullscreenPlan {
    match target {
        FullscreenTarget::Off => FullscreenPlan::Windowed,
        FullscreenTarget::Current => FullscreenPlan::Current,
        FullscreenTarget::Monitor(info) => available
            .iter()
            .position(|m| m.same_display(info))
            .map_or(FullscreenPlan::Skip, FullscreenPlan::Monitor),
    }
}

fn apply_fullscreen(window: &Window, target: FullscreenTarget) {
    let handles: Vec<_> = window.available_monitors().collect();
    let infos: Vec<_> = handles.iter().map(MonitorInfo::from_handle).collect();

    match plan_fullscreen(&target, &infos) {
        FullscreenPlan::Windowed => window.set_fullscreen(None),
        FullscreenPlan::Current => {
            window.set_fullscreen(Some(Fullscreen::Borderless(window.current_monitor())));
        }
        FullscreenPlan::Monitor(index) => {
            let handle = handles.into_iter().nth(index);
            window.set_fullscreen(Some(Fullscreen::Borderless(handle)));
        }
        FullscreenPlan::Skip => {
            if let FullscreenTarget::Monitor(info) = &target {
                log::warn!("display {:?} is no longer connected; staying windowed", info.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(name: &str, x: i32) -> MonitorInfo {
        MonitorInfo {
            name: Some(name.to_string()),
            position: (x, 0),
            size: (1920, 1080),
            scale_factor: 1.0,
            refresh_millihertz: None,
        }
    }

    #[test]
    fn off_and_current_need_no_lookup() {
        assert_eq!(plan_fullscreen(&FullscreenTarget::Off, &[]), FullscreenPlan::Windowed);
        assert_eq!(plan_fullscreen(&FullscreenTarget::Current, &[]), FullscreenPlan::Current);
    }

    #[test]
    fn monitor_target_picks_matching_display() {
        let available = [monitor("DELL U2719D", 0), monitor("HTC Vive", 2560)];
        let target = FullscreenTarget::Monitor(monitor("HTC Vive", 2560));
        assert_eq!(plan_fullscreen(&target, &available), FullscreenPlan::Monitor(1));
    }

    #[test]
    fn missing_display_stays_windowed() {
        // Falling back to another display would leave an immersive element
        // fullscreen somewhere it does not count as presenting.
        let available = [monitor("DELL U2719D", 0)];
        let target = FullscreenTarget::Monitor(monitor("HTC Vive", 2560));
        assert_eq!(plan_fullscreen(&target, &available), FullscreenPlan::Skip);
    }

    #[test]
    fn moved_display_counts_as_missing() {
        let available = [monitor("HTC Vive", 0)];
        let target = FullscreenTarget::Monitor(monitor("HTC Vive", 2560));
        assert_eq!(plan_fullscreen(&target, &available), FullscreenPlan::Skip);
    }

    #[test]
    fn runtime_ctx_buffers_in_order() {
        let mut ctx = RuntimeCtx::default();
        ctx.push(RuntimeCommand::Redraw);
        ctx.exit();
        assert_eq!(ctx.commands, vec![RuntimeCommand::Redraw, RuntimeCommand::Exit]);
    }
}
