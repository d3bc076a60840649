//! Mapping between presentation state and window-level operations.

use prism_engine::window::{FullscreenTarget, MonitorInfo, RuntimeCommand};

use crate::presentation::{PresentationMode, PresentationRequest};

/// What an observed fullscreen transition means for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenChange {
    /// Immersive mode: whether the session is now presenting on the HMD.
    Presentation(bool),
    /// Fullscreen mode: logical size of the display now holding the window,
    /// or `None` when windowed.
    Fullscreen(Option<(u32, u32)>),
}

/// Interprets the display a fullscreen window now occupies.
///
/// An immersive session is presenting only while fullscreen on its own
/// display; fullscreen on any other display does not count.
pub fn classify_change(mode: &PresentationMode, monitor: Option<&MonitorInfo>) -> FullscreenChange {
    match mode {
        PresentationMode::Immersive(display) => {
            FullscreenChange::Presentation(monitor.is_some_and(|m| display.is_monitor(m)))
        }
        PresentationMode::Fullscreen => {
            FullscreenChange::Fullscreen(monitor.map(MonitorInfo::logical_size))
        }
    }
}

pub fn runtime_command(request: PresentationRequest) -> RuntimeCommand {
    match request {
        PresentationRequest::StartSession(display) => {
            RuntimeCommand::SetFullscreen(FullscreenTarget::Monitor(display.monitor().clone()))
        }
        PresentationRequest::EndSession | PresentationRequest::ExitFullscreen => {
            RuntimeCommand::SetFullscreen(FullscreenTarget::Off)
        }
        PresentationRequest::EnterFullscreen => {
            RuntimeCommand::SetFullscreen(FullscreenTarget::Current)
        }
        PresentationRequest::Resize { width, height } => {
            RuntimeCommand::RequestInnerSize { width, height }
        }
        PresentationRequest::Redraw => RuntimeCommand::Redraw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::ImmersiveDisplay;

    fn monitor(name: &str, x: i32, size: (u32, u32), scale_factor: f64) -> MonitorInfo {
        MonitorInfo {
            name: Some(name.to_string()),
            position: (x, 0),
            size,
            scale_factor,
            refresh_millihertz: None,
        }
    }

    fn hmd() -> MonitorInfo {
        monitor("HTC Vive", 1920, (2160, 1200), 1.0)
    }

    fn desktop() -> MonitorInfo {
        monitor("DELL U2719D", 0, (1920, 1080), 1.0)
    }

    fn immersive() -> PresentationMode {
        PresentationMode::Immersive(ImmersiveDisplay::new(hmd()))
    }

    #[test]
    fn fullscreen_on_hmd_is_presenting() {
        let change = classify_change(&immersive(), Some(&hmd()));
        assert_eq!(change, FullscreenChange::Presentation(true));
    }

    #[test]
    fn fullscreen_on_desktop_is_not_presenting() {
        let change = classify_change(&immersive(), Some(&desktop()));
        assert_eq!(change, FullscreenChange::Presentation(false));
    }

    #[test]
    fn windowed_immersive_is_not_presenting() {
        assert_eq!(
            classify_change(&immersive(), None),
            FullscreenChange::Presentation(false)
        );
    }

    #[test]
    fn fullscreen_mode_reports_logical_display_size() {
        let retina = monitor("Built-in", 0, (2880, 1600), 2.0);
        assert_eq!(
            classify_change(&PresentationMode::Fullscreen, Some(&retina)),
            FullscreenChange::Fullscreen(Some((1440, 800)))
        );
        assert_eq!(
            classify_change(&PresentationMode::Fullscreen, None),
            FullscreenChange::Fullscreen(None)
        );
    }

    #[test]
    fn session_targets_the_hmd() {
        let command = runtime_command(PresentationRequest::StartSession(ImmersiveDisplay::new(hmd())));
        assert_eq!(command, RuntimeCommand::SetFullscreen(FullscreenTarget::Monitor(hmd())));
    }

    #[test]
    fn leaving_either_mode_goes_windowed() {
        for request in [PresentationRequest::EndSession, PresentationRequest::ExitFullscreen] {
            assert_eq!(
                runtime_command(request),
                RuntimeCommand::SetFullscreen(FullscreenTarget::Off)
            );
        }
    }

    #[test]
    fn plain_requests_map_one_to_one() {
        assert_eq!(
            runtime_command(PresentationRequest::EnterFullscreen),
            RuntimeCommand::SetFullscreen(FullscreenTarget::Current)
        );
        assert_eq!(
            runtime_command(PresentationRequest::Resize { width: 320, height: 240 }),
            RuntimeCommand::RequestInnerSize { width: 320, height: 240 }
        );
        assert_eq!(runtime_command(PresentationRequest::Redraw), RuntimeCommand::Redraw);
    }
}
