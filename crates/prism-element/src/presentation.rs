//! Presentation state machine.
//!
//! The mode is chosen once from the capability result and never changes.
//! The controller is pure: it turns clicks and host notifications into
//! [`PresentationRequest`]s and never touches the window itself.

use crate::capability::ImmersiveDisplay;

pub const ENTER_VR_LABEL: &str = "ENTER VR";
pub const EXIT_VR_LABEL: &str = "EXIT VR";
pub const FULLSCREEN_LABEL: &str = "FULLSCREEN";

pub const RESTING_OPACITY: f32 = 0.5;
pub const HOVER_OPACITY: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum PresentationMode {
    Immersive(ImmersiveDisplay),
    Fullscreen,
}

impl PresentationMode {
    pub fn from_capability(display: Option<ImmersiveDisplay>) -> Self {
        match display {
            Some(d) => PresentationMode::Immersive(d),
            None => PresentationMode::Fullscreen,
        }
    }

    pub fn initial_label(&self) -> &'static str {
        match self {
            PresentationMode::Immersive(_) => ENTER_VR_LABEL,
            PresentationMode::Fullscreen => FULLSCREEN_LABEL,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FullscreenState {
    #[default]
    Windowed,
    Fullscreen,
}

/// Size the shader is rendered at.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ViewportState {
    /// From the `width`/`height` attributes; used while windowed.
    Fixed { width: u32, height: u32 },
    /// Screen dimensions; used while fullscreen.
    Screen { width: u32, height: u32 },
}

impl ViewportState {
    pub fn size(&self) -> (u32, u32) {
        match *self {
            ViewportState::Fixed { width, height } | ViewportState::Screen { width, height } => {
                (width, height)
            }
        }
    }
}

/// Something the host must do on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationRequest {
    StartSession(ImmersiveDisplay),
    EndSession,
    EnterFullscreen,
    ExitFullscreen,
    Resize { width: u32, height: u32 },
    Redraw,
}

#[derive(Debug, Clone)]
pub struct PresentationController {
    mode: PresentationMode,
    label: &'static str,

    /// Immersive branch: a session is active on the display.
    presenting: bool,
    /// Fullscreen branch: last requested or observed state.
    fullscreen: FullscreenState,

    fixed: (u32, u32),
    viewport: ViewportState,
    hovered: bool,
}

impl PresentationController {
    pub fn new(mode: PresentationMode, fixed_size: (u32, u32)) -> Self {
        let (width, height) = fixed_size;
        Self {
            label: mode.initial_label(),
            mode,
            presenting: false,
            fullscreen: FullscreenState::Windowed,
            fixed: fixed_size,
            viewport: ViewportState::Fixed { width, height },
            hovered: false,
        }
    }

    pub fn mode(&self) -> &PresentationMode {
        &self.mode
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether the shader renders side-by-side for two eyes.
    pub fn stereo(&self) -> bool {
        self.presenting
    }

    pub fn fullscreen_state(&self) -> FullscreenState {
        self.fullscreen
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn opacity(&self) -> f32 {
        if self.hovered { HOVER_OPACITY } else { RESTING_OPACITY }
    }

    /// Returns true when the hover state changed.
    pub fn set_hovered(&mut self, hovered: bool) -> bool {
        let changed = self.hovered != hovered;
        self.hovered = hovered;
        changed
    }

    /// Button activation; always yields exactly one request.
    pub fn click(&mut self) -> PresentationRequest {
        match &self.mode {
            PresentationMode::Immersive(display) => {
                if self.presenting {
                    PresentationRequest::EndSession
                } else {
                    PresentationRequest::StartSession(display.clone())
                }
            }
            PresentationMode::Fullscreen => match self.fullscreen {
                FullscreenState::Windowed => {
                    self.fullscreen = FullscreenState::Fullscreen;
                    PresentationRequest::EnterFullscreen
                }
                FullscreenState::Fullscreen => {
                    self.fullscreen = FullscreenState::Windowed;
                    PresentationRequest::ExitFullscreen
                }
            },
        }
    }

    /// The immersive session started or ended. Ignored in fullscreen mode.
    pub fn on_presentation_change(&mut self, presenting: bool) {
        if !matches!(self.mode, PresentationMode::Immersive(_)) {
            return;
        }
        self.presenting = presenting;
        self.label = if presenting { EXIT_VR_LABEL } else { ENTER_VR_LABEL };
        log::info!("immersive presentation {}", if presenting { "started" } else { "ended" });
    }

    /// The window entered fullscreen on a screen of logical size `screen`, or
    /// left fullscreen when `None`. Ignored in immersive mode.
    pub fn on_fullscreen_change(&mut self, screen: Option<(u32, u32)>) -> Vec<PresentationRequest> {
        if !matches!(self.mode, PresentationMode::Fullscreen) {
            return Vec::new();
        }

        match screen {
            Some((width, height)) => {
                self.fullscreen = FullscreenState::Fullscreen;
                self.viewport = ViewportState::Screen { width, height };
                log::debug!("fullscreen viewport {width}x{height}");
                vec![PresentationRequest::Redraw]
            }
            None => {
                let (width, height) = self.fixed;
                self.fullscreen = FullscreenState::Windowed;
                self.viewport = ViewportState::Fixed { width, height };
                log::debug!("windowed viewport {width}x{height}");
                vec![
                    PresentationRequest::Resize { width, height },
                    PresentationRequest::Redraw,
                ]
            }
        }
    }

    /// Escape leaves whatever presentation is active.
    pub fn escape(&mut self) -> Option<PresentationRequest> {
        match self.mode {
            PresentationMode::Immersive(_) if self.presenting => Some(PresentationRequest::EndSession),
            PresentationMode::Fullscreen if self.fullscreen == FullscreenState::Fullscreen => {
                self.fullscreen = FullscreenState::Windowed;
                Some(PresentationRequest::ExitFullscreen)
            }
            _ => None,
        }
    }
}
