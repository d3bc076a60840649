//! Prism shader element.
//!
//! A window that loads a WGSL fragment shader, renders it full-surface with a
//! `time` uniform, and offers either immersive presentation on a head-mounted
//! display or plain fullscreen through a single overlay button.

pub mod attributes;
pub mod button;
pub mod capability;
pub mod element;
pub mod host;
pub mod loader;
pub mod presentation;
pub mod settings;

pub use attributes::{parse_int, ElementAttributes};
pub use capability::{
    probe, Available, CapabilityError, DisplayQuery, ImmersiveCapability, ImmersiveDisplay,
    MonitorDisplays, Unavailable,
};
pub use element::ShaderElement;
pub use host::{classify_change, runtime_command, FullscreenChange};
pub use loader::{load_shader_source, LoadError, ShaderLoader};
pub use presentation::{
    FullscreenState, PresentationController, PresentationMode, PresentationRequest, ViewportState,
};
pub use settings::{load_font, ElementSettings, DEFAULT_HMD_PATTERNS};
