use std::path::Path;

use anyhow::{bail, Context, Result};

/// Monitor name fragments that identify head-mounted displays.
///
/// Matched case-insensitively as substrings of the platform's monitor name.
pub const DEFAULT_HMD_PATTERNS: &[&str] = &[
    "rift", "vive", "index", "hmd", "pimax", "reverb", "quest", "varjo",
];

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Host-side knobs that are not element attributes.
#[derive(Debug, Clone)]
pub struct ElementSettings {
    pub hmd_patterns: Vec<String>,
    /// When false, capability probing never reports an immersive display.
    pub immersive: bool,
    /// Raw TrueType/OpenType bytes for the button label.
    pub font: Vec<u8>,
}

impl ElementSettings {
    pub fn new(font: Vec<u8>) -> Self {
        Self {
            hmd_patterns: DEFAULT_HMD_PATTERNS.iter().map(|p| p.to_string()).collect(),
            immersive: true,
            font,
        }
    }

    /// Replaces the default HMD patterns; an empty list keeps the defaults.
    pub fn with_hmd_patterns(mut self, patterns: Vec<String>) -> Self {
        if !patterns.is_empty() {
            self.hmd_patterns = patterns;
        }
        self
    }

    pub fn with_immersive(mut self, enabled: bool) -> Self {
        self.immersive = enabled;
        self
    }
}

/// Reads the label font from `explicit`, or from the first system font found.
pub fn load_font(explicit: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(path) = explicit {
        return std::fs::read(path)
            .with_context(|| format!("failed to read font {}", path.display()));
    }

    probe_fonts(FONT_CANDIDATES.iter().map(Path::new))
}

fn probe_fonts<'a>(candidates: impl Iterator<Item = &'a Path>) -> Result<Vec<u8>> {
    for path in candidates {
        if let Ok(bytes) = std::fs::read(path) {
            log::debug!("label font: {}", path.display());
            return Ok(bytes);
        }
    }
    bail!("no usable system font found; pass one with --font")
}
