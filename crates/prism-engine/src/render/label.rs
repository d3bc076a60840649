use std::fmt;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::coords::Vec2;

/// Error returned by [`LabelRasterizer::from_bytes`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Single-line coverage mask for a label, in physical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelBitmap {
    pub text: String,
    pub width: u32,
    pub height: u32,
    /// Physical pixels per logical pixel the mask was rasterized at.
    pub scale: f32,
    /// Row-major R8 coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

impl LabelBitmap {
    /// Size in logical pixels.
    pub fn logical_size(&self) -> Vec2 {
        let s = self.scale.max(0.01);
        Vec2::new(self.width as f32 / s, self.height as f32 / s)
    }
}

/// Rasterizes short labels with fontdue.
///
/// Labels change rarely (a mode switch), so the whole string is rendered into
/// one mask instead of maintaining a glyph atlas.
pub struct LabelRasterizer {
    font: fontdue::Font,
    layout: Layout<()>,
}

impl LabelRasterizer {
    /// Parses a TrueType or OpenType font from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        Ok(Self {
            font,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        })
    }

    /// Lays out `text` at `size` logical pixels and rasterizes it at `scale`.
    pub fn rasterize(&mut self, text: &str, size: f32, scale: f32) -> LabelBitmap {
        let scale = scale.max(0.01);
        let px = size * scale;

        self.layout.reset(&LayoutSettings::default());
        self.layout.append(&[&self.font], &TextStyle::new(text, px, 0));

        let glyphs = self.layout.glyphs();
        let width = glyphs
            .iter()
            .map(|g| (g.x + g.width as f32).ceil() as i64)
            .max()
            .unwrap_or(0)
            .max(1) as u32;
        let height = (self.layout.height().ceil() as u32).max(1);

        let mut coverage = vec![0u8; (width * height) as usize];

        for g in glyphs {
            if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
                continue;
            }
            let (metrics, bitmap) = self.font.rasterize_config(g.key);
            blit_max(
                &mut coverage,
                (width, height),
                &bitmap,
                (metrics.width as u32, metrics.height as u32),
                (g.x.round() as i64, g.y.round() as i64),
            );
        }

        LabelBitmap {
            text: text.to_owned(),
            width,
            height,
            scale,
            coverage,
        }
    }
}

/// Copies `src` into `dst` at `at`, keeping the max coverage where glyphs overlap.
/// Pixels falling outside `dst` are dropped.
fn blit_max(dst: &mut [u8], dst_size: (u32, u32), src: &[u8], src_size: (u32, u32), at: (i64, i64)) {
    let (dw, dh) = (dst_size.0 as i64, dst_size.1 as i64);
    let (sw, sh) = (src_size.0 as i64, src_size.1 as i64);

    for sy in 0..sh {
        let dy = at.1 + sy;
        if dy < 0 || dy >= dh {
            continue;
        }
        for sx in 0..sw {
            let dx = at.0 + sx;
            if dx < 0 || dx >= dw {
                continue;
            }
            let Some(&v) = src.get((sy * sw + sx) as usize) else { continue };
            let d = &mut dst[(dy * dw + dx) as usize];
            *d = (*d).max(v);
        }
    }
}
