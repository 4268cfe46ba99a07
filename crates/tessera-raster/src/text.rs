//! Glyph rasterization with fontdue.

use std::fs;
use std::path::PathBuf;

use fontdue::{Font, FontSettings};
use tessera_common::warn_once;

/// A coverage bitmap for one glyph, positioned relative to the text origin
/// on the baseline (y grows downward).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    /// Left edge relative to the origin.
    pub left: i32,
    /// Top edge relative to the baseline.
    pub top: i32,
    /// Bitmap width.
    pub width: usize,
    /// Bitmap height.
    pub height: usize,
    /// Row-major coverage, one byte per pixel.
    pub coverage: Vec<u8>,
}

/// The font used for every text blob.
pub struct FontSet {
    font: Option<Font>,
}

impl FontSet {
    /// Load the first font in `paths` that parses.
    pub fn load(paths: &[PathBuf]) -> Self {
        let font = paths.iter().find_map(|path| {
            let data = fs::read(path).ok()?;
            Font::from_bytes(data, FontSettings::default()).ok()
        });
        if font.is_none() {
            let _ = warn_once("Raster", "no system font found; text will not be rendered");
        }
        Self { font }
    }

    /// True if a font was found.
    pub const fn is_available(&self) -> bool {
        self.font.is_some()
    }

    /// Lay out `text` on one line at `size` pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn layout(&self, text: &str, size: f32) -> Vec<Glyph> {
        let Some(font) = &self.font else {
            return Vec::new();
        };
        let mut glyphs = Vec::new();
        let mut cursor = 0.0_f32;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let (metrics, coverage) = font.rasterize(ch, size);
            glyphs.push(Glyph {
                left: cursor.round() as i32 + metrics.xmin,
                top: -(metrics.ymin + metrics.height as i32),
                width: metrics.width,
                height: metrics.height,
                coverage,
            });
            cursor += metrics.advance_width;
        }
        glyphs
    }
}

/// Pixel box `(left, top, right, bottom)` covering every glyph, relative
/// to the text origin. `None` when no glyph has pixels.
pub fn extents(glyphs: &[Glyph]) -> Option<(i32, i32, i32, i32)> {
    glyphs
        .iter()
        .filter(|g| g.width > 0 && g.height > 0)
        .map(|g| {
            let width = i32::try_from(g.width).unwrap_or(i32::MAX);
            let height = i32::try_from(g.height).unwrap_or(i32::MAX);
            (g.left, g.top, g.left.saturating_add(width), g.top.saturating_add(height))
        })
        .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("available", &self.is_available())
            .finish()
    }
}
