//! Surface and font configuration.

use std::path::PathBuf;

use tessera_display_list::Color;

/// Common system font paths, searched in order for a regular sans font.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNS.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Configuration for a [`PixmapCanvas`](crate::PixmapCanvas).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Color the surface is cleared to before drawing.
    pub background: Color,
    /// Font files tried in order for text; the first one that loads wins.
    pub font_paths: Vec<PathBuf>,
}

impl RasterOptions {
    /// A `width` x `height` white surface using the system font search list.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Color::WHITE,
            font_paths: FONT_SEARCH_PATHS.iter().map(PathBuf::from).collect(),
        }
    }

    /// The same options with a different background.
    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
