//! One-call rendering of a display list to pixels or a PNG file.

use std::path::Path;

use image::{ImageBuffer, Rgba, RgbaImage};
use tessera_display_list::DisplayList;
use tiny_skia::Pixmap;

use crate::canvas::PixmapCanvas;
use crate::error::RasterError;
use crate::options::RasterOptions;

/// Play `list` onto a fresh surface described by `options`.
///
/// # Errors
///
/// Returns [`RasterError::InvalidSurfaceSize`] if the surface cannot be
/// allocated.
pub fn render_display_list(
    list: &DisplayList,
    options: &RasterOptions,
) -> Result<Pixmap, RasterError> {
    let mut canvas = PixmapCanvas::new(options)?;
    list.render_to(&mut canvas);
    Ok(canvas.into_pixmap())
}

/// Unpremultiplied copy of `pixmap`.
#[must_use]
pub fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    ImageBuffer::from_fn(pixmap.width(), pixmap.height(), |x, y| {
        pixmap.pixel(x, y).map_or(Rgba([0, 0, 0, 0]), |p| {
            let c = p.demultiply();
            Rgba([c.red(), c.green(), c.blue(), c.alpha()])
        })
    })
}

/// Write `pixmap` to `path`, in the format its extension names.
///
/// # Errors
///
/// Returns [`RasterError::Save`] if encoding or writing fails.
pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<(), RasterError> {
    to_rgba_image(pixmap)
        .save(path)
        .map_err(|source| RasterError::Save {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_image_is_unpremultiplied() {
        let mut pixmap = Pixmap::new(1, 1).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(200, 100, 0, 128));
        let image = to_rgba_image(&pixmap);
        let Rgba([r, g, b, a]) = *image.get_pixel(0, 0);
        assert_eq!(a, 128);
        assert!(r.abs_diff(200) <= 2 && g.abs_diff(100) <= 2 && b == 0);
    }
}
