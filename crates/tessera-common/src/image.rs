//! Image data shared between recording and rendering.
//!
//! Display lists reference images through shared handles; the pixels are
//! decoded once and never copied into the op buffer.

use thiserror::Error;

/// Errors produced when constructing an [`Image`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Width or height was zero.
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The pixel buffer length does not match `width * height * 4`.
    #[error("expected {expected} bytes of RGBA data, got {actual}")]
    LengthMismatch {
        /// Required byte length.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
}

/// Decoded image data.
///
/// Contains unpremultiplied RGBA pixel data and intrinsic dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Intrinsic width of the image in pixels.
    width: u32,
    /// Intrinsic height of the image in pixels.
    height: u32,
    /// Raw RGBA pixel data (width * height * 4 bytes).
    rgba_data: Vec<u8>,
}

impl Image {
    /// Create a new `Image` from decoded RGBA pixel data.
    ///
    /// # Arguments
    ///
    /// * `width` - Intrinsic width of the image in pixels
    /// * `height` - Intrinsic height of the image in pixels
    /// * `rgba_data` - Raw RGBA pixel data (must be `width * height * 4` bytes)
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the buffer length
    /// does not match the dimensions.
    pub fn new(width: u32, height: u32, rgba_data: Vec<u8>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if rgba_data.len() != expected {
            return Err(ImageError::LengthMismatch {
                expected,
                actual: rgba_data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba_data,
        })
    }

    /// Create an image filled with a single RGBA color.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, ImageError> {
        let pixels = width as usize * height as usize;
        let data = rgba.iter().copied().cycle().take(pixels * 4).collect();
        Self::new(width, height, data)
    }

    /// Intrinsic width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Intrinsic dimensions as `(width, height)` in `f32`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dimensions_f32(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// Raw RGBA pixel data.
    #[must_use]
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }

    /// RGBA value of a single pixel, or `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba_data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_length_mismatch() {
        let err = Image::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            ImageError::LengthMismatch {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_rejects_empty_dimensions() {
        assert!(matches!(
            Image::new(0, 4, Vec::new()),
            Err(ImageError::EmptyDimensions { .. })
        ));
    }

    #[test]
    fn test_solid_image_pixels() {
        let image = Image::solid(3, 2, [10, 20, 30, 255]).unwrap();
        assert_eq!(image.rgba_data().len(), 24);
        assert_eq!(image.pixel(2, 1), Some([10, 20, 30, 255]));
        assert_eq!(image.pixel(3, 0), None);
    }
}
