//! Raster backend errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while creating a surface or writing its pixels.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The requested surface has a zero or oversized dimension.
    #[error("invalid surface size {width}x{height}")]
    InvalidSurfaceSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The rendered image could not be written.
    #[error("failed to save '{}': {source}", path.display())]
    Save {
        /// Destination path.
        path: PathBuf,
        /// Underlying encoder or I/O error.
        #[source]
        source: image::ImageError,
    },
}
