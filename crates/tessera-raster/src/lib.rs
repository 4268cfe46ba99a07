//! Reference software rasterizer for Tessera display lists.
//!
//! [`PixmapCanvas`] implements the display-list [`Canvas`] interface on top
//! of tiny-skia, with fontdue for glyphs. It is the backend the command line
//! renders with and the one tests use to check that recorded bounds cover
//! every painted pixel.
//!
//! # Limitations
//!
//! - Perspective matrices are reduced to their affine part
//! - Per-vertex and per-sprite colors are flattened
//! - Corner path effects and inner mask blurs are ignored
//! - Text is laid out on one line with a single font
//!
//! Each limitation is reported once through
//! [`warn_once`](tessera_common::warn_once).
//!
//! [`Canvas`]: tessera_display_list::Canvas

/// The tiny-skia canvas.
pub mod canvas;
mod convert;
/// Raster errors.
pub mod error;
mod filter;
/// Surface configuration.
pub mod options;
/// Whole-list rendering and PNG output.
pub mod render;
mod text;

pub use canvas::PixmapCanvas;
pub use error::RasterError;
pub use options::RasterOptions;
pub use render::{render_display_list, save_png, to_rgba_image};
