//! Shaders, filters, path effects and shadow geometry.
//!
//! These are shared resources: a display list stores them once in its
//! resource table and records only an index in the op buffer. Equality is
//! by value.

use std::sync::Arc;

use tessera_common::Image;

use crate::color::{BlendMode, Color};
use crate::geometry::{Matrix, Point, Rect};
use crate::paint::{BlurStyle, ImageSampling, TileMode};

/// Gaussian blurs are treated as reaching three standard deviations.
const BLUR_SIGMA_EXTENT: f32 = 3.0;

/// One color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient in `0.0..=1.0`.
    pub offset: f32,
    /// Color at this position.
    pub color: Color,
}

impl GradientStop {
    /// Create a stop.
    #[must_use]
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// A color source replacing the paint's solid color.
#[derive(Debug, Clone, PartialEq)]
pub enum Shader {
    /// A single color (alpha-modulated by the paint color).
    Color(Color),
    /// Gradient along the line from `start` to `end`.
    LinearGradient {
        /// Gradient start point.
        start: Point,
        /// Gradient end point.
        end: Point,
        /// Color stops, ordered by offset.
        stops: Vec<GradientStop>,
        /// Behavior past the end points.
        tile_mode: TileMode,
    },
    /// Gradient radiating from `center`.
    RadialGradient {
        /// Center of the gradient.
        center: Point,
        /// Radius at which the last stop is reached.
        radius: f32,
        /// Color stops, ordered by offset.
        stops: Vec<GradientStop>,
        /// Behavior past the radius.
        tile_mode: TileMode,
    },
    /// An image, tiled and transformed.
    Image {
        /// Source pixels.
        image: Arc<Image>,
        /// Horizontal tiling.
        tile_x: TileMode,
        /// Vertical tiling.
        tile_y: TileMode,
        /// Sampling when the image is scaled.
        sampling: ImageSampling,
        /// Local matrix applied to the image.
        matrix: Matrix,
    },
}

impl Shader {
    /// True if every produced color is opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        match self {
            Self::Color(color) => color.is_opaque(),
            Self::LinearGradient {
                stops, tile_mode, ..
            }
            | Self::RadialGradient {
                stops, tile_mode, ..
            } => *tile_mode != TileMode::Decal && stops.iter().all(|s| s.color.is_opaque()),
            Self::Image { .. } => false,
        }
    }
}

/// A per-pixel transformation of source colors.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorFilter {
    /// Blend a constant color onto each source pixel.
    Blend {
        /// Constant color.
        color: Color,
        /// Mode used to combine it with the source.
        mode: BlendMode,
    },
    /// A 4x5 row-major color matrix over normalized RGBA.
    Matrix([f32; 20]),
    /// Convert linear values to sRGB gamma.
    LinearToSrgbGamma,
    /// Convert sRGB gamma values to linear.
    SrgbToLinearGamma,
}

impl ColorFilter {
    /// True if transparent black input produces visible output, which makes
    /// anything drawn through this filter cover its whole clip.
    #[must_use]
    pub fn modifies_transparent_black(&self) -> bool {
        match self {
            Self::Blend { color, mode } => {
                color.a != 0
                    && !matches!(
                        mode,
                        BlendMode::Clear
                            | BlendMode::Dst
                            | BlendMode::SrcIn
                            | BlendMode::DstIn
                            | BlendMode::DstOut
                            | BlendMode::SrcATop
                            | BlendMode::Modulate
                    )
            }
            Self::Matrix(m) => m[19] > 0.0,
            Self::LinearToSrgbGamma | Self::SrgbToLinearGamma => false,
        }
    }
}

/// A filter applied to rendered output (a draw or a whole layer).
#[derive(Debug, Clone, PartialEq)]
pub enum ImageFilter {
    /// Gaussian blur.
    Blur {
        /// Horizontal standard deviation.
        sigma_x: f32,
        /// Vertical standard deviation.
        sigma_y: f32,
        /// Edge treatment.
        tile_mode: TileMode,
    },
    /// Grow opaque regions.
    Dilate {
        /// Horizontal radius.
        radius_x: f32,
        /// Vertical radius.
        radius_y: f32,
    },
    /// Shrink opaque regions.
    Erode {
        /// Horizontal radius.
        radius_x: f32,
        /// Vertical radius.
        radius_y: f32,
    },
    /// Transform the rendered output.
    Matrix {
        /// Transform applied to the output.
        matrix: Matrix,
        /// Resampling quality.
        sampling: ImageSampling,
    },
    /// Apply a color filter to the output.
    ColorFilter(Arc<ColorFilter>),
    /// Apply `inner`, then `outer`.
    Compose {
        /// Second filter.
        outer: Arc<ImageFilter>,
        /// First filter.
        inner: Arc<ImageFilter>,
    },
}

impl ImageFilter {
    /// Area affected by this filter when its input covers `input`, or
    /// `None` if the output is unbounded.
    #[must_use]
    pub fn map_local_bounds(&self, input: &Rect) -> Option<Rect> {
        match self {
            Self::Blur {
                sigma_x, sigma_y, ..
            } => Some(input.outset(
                sigma_x.abs() * BLUR_SIGMA_EXTENT,
                sigma_y.abs() * BLUR_SIGMA_EXTENT,
            )),
            Self::Dilate { radius_x, radius_y } => {
                Some(input.outset(radius_x.max(0.0), radius_y.max(0.0)))
            }
            Self::Erode { .. } => Some(*input),
            Self::Matrix { matrix, .. } => matrix.map_rect(input),
            Self::ColorFilter(filter) => {
                (!filter.modifies_transparent_black()).then_some(*input)
            }
            Self::Compose { outer, inner } => {
                let mid = inner.map_local_bounds(input)?;
                outer.map_local_bounds(&mid)
            }
        }
    }
}

/// A transformation of geometry before it is stroked.
#[derive(Debug, Clone, PartialEq)]
pub enum PathEffect {
    /// Dashed strokes.
    Dash {
        /// Alternating on/off lengths.
        intervals: Vec<f32>,
        /// Offset into the interval pattern.
        phase: f32,
    },
    /// Round sharp corners.
    Corner {
        /// Corner radius.
        radius: f32,
    },
}

/// A filter applied to coverage before coloring.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskFilter {
    /// Gaussian blur of coverage.
    Blur {
        /// Which parts of the blur are kept.
        style: BlurStyle,
        /// Standard deviation.
        sigma: f32,
    },
}

impl MaskFilter {
    /// How far coverage can spread past the geometry.
    #[must_use]
    pub fn outset(&self) -> f32 {
        match self {
            Self::Blur {
                style: BlurStyle::Inner,
                ..
            } => 0.0,
            Self::Blur { sigma, .. } => sigma.abs() * BLUR_SIGMA_EXTENT,
        }
    }
}

/// Where an elevation shadow lands relative to its occluder.
///
/// Shared by every consumer of shadow ops so that computed bounds always
/// cover what a backend paints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowGeometry {
    /// Offset of the shadow from the occluder.
    pub offset: Point,
    /// Standard deviation of the shadow's blur.
    pub blur_sigma: f32,
}

impl ShadowGeometry {
    /// Shadow placement for an occluder at `elevation` logical units,
    /// scaled by the device pixel ratio.
    #[must_use]
    pub fn new(elevation: f32, device_pixel_ratio: f32) -> Self {
        let height = (elevation * device_pixel_ratio).max(0.0);
        Self {
            offset: Point::new(0.0, height * 0.25),
            blur_sigma: height * 0.5,
        }
    }

    /// Area the shadow of an occluder bounded by `occluder` can touch.
    #[must_use]
    pub fn bounds(&self, occluder: &Rect) -> Rect {
        let spread = self.blur_sigma * BLUR_SIGMA_EXTENT;
        occluder
            .offset(self.offset.x, self.offset.y)
            .outset(spread, spread)
            .union(occluder)
    }
}
