//! Paint attributes.
//!
//! Attribute changes are recorded as their own ops, so a display list
//! carries no `Paint` objects. [`Paint`] is the accumulated attribute state
//! that a consumer (the canvas adapter, the bounds accumulator, the
//! builder's redundant-setter check) reconstructs while replaying.

use std::sync::Arc;

use serde::Serialize;
use strum_macros::{Display, FromRepr};

use crate::color::{BlendMode, Color};
use crate::effects::{ColorFilter, ImageFilter, MaskFilter, PathEffect, Shader};

/// Whether geometry is filled, stroked, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum DrawStyle {
    /// Fill the interior.
    #[default]
    Fill,
    /// Stroke the outline.
    Stroke,
    /// Fill, then stroke.
    StrokeAndFill,
}

/// Shape of the ends of open stroked contours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum StrokeCap {
    /// Ends exactly at the endpoint.
    #[default]
    Butt,
    /// Semicircle past the endpoint.
    Round,
    /// Half-square past the endpoint.
    Square,
}

/// Shape of stroked corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum StrokeJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Flattened corner.
    Bevel,
}

/// How a clip shape combines with the current clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum ClipOp {
    /// Keep only the area inside the shape.
    #[default]
    Intersect,
    /// Remove the area inside the shape.
    Difference,
}

/// How the point array of a points op is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum PointMode {
    /// Each point is drawn on its own.
    Points,
    /// Each pair of points is a line segment.
    Lines,
    /// The points form one open polyline.
    Polygon,
}

/// Image sampling used when scaling image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum ImageSampling {
    /// Nearest neighbor.
    #[default]
    Nearest,
    /// Bilinear.
    Linear,
    /// Bilinear between mipmap levels.
    MipmapLinear,
    /// Bicubic.
    Cubic,
}

/// Whether image-rect sampling may read outside the source rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum SrcRectConstraint {
    /// Sample only inside the source rect.
    #[default]
    Strict,
    /// Filtering may bleed past the source rect.
    Fast,
}

/// How shaders and filters treat coordinates outside their domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum TileMode {
    /// Repeat the edge color.
    #[default]
    Clamp,
    /// Repeat the content.
    Repeat,
    /// Repeat the content, mirroring every other tile.
    Mirror,
    /// Transparent outside the domain.
    Decal,
}

/// Style of a mask blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum BlurStyle {
    /// Blur inside and outside.
    #[default]
    Normal,
    /// Solid inside, blurred outside.
    Solid,
    /// Nothing inside, blurred outside.
    Outer,
    /// Blurred inside, nothing outside.
    Inner,
}

/// Winding rule for path fills and clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum FillType {
    /// Non-zero winding.
    #[default]
    Winding,
    /// Even-odd.
    EvenOdd,
}

/// The full set of paint attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    /// Anti-alias edges.
    pub anti_alias: bool,
    /// Dither gradients.
    pub dither: bool,
    /// Invert colors after all other color processing.
    pub invert_colors: bool,
    /// Solid color, or the alpha modulating a shader.
    pub color: Color,
    /// Blend mode used when compositing.
    pub blend_mode: BlendMode,
    /// Fill, stroke, or both.
    pub draw_style: DrawStyle,
    /// Stroke width; zero draws hairlines.
    pub stroke_width: f32,
    /// Miter limit for [`StrokeJoin::Miter`].
    pub stroke_miter: f32,
    /// End cap for open contours.
    pub stroke_cap: StrokeCap,
    /// Corner join.
    pub stroke_join: StrokeJoin,
    /// Color source replacing the solid color.
    pub shader: Option<Arc<Shader>>,
    /// Filter applied to source colors.
    pub color_filter: Option<Arc<ColorFilter>>,
    /// Filter applied to the rendered result.
    pub image_filter: Option<Arc<ImageFilter>>,
    /// Transformation applied to stroked geometry.
    pub path_effect: Option<Arc<PathEffect>>,
    /// Coverage filter.
    pub mask_filter: Option<Arc<MaskFilter>>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            anti_alias: false,
            dither: false,
            invert_colors: false,
            color: Color::BLACK,
            blend_mode: BlendMode::SrcOver,
            draw_style: DrawStyle::Fill,
            stroke_width: 0.0,
            stroke_miter: Self::DEFAULT_MITER,
            stroke_cap: StrokeCap::Butt,
            stroke_join: StrokeJoin::Miter,
            shader: None,
            color_filter: None,
            image_filter: None,
            path_effect: None,
            mask_filter: None,
        }
    }
}

impl Paint {
    /// Default miter limit.
    pub const DEFAULT_MITER: f32 = 4.0;

    /// Default paint with the given color.
    #[must_use]
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// True if geometry drawn with this paint is stroked.
    #[must_use]
    pub const fn is_stroked(&self) -> bool {
        !matches!(self.draw_style, DrawStyle::Fill)
    }

    /// Distance the paint can extend stroked geometry past its outline,
    /// in local units. Hairlines report zero (they are one device pixel).
    ///
    /// `open_contours` accounts for square caps, which reach diagonally
    /// past the endpoint.
    #[must_use]
    pub fn stroke_outset(&self, open_contours: bool) -> f32 {
        if !self.is_stroked() || self.stroke_width <= 0.0 {
            return 0.0;
        }
        let half = self.stroke_width * 0.5;
        let mut outset = half;
        if self.stroke_join == StrokeJoin::Miter {
            outset = outset.max(half * self.stroke_miter.max(1.0));
        }
        if open_contours && self.stroke_cap == StrokeCap::Square {
            outset = outset.max(half * std::f32::consts::SQRT_2);
        }
        outset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_has_no_stroke_outset() {
        let paint = Paint {
            stroke_width: 10.0,
            ..Paint::default()
        };
        assert_eq!(paint.stroke_outset(true), 0.0);
    }

    #[test]
    fn test_miter_join_outset() {
        let paint = Paint {
            draw_style: DrawStyle::Stroke,
            stroke_width: 2.0,
            ..Paint::default()
        };
        assert_eq!(paint.stroke_outset(false), 4.0);
    }

    #[test]
    fn test_square_cap_outset_on_open_contours() {
        let paint = Paint {
            draw_style: DrawStyle::Stroke,
            stroke_width: 2.0,
            stroke_join: StrokeJoin::Round,
            stroke_cap: StrokeCap::Square,
            ..Paint::default()
        };
        assert_eq!(paint.stroke_outset(false), 1.0);
        assert!((paint.stroke_outset(true) - std::f32::consts::SQRT_2).abs() < 1e-6);
    }
}
