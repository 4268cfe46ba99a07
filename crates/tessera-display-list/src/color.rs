//! Colors and blend modes.

use serde::Serialize;
use strum_macros::{Display, EnumCount, EnumIter, FromRepr};

/// sRGB color represented as unpremultiplied RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
    /// Alpha channel (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create a color from all four channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Unpack a `0xAARRGGBB` value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack as `0xAARRGGBB`, the form stored in the op buffer.
    #[must_use]
    pub const fn argb(&self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// The same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(&self, a: u8) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Alpha is 255.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Alpha is 0.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

/// Porter-Duff and separable/non-separable blend modes.
///
/// The discriminant is the byte stored in the op buffer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Display,
    EnumCount,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
pub enum BlendMode {
    /// `r = 0`
    Clear,
    /// `r = s`
    Src,
    /// `r = d`
    Dst,
    /// `r = s + (1-sa)*d`
    #[default]
    SrcOver,
    /// `r = d + (1-da)*s`
    DstOver,
    /// `r = s * da`
    SrcIn,
    /// `r = d * sa`
    DstIn,
    /// `r = s * (1-da)`
    SrcOut,
    /// `r = d * (1-sa)`
    DstOut,
    /// `r = s*da + d*(1-sa)`
    SrcATop,
    /// `r = d*sa + s*(1-da)`
    DstATop,
    /// `r = s*(1-da) + d*(1-sa)`
    Xor,
    /// `r = min(s + d, 1)`
    Plus,
    /// `r = s*d`
    Modulate,
    /// `r = s + d - s*d`
    Screen,
    /// Multiply or screen, depending on destination.
    Overlay,
    /// Darker of source and destination.
    Darken,
    /// Lighter of source and destination.
    Lighten,
    /// Brighten destination to reflect source.
    ColorDodge,
    /// Darken destination to reflect source.
    ColorBurn,
    /// Multiply or screen, depending on source.
    HardLight,
    /// Lighten or darken, depending on source.
    SoftLight,
    /// Subtract darker from lighter with higher contrast.
    Difference,
    /// Subtract darker from lighter with lower contrast.
    Exclusion,
    /// `r = s*(1-da) + d*(1-sa) + s*d`
    Multiply,
    /// Hue of source with saturation and luminosity of destination.
    Hue,
    /// Saturation of source with hue and luminosity of destination.
    Saturation,
    /// Hue and saturation of source with luminosity of destination.
    Color,
    /// Luminosity of source with hue and saturation of destination.
    Luminosity,
}

impl BlendMode {
    /// True if drawing with this mode changes destination pixels where the
    /// source is transparent, so the affected area is the whole clip rather
    /// than the drawn geometry.
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        matches!(
            self,
            Self::Clear
                | Self::Src
                | Self::SrcIn
                | Self::DstIn
                | Self::SrcOut
                | Self::DstATop
                | Self::Modulate
        )
    }
}
