//! The op catalog and record header encoding.
//!
//! Every record in a display list buffer starts with a 4-byte header: the
//! [`OpKind`] tag in the low 8 bits and the record's total byte length in
//! the high 24 bits. The length always includes the header and the padding
//! that keeps the next record aligned to the pointer width.

use strum_macros::{Display, EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// Size of the encoded header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Records are padded to a multiple of the pointer width.
pub const RECORD_ALIGN: usize = size_of::<usize>();

/// Largest encodable record size (24 bits).
pub const MAX_RECORD_SIZE: usize = (1 << 24) - 1;

/// The closed set of record kinds.
///
/// The discriminant is the tag byte stored in each record header. New kinds
/// are appended; existing tags never change meaning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, FromRepr, IntoStaticStr,
)]
#[repr(u8)]
pub enum OpKind {
    /// Set anti-aliasing.
    SetAntiAlias,
    /// Set dithering.
    SetDither,
    /// Set color inversion.
    SetInvertColors,
    /// Set the stroke cap.
    SetStrokeCap,
    /// Set the stroke join.
    SetStrokeJoin,
    /// Set fill/stroke style.
    SetDrawStyle,
    /// Set the stroke width.
    SetStrokeWidth,
    /// Set the miter limit.
    SetStrokeMiter,
    /// Set the solid color.
    SetColor,
    /// Set the blend mode.
    SetBlendMode,
    /// Set a shader.
    SetShader,
    /// Remove the shader.
    ClearShader,
    /// Set a color filter.
    SetColorFilter,
    /// Remove the color filter.
    ClearColorFilter,
    /// Set an image filter.
    SetImageFilter,
    /// Remove the image filter.
    ClearImageFilter,
    /// Set a path effect.
    SetPathEffect,
    /// Remove the path effect.
    ClearPathEffect,
    /// Set a mask filter.
    SetMaskFilter,
    /// Remove the mask filter.
    ClearMaskFilter,

    /// Push matrix and clip state.
    Save,
    /// Push state and an offscreen layer.
    SaveLayer,
    /// Push state and a bounded offscreen layer.
    SaveLayerBounds,
    /// Push state and a layer seeded by a backdrop filter.
    SaveLayerBackdrop,
    /// Push state and a bounded layer seeded by a backdrop filter.
    SaveLayerBackdropBounds,
    /// Pop state, compositing any layer.
    Restore,

    /// Translate the matrix.
    Translate,
    /// Scale the matrix.
    Scale,
    /// Rotate the matrix.
    Rotate,
    /// Skew the matrix.
    Skew,
    /// Concatenate a 2D affine matrix.
    Transform2DAffine,
    /// Concatenate a 4x4 matrix.
    TransformFullPerspective,
    /// Reset the matrix to identity.
    TransformReset,

    /// Intersect the clip with a rect.
    ClipIntersectRect,
    /// Intersect the clip with an oval.
    ClipIntersectOval,
    /// Intersect the clip with a rounded rect.
    ClipIntersectRRect,
    /// Intersect the clip with a path.
    ClipIntersectPath,
    /// Subtract a rect from the clip.
    ClipDifferenceRect,
    /// Subtract an oval from the clip.
    ClipDifferenceOval,
    /// Subtract a rounded rect from the clip.
    ClipDifferenceRRect,
    /// Subtract a path from the clip.
    ClipDifferencePath,

    /// Fill the clip with the paint.
    DrawPaint,
    /// Fill the clip with a color.
    DrawColor,
    /// Draw a line segment.
    DrawLine,
    /// Draw a rect.
    DrawRect,
    /// Draw an oval.
    DrawOval,
    /// Draw a circle.
    DrawCircle,
    /// Draw a rounded rect.
    DrawRRect,
    /// Draw the area between two rounded rects.
    DrawDRRect,
    /// Draw a path.
    DrawPath,
    /// Draw an arc.
    DrawArc,
    /// Draw individual points.
    DrawPoints,
    /// Draw point pairs as segments.
    DrawLines,
    /// Draw an open polyline.
    DrawPolygon,
    /// Draw a triangle mesh.
    DrawVertices,
    /// Draw an image at a point.
    DrawImage,
    /// Draw part of an image into a rect.
    DrawImageRect,
    /// Draw a nine-patch image.
    DrawImageNine,
    /// Draw an image stretched along lattice dividers.
    DrawImageLattice,
    /// Draw sprites from an atlas image.
    DrawAtlas,
    /// Draw sprites from an atlas image with a cull rect.
    DrawAtlasCulled,
    /// Draw a recorded picture.
    DrawPicture,
    /// Draw a recorded picture under a matrix.
    DrawPictureMatrix,
    /// Draw a nested display list.
    DrawDisplayList,
    /// Draw a text blob.
    DrawTextBlob,
    /// Draw an elevation shadow.
    DrawShadow,
    /// Draw an elevation shadow behind a transparent occluder.
    DrawShadowTransparentOccluder,
}

impl OpKind {
    /// Human-readable name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// True if two records of this kind must be compared field by field.
    ///
    /// Kinds holding resource indices compare the resources they refer to,
    /// and kinds holding rounded rects compare geometry numerically so
    /// that `-0.0` equals `0.0`. Every other kind is equal exactly when
    /// its bytes are.
    #[must_use]
    pub const fn compares_by_value(self) -> bool {
        matches!(
            self,
            Self::SetShader
                | Self::SetColorFilter
                | Self::SetImageFilter
                | Self::SetPathEffect
                | Self::SetMaskFilter
                | Self::SaveLayerBackdrop
                | Self::SaveLayerBackdropBounds
                | Self::ClipIntersectRRect
                | Self::ClipDifferenceRRect
                | Self::ClipIntersectPath
                | Self::ClipDifferencePath
                | Self::DrawRRect
                | Self::DrawDRRect
                | Self::DrawPath
                | Self::DrawVertices
                | Self::DrawImage
                | Self::DrawImageRect
                | Self::DrawImageNine
                | Self::DrawImageLattice
                | Self::DrawAtlas
                | Self::DrawAtlasCulled
                | Self::DrawPicture
                | Self::DrawPictureMatrix
                | Self::DrawDisplayList
                | Self::DrawTextBlob
                | Self::DrawShadow
                | Self::DrawShadowTransparentOccluder
        )
    }

    /// True if records of this kind draw something.
    #[must_use]
    pub const fn is_draw(self) -> bool {
        self as u8 >= Self::DrawPaint as u8
    }
}

/// Result of comparing two records of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    /// The records are equal.
    Equal,
    /// The records differ.
    NotEqual,
    /// Byte equality of the records decides; the caller may batch it with
    /// neighboring records.
    UseBulkCompare,
}

/// A decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpHeader {
    /// Record kind.
    pub kind: OpKind,
    /// Total record length in bytes, including the header and padding.
    pub size: usize,
}

impl OpHeader {
    /// Pack into the on-buffer representation.
    ///
    /// # Panics
    /// Panics if `size` does not fit in 24 bits.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        assert!(
            self.size <= MAX_RECORD_SIZE,
            "{} record of {} bytes exceeds the 24-bit size field",
            self.kind,
            self.size
        );
        let size = u32::try_from(self.size).unwrap_or(u32::MAX);
        ((size << 8) | u32::from(self.kind as u8)).to_le_bytes()
    }

    /// Unpack from the on-buffer representation.
    ///
    /// # Panics
    /// Panics on a tag outside the catalog. Tags are written only by the
    /// builder, so an unknown tag means the buffer is corrupt.
    #[must_use]
    pub fn decode(bytes: [u8; HEADER_SIZE]) -> Self {
        let word = u32::from_le_bytes(bytes);
        let tag = (word & 0xff) as u8;
        let Some(kind) = OpKind::from_repr(tag) else {
            unreachable!("unknown display list op tag {tag}");
        };
        Self {
            kind,
            size: (word >> 8) as usize,
        }
    }
}

/// Round `len` up to the record alignment.
#[must_use]
pub const fn align_record(len: usize) -> usize {
    len.div_ceil(RECORD_ALIGN) * RECORD_ALIGN
}
