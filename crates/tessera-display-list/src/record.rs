//! Typed records.
//!
//! [`DisplayOp`] is the decoded form of one record. The builder constructs
//! one per recorded call and encodes it; playback decodes each record back
//! into a `DisplayOp` and forwards it to a [`Dispatcher`]. Both directions
//! live here so the byte layout of every kind is defined in one place.

use std::borrow::Cow;
use std::sync::Arc;

use tessera_common::Image;

use crate::color::{BlendMode, Color};
use crate::dispatcher::Dispatcher;
use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ImageFilter, MaskFilter, PathEffect, Shader};
use crate::geometry::{IRect, Matrix, Point, RRect, RSTransform, Rect};
use crate::op::{CompareResult, OpKind};
use crate::paint::{
    ClipOp, DrawStyle, ImageSampling, PointMode, SrcRectConstraint, StrokeCap, StrokeJoin,
};
use crate::path::Path;
use crate::resource::{Resource, ResourceTable, TextBlob, Vertices};
use crate::storage::{RecordReader, RecordWriter};

/// One decoded record. Resources are borrowed from the owning list's
/// resource table; trailing arrays are borrowed when recording and owned
/// when decoded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DisplayOp<'a> {
    SetAntiAlias(bool),
    SetDither(bool),
    SetInvertColors(bool),
    SetStrokeCap(StrokeCap),
    SetStrokeJoin(StrokeJoin),
    SetDrawStyle(DrawStyle),
    SetStrokeWidth(f32),
    SetStrokeMiter(f32),
    SetColor(Color),
    SetBlendMode(BlendMode),
    SetShader(Option<&'a Arc<Shader>>),
    SetColorFilter(Option<&'a Arc<ColorFilter>>),
    SetImageFilter(Option<&'a Arc<ImageFilter>>),
    SetPathEffect(Option<&'a Arc<PathEffect>>),
    SetMaskFilter(Option<&'a Arc<MaskFilter>>),

    Save,
    SaveLayer {
        bounds: Option<Rect>,
        with_attributes: bool,
        backdrop: Option<&'a Arc<ImageFilter>>,
    },
    Restore,

    Translate {
        tx: f32,
        ty: f32,
    },
    Scale {
        sx: f32,
        sy: f32,
    },
    Rotate {
        degrees: f32,
    },
    Skew {
        sx: f32,
        sy: f32,
    },
    Transform2DAffine([f32; 6]),
    TransformFullPerspective(Matrix),
    TransformReset,

    ClipRect {
        rect: Rect,
        op: ClipOp,
        anti_alias: bool,
    },
    ClipOval {
        bounds: Rect,
        op: ClipOp,
        anti_alias: bool,
    },
    ClipRRect {
        rrect: RRect,
        op: ClipOp,
        anti_alias: bool,
    },
    ClipPath {
        path: &'a Arc<Path>,
        op: ClipOp,
        anti_alias: bool,
    },

    DrawPaint,
    DrawColor {
        color: Color,
        mode: BlendMode,
    },
    DrawLine {
        p0: Point,
        p1: Point,
    },
    DrawRect(Rect),
    DrawOval(Rect),
    DrawCircle {
        center: Point,
        radius: f32,
    },
    DrawRRect(RRect),
    DrawDRRect {
        outer: RRect,
        inner: RRect,
    },
    DrawPath(&'a Arc<Path>),
    DrawArc {
        bounds: Rect,
        start: f32,
        sweep: f32,
        use_center: bool,
    },
    DrawPoints {
        mode: PointMode,
        points: Cow<'a, [Point]>,
    },
    DrawVertices {
        vertices: &'a Arc<Vertices>,
        mode: BlendMode,
    },
    DrawImage {
        image: &'a Arc<Image>,
        top_left: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    },
    DrawImageRect {
        image: &'a Arc<Image>,
        src: Rect,
        dst: Rect,
        sampling: ImageSampling,
        with_attributes: bool,
        constraint: SrcRectConstraint,
    },
    DrawImageNine {
        image: &'a Arc<Image>,
        center: IRect,
        dst: Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    },
    DrawImageLattice {
        image: &'a Arc<Image>,
        x_divs: Cow<'a, [i32]>,
        y_divs: Cow<'a, [i32]>,
        src: IRect,
        dst: Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    },
    DrawAtlas {
        atlas: &'a Arc<Image>,
        transforms: Cow<'a, [RSTransform]>,
        texture: Cow<'a, [Rect]>,
        colors: Cow<'a, [Color]>,
        mode: BlendMode,
        sampling: ImageSampling,
        cull: Option<Rect>,
        with_attributes: bool,
    },
    DrawPicture {
        picture: &'a Arc<DisplayList>,
        matrix: Option<Matrix>,
        with_attributes: bool,
    },
    DrawDisplayList(&'a Arc<DisplayList>),
    DrawTextBlob {
        blob: &'a Arc<TextBlob>,
        x: f32,
        y: f32,
    },
    DrawShadow {
        path: &'a Arc<Path>,
        color: Color,
        elevation: f32,
        transparent_occluder: bool,
        device_pixel_ratio: f32,
    },
}

/// Decode a `#[repr(u8)]` enum field.
fn enum_field<T>(value: u8, from_repr: fn(u8) -> Option<T>) -> T {
    from_repr(value).unwrap_or_else(|| {
        unreachable!(
            "invalid {} value {value} in display list record",
            std::any::type_name::<T>()
        )
    })
}

const fn clip_kind(op: ClipOp, intersect: OpKind, difference: OpKind) -> OpKind {
    match op {
        ClipOp::Intersect => intersect,
        ClipOp::Difference => difference,
    }
}

const fn clip_op_of(kind: OpKind) -> ClipOp {
    match kind {
        OpKind::ClipDifferenceRect
        | OpKind::ClipDifferenceOval
        | OpKind::ClipDifferenceRRect
        | OpKind::ClipDifferencePath => ClipOp::Difference,
        _ => ClipOp::Intersect,
    }
}

impl<'a> DisplayOp<'a> {
    /// The record kind this op is stored as.
    pub(crate) const fn kind(&self) -> OpKind {
        match self {
            Self::SetAntiAlias(_) => OpKind::SetAntiAlias,
            Self::SetDither(_) => OpKind::SetDither,
            Self::SetInvertColors(_) => OpKind::SetInvertColors,
            Self::SetStrokeCap(_) => OpKind::SetStrokeCap,
            Self::SetStrokeJoin(_) => OpKind::SetStrokeJoin,
            Self::SetDrawStyle(_) => OpKind::SetDrawStyle,
            Self::SetStrokeWidth(_) => OpKind::SetStrokeWidth,
            Self::SetStrokeMiter(_) => OpKind::SetStrokeMiter,
            Self::SetColor(_) => OpKind::SetColor,
            Self::SetBlendMode(_) => OpKind::SetBlendMode,
            Self::SetShader(Some(_)) => OpKind::SetShader,
            Self::SetShader(None) => OpKind::ClearShader,
            Self::SetColorFilter(Some(_)) => OpKind::SetColorFilter,
            Self::SetColorFilter(None) => OpKind::ClearColorFilter,
            Self::SetImageFilter(Some(_)) => OpKind::SetImageFilter,
            Self::SetImageFilter(None) => OpKind::ClearImageFilter,
            Self::SetPathEffect(Some(_)) => OpKind::SetPathEffect,
            Self::SetPathEffect(None) => OpKind::ClearPathEffect,
            Self::SetMaskFilter(Some(_)) => OpKind::SetMaskFilter,
            Self::SetMaskFilter(None) => OpKind::ClearMaskFilter,
            Self::Save => OpKind::Save,
            Self::SaveLayer {
                bounds, backdrop, ..
            } => match (bounds.is_some(), backdrop.is_some()) {
                (false, false) => OpKind::SaveLayer,
                (true, false) => OpKind::SaveLayerBounds,
                (false, true) => OpKind::SaveLayerBackdrop,
                (true, true) => OpKind::SaveLayerBackdropBounds,
            },
            Self::Restore => OpKind::Restore,
            Self::Translate { .. } => OpKind::Translate,
            Self::Scale { .. } => OpKind::Scale,
            Self::Rotate { .. } => OpKind::Rotate,
            Self::Skew { .. } => OpKind::Skew,
            Self::Transform2DAffine(_) => OpKind::Transform2DAffine,
            Self::TransformFullPerspective(_) => OpKind::TransformFullPerspective,
            Self::TransformReset => OpKind::TransformReset,
            Self::ClipRect { op, .. } => {
                clip_kind(*op, OpKind::ClipIntersectRect, OpKind::ClipDifferenceRect)
            }
            Self::ClipOval { op, .. } => {
                clip_kind(*op, OpKind::ClipIntersectOval, OpKind::ClipDifferenceOval)
            }
            Self::ClipRRect { op, .. } => {
                clip_kind(*op, OpKind::ClipIntersectRRect, OpKind::ClipDifferenceRRect)
            }
            Self::ClipPath { op, .. } => {
                clip_kind(*op, OpKind::ClipIntersectPath, OpKind::ClipDifferencePath)
            }
            Self::DrawPaint => OpKind::DrawPaint,
            Self::DrawColor { .. } => OpKind::DrawColor,
            Self::DrawLine { .. } => OpKind::DrawLine,
            Self::DrawRect(_) => OpKind::DrawRect,
            Self::DrawOval(_) => OpKind::DrawOval,
            Self::DrawCircle { .. } => OpKind::DrawCircle,
            Self::DrawRRect(_) => OpKind::DrawRRect,
            Self::DrawDRRect { .. } => OpKind::DrawDRRect,
            Self::DrawPath(_) => OpKind::DrawPath,
            Self::DrawArc { .. } => OpKind::DrawArc,
            Self::DrawPoints { mode, .. } => match mode {
                PointMode::Points => OpKind::DrawPoints,
                PointMode::Lines => OpKind::DrawLines,
                PointMode::Polygon => OpKind::DrawPolygon,
            },
            Self::DrawVertices { .. } => OpKind::DrawVertices,
            Self::DrawImage { .. } => OpKind::DrawImage,
            Self::DrawImageRect { .. } => OpKind::DrawImageRect,
            Self::DrawImageNine { .. } => OpKind::DrawImageNine,
            Self::DrawImageLattice { .. } => OpKind::DrawImageLattice,
            Self::DrawAtlas { cull: None, .. } => OpKind::DrawAtlas,
            Self::DrawAtlas { cull: Some(_), .. } => OpKind::DrawAtlasCulled,
            Self::DrawPicture { matrix: None, .. } => OpKind::DrawPicture,
            Self::DrawPicture {
                matrix: Some(_), ..
            } => OpKind::DrawPictureMatrix,
            Self::DrawDisplayList(_) => OpKind::DrawDisplayList,
            Self::DrawTextBlob { .. } => OpKind::DrawTextBlob,
            Self::DrawShadow {
                transparent_occluder: false,
                ..
            } => OpKind::DrawShadow,
            Self::DrawShadow {
                transparent_occluder: true,
                ..
            } => OpKind::DrawShadowTransparentOccluder,
        }
    }

    /// Write the record fields, registering resources in `resources`.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn encode(&self, w: &mut RecordWriter<'_>, resources: &mut ResourceTable) {
        match self {
            Self::SetAntiAlias(v) | Self::SetDither(v) | Self::SetInvertColors(v) => w.bool(*v),
            Self::SetStrokeCap(cap) => w.u8(*cap as u8),
            Self::SetStrokeJoin(join) => w.u8(*join as u8),
            Self::SetDrawStyle(style) => w.u8(*style as u8),
            Self::SetStrokeWidth(v) | Self::SetStrokeMiter(v) => w.f32(*v),
            Self::SetColor(color) => w.color(*color),
            Self::SetBlendMode(mode) => w.u8(*mode as u8),
            Self::SetShader(Some(shader)) => {
                w.u32(resources.add(Resource::Shader(Arc::clone(shader))));
            }
            Self::SetColorFilter(Some(filter)) => {
                w.u32(resources.add(Resource::ColorFilter(Arc::clone(filter))));
            }
            Self::SetImageFilter(Some(filter)) => {
                w.u32(resources.add(Resource::ImageFilter(Arc::clone(filter))));
            }
            Self::SetPathEffect(Some(effect)) => {
                w.u32(resources.add(Resource::PathEffect(Arc::clone(effect))));
            }
            Self::SetMaskFilter(Some(filter)) => {
                w.u32(resources.add(Resource::MaskFilter(Arc::clone(filter))));
            }
            Self::SetShader(None)
            | Self::SetColorFilter(None)
            | Self::SetImageFilter(None)
            | Self::SetPathEffect(None)
            | Self::SetMaskFilter(None)
            | Self::Save
            | Self::Restore
            | Self::TransformReset
            | Self::DrawPaint => {}
            Self::SaveLayer {
                bounds,
                with_attributes,
                backdrop,
            } => {
                w.bool(*with_attributes);
                if let Some(bounds) = bounds {
                    w.rect(bounds);
                }
                if let Some(backdrop) = backdrop {
                    w.u32(resources.add(Resource::ImageFilter(Arc::clone(backdrop))));
                }
            }
            Self::Translate { tx: x, ty: y }
            | Self::Scale { sx: x, sy: y }
            | Self::Skew { sx: x, sy: y } => {
                w.f32(*x);
                w.f32(*y);
            }
            Self::Rotate { degrees } => w.f32(*degrees),
            Self::Transform2DAffine(values) => {
                for v in values {
                    w.f32(*v);
                }
            }
            Self::TransformFullPerspective(matrix) => w.matrix(matrix),
            Self::ClipRect {
                rect, anti_alias, ..
            }
            | Self::ClipOval {
                bounds: rect,
                anti_alias,
                ..
            } => {
                w.rect(rect);
                w.bool(*anti_alias);
            }
            Self::ClipRRect {
                rrect, anti_alias, ..
            } => {
                w.rrect(rrect);
                w.bool(*anti_alias);
            }
            Self::ClipPath {
                path, anti_alias, ..
            } => {
                w.u32(resources.add(Resource::Path(Arc::clone(path))));
                w.bool(*anti_alias);
            }
            Self::DrawColor { color, mode } => {
                w.color(*color);
                w.u8(*mode as u8);
            }
            Self::DrawLine { p0, p1 } => {
                w.point(*p0);
                w.point(*p1);
            }
            Self::DrawRect(rect) | Self::DrawOval(rect) => w.rect(rect),
            Self::DrawCircle { center, radius } => {
                w.point(*center);
                w.f32(*radius);
            }
            Self::DrawRRect(rrect) => w.rrect(rrect),
            Self::DrawDRRect { outer, inner } => {
                w.rrect(outer);
                w.rrect(inner);
            }
            Self::DrawPath(path) => w.u32(resources.add(Resource::Path(Arc::clone(path)))),
            Self::DrawArc {
                bounds,
                start,
                sweep,
                use_center,
            } => {
                w.rect(bounds);
                w.f32(*start);
                w.f32(*sweep);
                w.bool(*use_center);
            }
            Self::DrawPoints { points, .. } => {
                w.count(points.len());
                for p in points.iter() {
                    w.point(*p);
                }
            }
            Self::DrawVertices { vertices, mode } => {
                w.u32(resources.add(Resource::Vertices(Arc::clone(vertices))));
                w.u8(*mode as u8);
            }
            Self::DrawImage {
                image,
                top_left,
                sampling,
                with_attributes,
            } => {
                w.u32(resources.add(Resource::Image(Arc::clone(image))));
                w.point(*top_left);
                w.u8(*sampling as u8);
                w.bool(*with_attributes);
            }
            Self::DrawImageRect {
                image,
                src,
                dst,
                sampling,
                with_attributes,
                constraint,
            } => {
                w.u32(resources.add(Resource::Image(Arc::clone(image))));
                w.rect(src);
                w.rect(dst);
                w.u8(*sampling as u8);
                w.bool(*with_attributes);
                w.u8(*constraint as u8);
            }
            Self::DrawImageNine {
                image,
                center,
                dst,
                sampling,
                with_attributes,
            } => {
                w.u32(resources.add(Resource::Image(Arc::clone(image))));
                w.irect(center);
                w.rect(dst);
                w.u8(*sampling as u8);
                w.bool(*with_attributes);
            }
            Self::DrawImageLattice {
                image,
                x_divs,
                y_divs,
                src,
                dst,
                sampling,
                with_attributes,
            } => {
                w.u32(resources.add(Resource::Image(Arc::clone(image))));
                w.count(x_divs.len());
                w.count(y_divs.len());
                w.irect(src);
                w.rect(dst);
                w.u8(*sampling as u8);
                w.bool(*with_attributes);
                for div in x_divs.iter().chain(y_divs.iter()) {
                    w.i32(*div);
                }
            }
            Self::DrawAtlas {
                atlas,
                transforms,
                texture,
                colors,
                mode,
                sampling,
                cull,
                with_attributes,
            } => {
                debug_assert_eq!(transforms.len(), texture.len());
                debug_assert!(colors.is_empty() || colors.len() == transforms.len());
                w.u32(resources.add(Resource::Image(Arc::clone(atlas))));
                w.count(transforms.len());
                w.bool(!colors.is_empty());
                w.u8(*mode as u8);
                w.u8(*sampling as u8);
                w.bool(*with_attributes);
                if let Some(cull) = cull {
                    w.rect(cull);
                }
                for t in transforms.iter() {
                    w.rstransform(t);
                }
                for r in texture.iter() {
                    w.rect(r);
                }
                for c in colors.iter() {
                    w.color(*c);
                }
            }
            Self::DrawPicture {
                picture,
                matrix,
                with_attributes,
            } => {
                w.u32(resources.add(Resource::DisplayList(Arc::clone(picture))));
                w.bool(*with_attributes);
                if let Some(matrix) = matrix {
                    w.matrix(matrix);
                }
            }
            Self::DrawDisplayList(list) => {
                w.u32(resources.add(Resource::DisplayList(Arc::clone(list))));
            }
            Self::DrawTextBlob { blob, x, y } => {
                w.u32(resources.add(Resource::TextBlob(Arc::clone(blob))));
                w.f32(*x);
                w.f32(*y);
            }
            Self::DrawShadow {
                path,
                color,
                elevation,
                device_pixel_ratio,
                ..
            } => {
                w.u32(resources.add(Resource::Path(Arc::clone(path))));
                w.color(*color);
                w.f32(*elevation);
                w.f32(*device_pixel_ratio);
            }
        }
    }

    /// Read a record of `kind` from its body.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn decode(kind: OpKind, body: &[u8], resources: &'a ResourceTable) -> Self {
        let mut r = RecordReader::new(body);
        let op = match kind {
            OpKind::SetAntiAlias => Self::SetAntiAlias(r.bool()),
            OpKind::SetDither => Self::SetDither(r.bool()),
            OpKind::SetInvertColors => Self::SetInvertColors(r.bool()),
            OpKind::SetStrokeCap => Self::SetStrokeCap(enum_field(r.u8(), StrokeCap::from_repr)),
            OpKind::SetStrokeJoin => {
                Self::SetStrokeJoin(enum_field(r.u8(), StrokeJoin::from_repr))
            }
            OpKind::SetDrawStyle => Self::SetDrawStyle(enum_field(r.u8(), DrawStyle::from_repr)),
            OpKind::SetStrokeWidth => Self::SetStrokeWidth(r.f32()),
            OpKind::SetStrokeMiter => Self::SetStrokeMiter(r.f32()),
            OpKind::SetColor => Self::SetColor(r.color()),
            OpKind::SetBlendMode => Self::SetBlendMode(enum_field(r.u8(), BlendMode::from_repr)),
            OpKind::SetShader => Self::SetShader(Some(resources.shader(r.u32()))),
            OpKind::ClearShader => Self::SetShader(None),
            OpKind::SetColorFilter => Self::SetColorFilter(Some(resources.color_filter(r.u32()))),
            OpKind::ClearColorFilter => Self::SetColorFilter(None),
            OpKind::SetImageFilter => Self::SetImageFilter(Some(resources.image_filter(r.u32()))),
            OpKind::ClearImageFilter => Self::SetImageFilter(None),
            OpKind::SetPathEffect => Self::SetPathEffect(Some(resources.path_effect(r.u32()))),
            OpKind::ClearPathEffect => Self::SetPathEffect(None),
            OpKind::SetMaskFilter => Self::SetMaskFilter(Some(resources.mask_filter(r.u32()))),
            OpKind::ClearMaskFilter => Self::SetMaskFilter(None),
            OpKind::Save => Self::Save,
            OpKind::SaveLayer
            | OpKind::SaveLayerBounds
            | OpKind::SaveLayerBackdrop
            | OpKind::SaveLayerBackdropBounds => {
                let with_attributes = r.bool();
                let bounds = matches!(
                    kind,
                    OpKind::SaveLayerBounds | OpKind::SaveLayerBackdropBounds
                )
                .then(|| r.rect());
                let backdrop = matches!(
                    kind,
                    OpKind::SaveLayerBackdrop | OpKind::SaveLayerBackdropBounds
                )
                .then(|| resources.image_filter(r.u32()));
                Self::SaveLayer {
                    bounds,
                    with_attributes,
                    backdrop,
                }
            }
            OpKind::Restore => Self::Restore,
            OpKind::Translate => {
                let tx = r.f32();
                Self::Translate { tx, ty: r.f32() }
            }
            OpKind::Scale => {
                let sx = r.f32();
                Self::Scale { sx, sy: r.f32() }
            }
            OpKind::Rotate => Self::Rotate { degrees: r.f32() },
            OpKind::Skew => {
                let sx = r.f32();
                Self::Skew { sx, sy: r.f32() }
            }
            OpKind::Transform2DAffine => {
                let mut values = [0.0; 6];
                for v in &mut values {
                    *v = r.f32();
                }
                Self::Transform2DAffine(values)
            }
            OpKind::TransformFullPerspective => Self::TransformFullPerspective(r.matrix()),
            OpKind::TransformReset => Self::TransformReset,
            OpKind::ClipIntersectRect | OpKind::ClipDifferenceRect => {
                let rect = r.rect();
                Self::ClipRect {
                    rect,
                    op: clip_op_of(kind),
                    anti_alias: r.bool(),
                }
            }
            OpKind::ClipIntersectOval | OpKind::ClipDifferenceOval => {
                let bounds = r.rect();
                Self::ClipOval {
                    bounds,
                    op: clip_op_of(kind),
                    anti_alias: r.bool(),
                }
            }
            OpKind::ClipIntersectRRect | OpKind::ClipDifferenceRRect => {
                let rrect = r.rrect();
                Self::ClipRRect {
                    rrect,
                    op: clip_op_of(kind),
                    anti_alias: r.bool(),
                }
            }
            OpKind::ClipIntersectPath | OpKind::ClipDifferencePath => {
                let path = resources.path(r.u32());
                Self::ClipPath {
                    path,
                    op: clip_op_of(kind),
                    anti_alias: r.bool(),
                }
            }
            OpKind::DrawPaint => Self::DrawPaint,
            OpKind::DrawColor => {
                let color = r.color();
                Self::DrawColor {
                    color,
                    mode: enum_field(r.u8(), BlendMode::from_repr),
                }
            }
            OpKind::DrawLine => {
                let p0 = r.point();
                Self::DrawLine { p0, p1: r.point() }
            }
            OpKind::DrawRect => Self::DrawRect(r.rect()),
            OpKind::DrawOval => Self::DrawOval(r.rect()),
            OpKind::DrawCircle => {
                let center = r.point();
                Self::DrawCircle {
                    center,
                    radius: r.f32(),
                }
            }
            OpKind::DrawRRect => Self::DrawRRect(r.rrect()),
            OpKind::DrawDRRect => {
                let outer = r.rrect();
                Self::DrawDRRect {
                    outer,
                    inner: r.rrect(),
                }
            }
            OpKind::DrawPath => Self::DrawPath(resources.path(r.u32())),
            OpKind::DrawArc => {
                let bounds = r.rect();
                let start = r.f32();
                let sweep = r.f32();
                Self::DrawArc {
                    bounds,
                    start,
                    sweep,
                    use_center: r.bool(),
                }
            }
            OpKind::DrawPoints | OpKind::DrawLines | OpKind::DrawPolygon => {
                let mode = match kind {
                    OpKind::DrawPoints => PointMode::Points,
                    OpKind::DrawLines => PointMode::Lines,
                    _ => PointMode::Polygon,
                };
                let count = r.count();
                Self::DrawPoints {
                    mode,
                    points: Cow::Owned(r.array(count, RecordReader::point)),
                }
            }
            OpKind::DrawVertices => {
                let vertices = resources.vertices(r.u32());
                Self::DrawVertices {
                    vertices,
                    mode: enum_field(r.u8(), BlendMode::from_repr),
                }
            }
            OpKind::DrawImage => {
                let image = resources.image(r.u32());
                let top_left = r.point();
                let sampling = enum_field(r.u8(), ImageSampling::from_repr);
                Self::DrawImage {
                    image,
                    top_left,
                    sampling,
                    with_attributes: r.bool(),
                }
            }
            OpKind::DrawImageRect => {
                let image = resources.image(r.u32());
                let src = r.rect();
                let dst = r.rect();
                let sampling = enum_field(r.u8(), ImageSampling::from_repr);
                let with_attributes = r.bool();
                Self::DrawImageRect {
                    image,
                    src,
                    dst,
                    sampling,
                    with_attributes,
                    constraint: enum_field(r.u8(), SrcRectConstraint::from_repr),
                }
            }
            OpKind::DrawImageNine => {
                let image = resources.image(r.u32());
                let center = r.irect();
                let dst = r.rect();
                let sampling = enum_field(r.u8(), ImageSampling::from_repr);
                Self::DrawImageNine {
                    image,
                    center,
                    dst,
                    sampling,
                    with_attributes: r.bool(),
                }
            }
            OpKind::DrawImageLattice => {
                let image = resources.image(r.u32());
                let x_count = r.count();
                let y_count = r.count();
                let src = r.irect();
                let dst = r.rect();
                let sampling = enum_field(r.u8(), ImageSampling::from_repr);
                let with_attributes = r.bool();
                let x_divs = r.array(x_count, RecordReader::i32);
                let y_divs = r.array(y_count, RecordReader::i32);
                Self::DrawImageLattice {
                    image,
                    x_divs: Cow::Owned(x_divs),
                    y_divs: Cow::Owned(y_divs),
                    src,
                    dst,
                    sampling,
                    with_attributes,
                }
            }
            OpKind::DrawAtlas | OpKind::DrawAtlasCulled => {
                let atlas = resources.image(r.u32());
                let count = r.count();
                let has_colors = r.bool();
                let mode = enum_field(r.u8(), BlendMode::from_repr);
                let sampling = enum_field(r.u8(), ImageSampling::from_repr);
                let with_attributes = r.bool();
                let cull = (kind == OpKind::DrawAtlasCulled).then(|| r.rect());
                let transforms = r.array(count, RecordReader::rstransform);
                let texture = r.array(count, RecordReader::rect);
                let colors = r.array(if has_colors { count } else { 0 }, RecordReader::color);
                Self::DrawAtlas {
                    atlas,
                    transforms: Cow::Owned(transforms),
                    texture: Cow::Owned(texture),
                    colors: Cow::Owned(colors),
                    mode,
                    sampling,
                    cull,
                    with_attributes,
                }
            }
            OpKind::DrawPicture | OpKind::DrawPictureMatrix => {
                let picture = resources.display_list(r.u32());
                let with_attributes = r.bool();
                let matrix = (kind == OpKind::DrawPictureMatrix).then(|| r.matrix());
                Self::DrawPicture {
                    picture,
                    matrix,
                    with_attributes,
                }
            }
            OpKind::DrawDisplayList => Self::DrawDisplayList(resources.display_list(r.u32())),
            OpKind::DrawTextBlob => {
                let blob = resources.text_blob(r.u32());
                let x = r.f32();
                Self::DrawTextBlob { blob, x, y: r.f32() }
            }
            OpKind::DrawShadow | OpKind::DrawShadowTransparentOccluder => {
                let path = resources.path(r.u32());
                let color = r.color();
                let elevation = r.f32();
                Self::DrawShadow {
                    path,
                    color,
                    elevation,
                    transparent_occluder: kind == OpKind::DrawShadowTransparentOccluder,
                    device_pixel_ratio: r.f32(),
                }
            }
        };
        r.finish();
        op
    }

    /// Forward this op to the matching logical dispatcher method.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn dispatch(&self, d: &mut dyn Dispatcher) {
        match self {
            Self::SetAntiAlias(v) => d.set_anti_alias(*v),
            Self::SetDither(v) => d.set_dither(*v),
            Self::SetInvertColors(v) => d.set_invert_colors(*v),
            Self::SetStrokeCap(cap) => d.set_stroke_cap(*cap),
            Self::SetStrokeJoin(join) => d.set_stroke_join(*join),
            Self::SetDrawStyle(style) => d.set_draw_style(*style),
            Self::SetStrokeWidth(width) => d.set_stroke_width(*width),
            Self::SetStrokeMiter(limit) => d.set_stroke_miter(*limit),
            Self::SetColor(color) => d.set_color(*color),
            Self::SetBlendMode(mode) => d.set_blend_mode(*mode),
            Self::SetShader(shader) => d.set_shader(*shader),
            Self::SetColorFilter(filter) => d.set_color_filter(*filter),
            Self::SetImageFilter(filter) => d.set_image_filter(*filter),
            Self::SetPathEffect(effect) => d.set_path_effect(*effect),
            Self::SetMaskFilter(filter) => d.set_mask_filter(*filter),
            Self::Save => d.save(),
            Self::SaveLayer {
                bounds,
                with_attributes,
                backdrop,
            } => d.save_layer(bounds.as_ref(), *with_attributes, *backdrop),
            Self::Restore => d.restore(),
            Self::Translate { tx, ty } => d.translate(*tx, *ty),
            Self::Scale { sx, sy } => d.scale(*sx, *sy),
            Self::Rotate { degrees } => d.rotate(*degrees),
            Self::Skew { sx, sy } => d.skew(*sx, *sy),
            Self::Transform2DAffine([mxx, mxy, mxt, myx, myy, myt]) => {
                d.transform_2d_affine(*mxx, *mxy, *mxt, *myx, *myy, *myt);
            }
            Self::TransformFullPerspective(matrix) => d.transform_full_perspective(matrix),
            Self::TransformReset => d.transform_reset(),
            Self::ClipRect {
                rect,
                op,
                anti_alias,
            } => d.clip_rect(rect, *op, *anti_alias),
            Self::ClipOval {
                bounds,
                op,
                anti_alias,
            } => d.clip_oval(bounds, *op, *anti_alias),
            Self::ClipRRect {
                rrect,
                op,
                anti_alias,
            } => d.clip_rrect(rrect, *op, *anti_alias),
            Self::ClipPath {
                path,
                op,
                anti_alias,
            } => d.clip_path(path, *op, *anti_alias),
            Self::DrawPaint => d.draw_paint(),
            Self::DrawColor { color, mode } => d.draw_color(*color, *mode),
            Self::DrawLine { p0, p1 } => d.draw_line(*p0, *p1),
            Self::DrawRect(rect) => d.draw_rect(rect),
            Self::DrawOval(bounds) => d.draw_oval(bounds),
            Self::DrawCircle { center, radius } => d.draw_circle(*center, *radius),
            Self::DrawRRect(rrect) => d.draw_rrect(rrect),
            Self::DrawDRRect { outer, inner } => d.draw_drrect(outer, inner),
            Self::DrawPath(path) => d.draw_path(path),
            Self::DrawArc {
                bounds,
                start,
                sweep,
                use_center,
            } => d.draw_arc(bounds, *start, *sweep, *use_center),
            Self::DrawPoints { mode, points } => d.draw_points(*mode, points),
            Self::DrawVertices { vertices, mode } => d.draw_vertices(vertices, *mode),
            Self::DrawImage {
                image,
                top_left,
                sampling,
                with_attributes,
            } => d.draw_image(image, *top_left, *sampling, *with_attributes),
            Self::DrawImageRect {
                image,
                src,
                dst,
                sampling,
                with_attributes,
                constraint,
            } => d.draw_image_rect(image, src, dst, *sampling, *with_attributes, *constraint),
            Self::DrawImageNine {
                image,
                center,
                dst,
                sampling,
                with_attributes,
            } => d.draw_image_nine(image, center, dst, *sampling, *with_attributes),
            Self::DrawImageLattice {
                image,
                x_divs,
                y_divs,
                src,
                dst,
                sampling,
                with_attributes,
            } => d.draw_image_lattice(image, x_divs, y_divs, src, dst, *sampling, *with_attributes),
            Self::DrawAtlas {
                atlas,
                transforms,
                texture,
                colors,
                mode,
                sampling,
                cull,
                with_attributes,
            } => d.draw_atlas(
                atlas,
                transforms,
                texture,
                colors,
                *mode,
                *sampling,
                cull.as_ref(),
                *with_attributes,
            ),
            Self::DrawPicture {
                picture,
                matrix,
                with_attributes,
            } => d.draw_picture(picture, matrix.as_ref(), *with_attributes),
            Self::DrawDisplayList(list) => d.draw_display_list(list),
            Self::DrawTextBlob { blob, x, y } => d.draw_text_blob(blob, *x, *y),
            Self::DrawShadow {
                path,
                color,
                elevation,
                transparent_occluder,
                device_pixel_ratio,
            } => d.draw_shadow(
                path,
                *color,
                *elevation,
                *transparent_occluder,
                *device_pixel_ratio,
            ),
        }
    }

    /// Compare with a record of the same kind from another list.
    ///
    /// Records of kinds that compare by value are equal when their
    /// resolved resources and geometry are equal; all others defer to the
    /// byte comparison of the two records.
    pub(crate) fn compare(&self, other: &Self) -> CompareResult {
        debug_assert_eq!(self.kind(), other.kind());
        if !self.kind().compares_by_value() {
            CompareResult::UseBulkCompare
        } else if self == other {
            CompareResult::Equal
        } else {
            CompareResult::NotEqual
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::OpHeader;
    use crate::storage::OpStorage;

    fn roundtrip(op: &DisplayOp<'_>) -> (OpKind, usize) {
        let mut storage = OpStorage::default();
        let mut resources = ResourceTable::default();
        let size = storage.push(op.kind(), |w| op.encode(w, &mut resources));
        let record = storage.records().next().unwrap();
        let decoded = DisplayOp::decode(record.header.kind, record.body, &resources);
        assert_eq!(&decoded, op);
        (record.header.kind, size)
    }

    #[test]
    fn test_clip_difference_keeps_its_kind() {
        let op = DisplayOp::ClipRect {
            rect: Rect::from_ltrb(0.0, 0.0, 5.0, 5.0),
            op: ClipOp::Difference,
            anti_alias: true,
        };
        assert_eq!(roundtrip(&op).0, OpKind::ClipDifferenceRect);
    }

    #[test]
    fn test_trailing_points_grow_the_record() {
        let points: Vec<Point> = (0..10).map(|i| Point::new(i as f32, 0.0)).collect();
        let op = DisplayOp::DrawPoints {
            mode: PointMode::Polygon,
            points: Cow::Borrowed(&points),
        };
        let (kind, size) = roundtrip(&op);
        assert_eq!(kind, OpKind::DrawPolygon);
        assert!(size >= 4 + 4 + 10 * 8);
    }

    #[test]
    fn test_atlas_with_and_without_colors() {
        let atlas = Arc::new(Image::solid(4, 4, [255, 0, 0, 255]).unwrap());
        let transforms = [RSTransform::new(1.0, 0.0, 10.0, 10.0)];
        let texture = [Rect::from_ltrb(0.0, 0.0, 4.0, 4.0)];
        for colors in [&[][..], &[Color::GREEN][..]] {
            let op = DisplayOp::DrawAtlas {
                atlas: &atlas,
                transforms: Cow::Borrowed(&transforms),
                texture: Cow::Borrowed(&texture),
                colors: Cow::Borrowed(colors),
                mode: BlendMode::Modulate,
                sampling: ImageSampling::Linear,
                cull: Some(Rect::from_ltrb(0.0, 0.0, 20.0, 20.0)),
                with_attributes: true,
            };
            assert_eq!(roundtrip(&op).0, OpKind::DrawAtlasCulled);
        }
    }

    #[test]
    fn test_resource_kinds_compare_by_value() {
        let a = Arc::new(Path::from_rect(&Rect::from_ltrb(0.0, 0.0, 1.0, 1.0)));
        let b = Arc::new(Path::from_rect(&Rect::from_ltrb(0.0, 0.0, 1.0, 1.0)));
        let c = Arc::new(Path::from_rect(&Rect::from_ltrb(0.0, 0.0, 2.0, 1.0)));
        assert_eq!(
            DisplayOp::DrawPath(&a).compare(&DisplayOp::DrawPath(&b)),
            CompareResult::Equal
        );
        assert_eq!(
            DisplayOp::DrawPath(&a).compare(&DisplayOp::DrawPath(&c)),
            CompareResult::NotEqual
        );
        let rect = DisplayOp::DrawRect(Rect::from_ltrb(0.0, 0.0, 1.0, 1.0));
        assert_eq!(rect.compare(&rect), CompareResult::UseBulkCompare);
    }

    #[test]
    fn test_rrect_compares_negative_zero_equal() {
        let rect = Rect::from_ltrb(0.0, 0.0, 10.0, 10.0);
        let a = RRect::from_normalized(rect, [Point::new(2.0, 2.0); 4]);
        let b = RRect::from_normalized(
            Rect::from_ltrb(-0.0, 0.0, 10.0, 10.0),
            [Point::new(2.0, 2.0); 4],
        );
        assert_eq!(
            DisplayOp::DrawRRect(a).compare(&DisplayOp::DrawRRect(b)),
            CompareResult::Equal
        );
    }

    #[test]
    fn test_header_size_matches_push() {
        let mut storage = OpStorage::default();
        let mut resources = ResourceTable::default();
        let op = DisplayOp::DrawCircle {
            center: Point::new(1.0, 1.0),
            radius: 3.0,
        };
        let size = storage.push(op.kind(), |w| op.encode(w, &mut resources));
        let header = OpHeader::decode(storage.bytes()[..4].try_into().unwrap());
        assert_eq!(header.size, size);
        assert_eq!(storage.used(), size);
    }
}
