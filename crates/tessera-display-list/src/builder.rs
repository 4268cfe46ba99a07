//! Recording display lists.

use std::borrow::Cow;
use std::mem;
use std::sync::Arc;

use tessera_common::{Image, warn_once};

use crate::color::{BlendMode, Color};
use crate::dispatcher::Dispatcher;
use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ImageFilter, MaskFilter, PathEffect, Shader};
use crate::geometry::{IRect, Matrix, Point, RRect, RSTransform, Rect};
use crate::paint::{
    ClipOp, DrawStyle, ImageSampling, Paint, PointMode, SrcRectConstraint, StrokeCap, StrokeJoin,
};
use crate::path::Path;
use crate::record::DisplayOp;
use crate::resource::{ResourceTable, TextBlob, Vertices};
use crate::storage::OpStorage;

/// Records drawing calls into a [`DisplayList`].
///
/// Calls are made through the [`Dispatcher`] implementation, so a list
/// dispatched into a builder is recorded again. Inputs are canonicalized
/// while recording:
///
/// - a rounded rect with square corners is recorded as a rect, and one
///   whose corners form an ellipse as an oval; paths traced from a rect,
///   oval or rounded rect degrade the same way, for draws and clips alike
/// - identity and non-finite transforms are dropped, and general matrices
///   are recorded as the simplest transform op that represents them
/// - attribute setters that would not change the current attributes
///   record nothing
///
/// A `restore` without a matching `save` is ignored, and
/// [`build`](Self::build) closes any saves still open.
#[derive(Debug)]
pub struct DisplayListBuilder {
    storage: OpStorage,
    resources: ResourceTable,
    op_count: usize,
    save_level: usize,
    cull_rect: Rect,
    attributes: Paint,
}

impl Default for DisplayListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayListBuilder {
    /// A builder with an unbounded cull rect.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cull_rect(Rect::LARGEST)
    }

    /// A builder whose lists bound unbounded drawing by `cull_rect`.
    #[must_use]
    pub fn with_cull_rect(cull_rect: Rect) -> Self {
        Self {
            storage: OpStorage::default(),
            resources: ResourceTable::default(),
            op_count: 0,
            save_level: 0,
            cull_rect: cull_rect.sorted(),
            attributes: Paint::default(),
        }
    }

    /// The cull rect given to built lists.
    #[must_use]
    pub const fn cull_rect(&self) -> &Rect {
        &self.cull_rect
    }

    /// Ops recorded since the last build.
    #[must_use]
    pub const fn op_count(&self) -> usize {
        self.op_count
    }

    /// Number of saves not yet restored.
    #[must_use]
    pub const fn save_level(&self) -> usize {
        self.save_level
    }

    /// Bytes of recorded ops.
    #[must_use]
    pub fn bytes_used(&self) -> usize {
        self.storage.used()
    }

    /// Bytes reserved for recorded ops, always a whole number of pages.
    #[must_use]
    pub const fn bytes_allocated(&self) -> usize {
        self.storage.allocated()
    }

    /// The attributes the next draw call will use.
    #[must_use]
    pub const fn attributes(&self) -> &Paint {
        &self.attributes
    }

    /// Restore until [`save_level`](Self::save_level) is at most `count`.
    pub fn restore_to_count(&mut self, count: usize) {
        while self.save_level > count {
            self.restore();
        }
    }

    /// Concatenate `matrix`, recorded as the simplest equivalent op.
    pub fn transform(&mut self, matrix: &Matrix) {
        self.transform_full_perspective(matrix);
    }

    /// Record the setters needed to make the current attributes equal to
    /// `paint`. Attributes that already match record nothing.
    pub fn set_attributes_from_paint(&mut self, paint: &Paint) {
        self.set_anti_alias(paint.anti_alias);
        self.set_dither(paint.dither);
        self.set_invert_colors(paint.invert_colors);
        self.set_color(paint.color);
        self.set_blend_mode(paint.blend_mode);
        self.set_draw_style(paint.draw_style);
        self.set_stroke_width(paint.stroke_width);
        self.set_stroke_miter(paint.stroke_miter);
        self.set_stroke_cap(paint.stroke_cap);
        self.set_stroke_join(paint.stroke_join);
        self.set_shader(paint.shader.as_ref());
        self.set_color_filter(paint.color_filter.as_ref());
        self.set_image_filter(paint.image_filter.as_ref());
        self.set_path_effect(paint.path_effect.as_ref());
        self.set_mask_filter(paint.mask_filter.as_ref());
    }

    /// Close open saves and seal the recording.
    ///
    /// The builder is left empty, with default attributes and the same
    /// cull rect, ready to record another list.
    pub fn build(&mut self) -> DisplayList {
        while self.save_level > 0 {
            self.restore();
        }
        let storage = mem::take(&mut self.storage);
        let resources = mem::take(&mut self.resources);
        let op_count = mem::take(&mut self.op_count);
        self.attributes = Paint::default();
        DisplayList::new(storage, resources, op_count, self.cull_rect)
    }

    fn push(&mut self, op: &DisplayOp<'_>) {
        let resources = &mut self.resources;
        let _ = self.storage.push(op.kind(), |writer| op.encode(writer, resources));
        self.op_count += 1;
    }
}

/// Record an attribute setter unless the attribute already has the value.
macro_rules! set_attribute {
    ($self:ident, $field:ident, $value:expr, $op:ident) => {
        if $self.attributes.$field != $value {
            $self.attributes.$field = $value;
            $self.push(&DisplayOp::$op($value));
        }
    };
}

/// Record a resource setter unless the attribute already holds an equal
/// resource.
macro_rules! set_resource {
    ($self:ident, $field:ident, $value:expr, $op:ident) => {
        if $self.attributes.$field.as_ref() != $value {
            $self.attributes.$field = $value.cloned();
            $self.push(&DisplayOp::$op($value));
        }
    };
}

impl Dispatcher for DisplayListBuilder {
    fn set_anti_alias(&mut self, anti_alias: bool) {
        set_attribute!(self, anti_alias, anti_alias, SetAntiAlias);
    }

    fn set_dither(&mut self, dither: bool) {
        set_attribute!(self, dither, dither, SetDither);
    }

    fn set_invert_colors(&mut self, invert: bool) {
        set_attribute!(self, invert_colors, invert, SetInvertColors);
    }

    fn set_stroke_cap(&mut self, cap: StrokeCap) {
        set_attribute!(self, stroke_cap, cap, SetStrokeCap);
    }

    fn set_stroke_join(&mut self, join: StrokeJoin) {
        set_attribute!(self, stroke_join, join, SetStrokeJoin);
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        set_attribute!(self, draw_style, style, SetDrawStyle);
    }

    fn set_stroke_width(&mut self, width: f32) {
        set_attribute!(self, stroke_width, width, SetStrokeWidth);
    }

    fn set_stroke_miter(&mut self, limit: f32) {
        set_attribute!(self, stroke_miter, limit, SetStrokeMiter);
    }

    fn set_color(&mut self, color: Color) {
        set_attribute!(self, color, color, SetColor);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        set_attribute!(self, blend_mode, mode, SetBlendMode);
    }

    fn set_shader(&mut self, shader: Option<&Arc<Shader>>) {
        set_resource!(self, shader, shader, SetShader);
    }

    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>) {
        set_resource!(self, color_filter, filter, SetColorFilter);
    }

    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>) {
        set_resource!(self, image_filter, filter, SetImageFilter);
    }

    fn set_path_effect(&mut self, effect: Option<&Arc<PathEffect>>) {
        set_resource!(self, path_effect, effect, SetPathEffect);
    }

    fn set_mask_filter(&mut self, filter: Option<&Arc<MaskFilter>>) {
        set_resource!(self, mask_filter, filter, SetMaskFilter);
    }

    fn save(&mut self) {
        self.save_level += 1;
        self.push(&DisplayOp::Save);
    }

    fn save_layer(
        &mut self,
        bounds: Option<&Rect>,
        with_attributes: bool,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        self.save_level += 1;
        self.push(&DisplayOp::SaveLayer {
            bounds: bounds.map(Rect::sorted),
            with_attributes,
            backdrop,
        });
    }

    fn restore(&mut self) {
        if self.save_level == 0 {
            let _ = warn_once("Builder", "restore() without a matching save() ignored");
            return;
        }
        self.save_level -= 1;
        self.push(&DisplayOp::Restore);
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        if tx.is_finite() && ty.is_finite() && (tx != 0.0 || ty != 0.0) {
            self.push(&DisplayOp::Translate { tx, ty });
        }
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        if sx.is_finite() && sy.is_finite() && (sx != 1.0 || sy != 1.0) {
            self.push(&DisplayOp::Scale { sx, sy });
        }
    }

    fn rotate(&mut self, degrees: f32) {
        if degrees.is_finite() && degrees.rem_euclid(360.0) != 0.0 {
            self.push(&DisplayOp::Rotate { degrees });
        }
    }

    fn skew(&mut self, sx: f32, sy: f32) {
        if sx.is_finite() && sy.is_finite() && (sx != 0.0 || sy != 0.0) {
            self.push(&DisplayOp::Skew { sx, sy });
        }
    }

    fn transform_2d_affine(&mut self, mxx: f32, mxy: f32, mxt: f32, myx: f32, myy: f32, myt: f32) {
        let values = [mxx, mxy, mxt, myx, myy, myt];
        if !values.iter().all(|v| v.is_finite()) {
            return;
        }
        if mxy == 0.0 && myx == 0.0 {
            if mxx == 1.0 && myy == 1.0 {
                self.translate(mxt, myt);
                return;
            }
            if mxt == 0.0 && myt == 0.0 {
                self.scale(mxx, myy);
                return;
            }
        }
        self.push(&DisplayOp::Transform2DAffine(values));
    }

    fn transform_full_perspective(&mut self, matrix: &Matrix) {
        if !matrix.is_finite() {
            return;
        }
        if matrix.is_2d_affine() {
            let [mxx, mxy, mxt, myx, myy, myt] = matrix.to_affine();
            self.transform_2d_affine(mxx, mxy, mxt, myx, myy, myt);
        } else {
            self.push(&DisplayOp::TransformFullPerspective(*matrix));
        }
    }

    fn transform_reset(&mut self) {
        self.push(&DisplayOp::TransformReset);
    }

    fn clip_rect(&mut self, rect: &Rect, op: ClipOp, anti_alias: bool) {
        if rect.is_finite() {
            self.push(&DisplayOp::ClipRect {
                rect: rect.sorted(),
                op,
                anti_alias,
            });
        }
    }

    fn clip_oval(&mut self, bounds: &Rect, op: ClipOp, anti_alias: bool) {
        if bounds.is_finite() {
            self.push(&DisplayOp::ClipOval {
                bounds: bounds.sorted(),
                op,
                anti_alias,
            });
        }
    }

    fn clip_rrect(&mut self, rrect: &RRect, op: ClipOp, anti_alias: bool) {
        if rrect.is_rect() {
            self.clip_rect(rrect.rect(), op, anti_alias);
        } else if rrect.is_oval() {
            self.clip_oval(rrect.rect(), op, anti_alias);
        } else {
            self.push(&DisplayOp::ClipRRect {
                rrect: *rrect,
                op,
                anti_alias,
            });
        }
    }

    fn clip_path(&mut self, path: &Arc<Path>, op: ClipOp, anti_alias: bool) {
        if let Some(rect) = path.as_rect() {
            self.clip_rect(&rect, op, anti_alias);
        } else if let Some(bounds) = path.as_oval() {
            self.clip_oval(&bounds, op, anti_alias);
        } else if let Some(rrect) = path.as_rrect() {
            self.clip_rrect(&rrect, op, anti_alias);
        } else {
            self.push(&DisplayOp::ClipPath {
                path,
                op,
                anti_alias,
            });
        }
    }

    fn draw_paint(&mut self) {
        self.push(&DisplayOp::DrawPaint);
    }

    fn draw_color(&mut self, color: Color, mode: BlendMode) {
        self.push(&DisplayOp::DrawColor { color, mode });
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        self.push(&DisplayOp::DrawLine { p0, p1 });
    }

    fn draw_rect(&mut self, rect: &Rect) {
        self.push(&DisplayOp::DrawRect(rect.sorted()));
    }

    fn draw_oval(&mut self, bounds: &Rect) {
        self.push(&DisplayOp::DrawOval(bounds.sorted()));
    }

    fn draw_circle(&mut self, center: Point, radius: f32) {
        self.push(&DisplayOp::DrawCircle { center, radius });
    }

    fn draw_rrect(&mut self, rrect: &RRect) {
        if rrect.is_rect() {
            self.draw_rect(rrect.rect());
        } else if rrect.is_oval() {
            self.draw_oval(rrect.rect());
        } else {
            self.push(&DisplayOp::DrawRRect(*rrect));
        }
    }

    fn draw_drrect(&mut self, outer: &RRect, inner: &RRect) {
        self.push(&DisplayOp::DrawDRRect {
            outer: *outer,
            inner: *inner,
        });
    }

    fn draw_path(&mut self, path: &Arc<Path>) {
        if let Some(rect) = path.as_rect() {
            self.draw_rect(&rect);
        } else if let Some(bounds) = path.as_oval() {
            self.draw_oval(&bounds);
        } else if let Some(rrect) = path.as_rrect() {
            self.draw_rrect(&rrect);
        } else {
            self.push(&DisplayOp::DrawPath(path));
        }
    }

    fn draw_arc(&mut self, bounds: &Rect, start_degrees: f32, sweep_degrees: f32, use_center: bool) {
        self.push(&DisplayOp::DrawArc {
            bounds: bounds.sorted(),
            start: start_degrees,
            sweep: sweep_degrees,
            use_center,
        });
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        if points.is_empty() {
            return;
        }
        self.push(&DisplayOp::DrawPoints {
            mode,
            points: Cow::Borrowed(points),
        });
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {
        self.push(&DisplayOp::DrawVertices { vertices, mode });
    }

    fn draw_image(
        &mut self,
        image: &Arc<Image>,
        top_left: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.push(&DisplayOp::DrawImage {
            image,
            top_left,
            sampling,
            with_attributes,
        });
    }

    fn draw_image_rect(
        &mut self,
        image: &Arc<Image>,
        src: &Rect,
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
        constraint: SrcRectConstraint,
    ) {
        self.push(&DisplayOp::DrawImageRect {
            image,
            src: src.sorted(),
            dst: dst.sorted(),
            sampling,
            with_attributes,
            constraint,
        });
    }

    fn draw_image_nine(
        &mut self,
        image: &Arc<Image>,
        center: &IRect,
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.push(&DisplayOp::DrawImageNine {
            image,
            center: *center,
            dst: dst.sorted(),
            sampling,
            with_attributes,
        });
    }

    fn draw_image_lattice(
        &mut self,
        image: &Arc<Image>,
        x_divs: &[i32],
        y_divs: &[i32],
        src: &IRect,
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.push(&DisplayOp::DrawImageLattice {
            image,
            x_divs: Cow::Borrowed(x_divs),
            y_divs: Cow::Borrowed(y_divs),
            src: *src,
            dst: dst.sorted(),
            sampling,
            with_attributes,
        });
    }

    /// Sprites without a texture rect are dropped, and `colors` is ignored
    /// unless it has an entry for every sprite.
    fn draw_atlas(
        &mut self,
        atlas: &Arc<Image>,
        transforms: &[RSTransform],
        texture: &[Rect],
        colors: &[Color],
        mode: BlendMode,
        sampling: ImageSampling,
        cull: Option<&Rect>,
        with_attributes: bool,
    ) {
        let count = transforms.len().min(texture.len());
        if count == 0 {
            return;
        }
        let colors = colors.get(..count).unwrap_or_default();
        self.push(&DisplayOp::DrawAtlas {
            atlas,
            transforms: Cow::Borrowed(&transforms[..count]),
            texture: Cow::Borrowed(&texture[..count]),
            colors: Cow::Borrowed(colors),
            mode,
            sampling,
            cull: cull.map(Rect::sorted),
            with_attributes,
        });
    }

    fn draw_picture(
        &mut self,
        picture: &Arc<DisplayList>,
        matrix: Option<&Matrix>,
        with_attributes: bool,
    ) {
        self.push(&DisplayOp::DrawPicture {
            picture,
            matrix: matrix.filter(|m| !m.is_identity()).copied(),
            with_attributes,
        });
    }

    fn draw_display_list(&mut self, list: &Arc<DisplayList>) {
        self.push(&DisplayOp::DrawDisplayList(list));
    }

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f32, y: f32) {
        self.push(&DisplayOp::DrawTextBlob { blob, x, y });
    }

    fn draw_shadow(
        &mut self,
        path: &Arc<Path>,
        color: Color,
        elevation: f32,
        transparent_occluder: bool,
        device_pixel_ratio: f32,
    ) {
        self.push(&DisplayOp::DrawShadow {
            path,
            color,
            elevation,
            transparent_occluder,
            device_pixel_ratio,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::OpKind;
    use crate::storage::PAGE_SIZE;

    fn kinds(list: &DisplayList) -> Vec<OpKind> {
        list.kinds().collect()
    }

    #[test]
    fn test_rrect_degrades_to_rect_and_oval() {
        let rect = Rect::from_ltrb(0.0, 0.0, 10.0, 20.0);
        let mut builder = DisplayListBuilder::new();
        builder.draw_rrect(&RRect::from_rect(rect));
        builder.draw_rrect(&RRect::oval(rect));
        builder.draw_rrect(&RRect::from_rect_xy(rect, 2.0, 2.0));
        builder.clip_rrect(&RRect::from_rect(rect), ClipOp::Difference, false);
        let list = builder.build();
        assert_eq!(
            kinds(&list),
            vec![
                OpKind::DrawRect,
                OpKind::DrawOval,
                OpKind::DrawRRect,
                OpKind::ClipDifferenceRect
            ]
        );
    }

    #[test]
    fn test_shaped_paths_degrade() {
        let rect = Rect::from_ltrb(1.0, 2.0, 30.0, 40.0);
        let mut builder = DisplayListBuilder::new();
        builder.clip_path(&Arc::new(Path::from_rect(&rect)), ClipOp::Intersect, true);
        builder.clip_path(&Arc::new(Path::from_oval(&rect)), ClipOp::Intersect, true);
        builder.draw_path(&Arc::new(Path::from_rrect(&RRect::from_rect_xy(rect, 3.0, 3.0))));
        let mut open = Path::new();
        let _ = open.move_to(Point::ZERO).line_to(Point::new(5.0, 5.0));
        builder.draw_path(&Arc::new(open));
        let list = builder.build();
        assert_eq!(
            kinds(&list),
            vec![
                OpKind::ClipIntersectRect,
                OpKind::ClipIntersectOval,
                OpKind::DrawRRect,
                OpKind::DrawPath
            ]
        );
    }

    #[test]
    fn test_identity_transforms_are_dropped() {
        let mut builder = DisplayListBuilder::new();
        builder.translate(0.0, 0.0);
        builder.scale(1.0, 1.0);
        builder.rotate(720.0);
        builder.skew(0.0, 0.0);
        builder.transform(&Matrix::IDENTITY);
        builder.translate(f32::NAN, 1.0);
        assert_eq!(builder.op_count(), 0);

        builder.transform_2d_affine(1.0, 0.0, 5.0, 0.0, 1.0, 6.0);
        builder.transform(&Matrix::scale(2.0, 3.0));
        builder.transform(&Matrix::rotate(30.0));
        let mut perspective = *Matrix::IDENTITY.values();
        perspective[12] = 0.001;
        builder.transform(&Matrix::from_row_major(perspective));
        let list = builder.build();
        assert_eq!(
            kinds(&list),
            vec![
                OpKind::Translate,
                OpKind::Scale,
                OpKind::Transform2DAffine,
                OpKind::TransformFullPerspective
            ]
        );
    }

    #[test]
    fn test_redundant_attributes_are_elided() {
        let mut builder = DisplayListBuilder::new();
        builder.set_color(Color::BLACK);
        builder.set_blend_mode(BlendMode::SrcOver);
        builder.set_shader(None);
        assert_eq!(builder.op_count(), 0);

        let shader = Arc::new(Shader::Color(Color::RED));
        builder.set_color(Color::RED);
        builder.set_color(Color::RED);
        builder.set_shader(Some(&shader));
        builder.set_shader(Some(&Arc::new(Shader::Color(Color::RED))));
        assert_eq!(builder.op_count(), 2);

        let paint = Paint {
            color: Color::RED,
            stroke_width: 3.0,
            ..Paint::default()
        };
        builder.set_attributes_from_paint(&paint);
        // Width changes and the shader is cleared.
        assert_eq!(builder.op_count(), 4);
        assert_eq!(builder.attributes(), &paint);
    }

    #[test]
    fn test_over_restore_is_ignored() {
        let mut builder = DisplayListBuilder::new();
        builder.restore();
        builder.save();
        builder.restore();
        builder.restore();
        assert_eq!(builder.op_count(), 2);
        assert_eq!(builder.save_level(), 0);
    }

    #[test]
    fn test_build_closes_saves_and_resets() {
        let mut builder = DisplayListBuilder::with_cull_rect(Rect::from_ltrb(0.0, 0.0, 10.0, 10.0));
        builder.save();
        builder.save_layer(None, true, None);
        builder.set_color(Color::GREEN);
        builder.draw_paint();
        let list = builder.build();
        assert_eq!(list.op_count(), 6);
        assert_eq!(
            kinds(&list)[4..],
            [OpKind::Restore, OpKind::Restore]
        );
        assert_eq!(builder.op_count(), 0);
        assert_eq!(builder.save_level(), 0);
        assert_eq!(builder.bytes_used(), 0);
        assert_eq!(builder.attributes(), &Paint::default());
        assert_eq!(*builder.cull_rect(), Rect::from_ltrb(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_restore_to_count() {
        let mut builder = DisplayListBuilder::new();
        builder.save();
        builder.save();
        builder.save();
        builder.restore_to_count(1);
        assert_eq!(builder.save_level(), 1);
        builder.restore_to_count(5);
        assert_eq!(builder.save_level(), 1);
    }

    #[test]
    fn test_arena_grows_by_pages() {
        let mut builder = DisplayListBuilder::new();
        builder.draw_paint();
        assert_eq!(builder.bytes_allocated(), PAGE_SIZE);
        let points = vec![Point::new(1.0, 1.0); 1000];
        builder.draw_points(PointMode::Points, &points);
        assert_eq!(builder.bytes_allocated() % PAGE_SIZE, 0);
        assert!(builder.bytes_allocated() >= builder.bytes_used());
        assert!(builder.bytes_used() > PAGE_SIZE);
    }

    #[test]
    fn test_atlas_counts_are_normalized() {
        let atlas = Arc::new(Image::solid(8, 8, [0, 0, 0, 255]).unwrap());
        let transforms = [RSTransform::new(1.0, 0.0, 0.0, 0.0); 3];
        let texture = [Rect::from_ltrb(0.0, 0.0, 4.0, 4.0); 2];
        let mut builder = DisplayListBuilder::new();
        builder.draw_atlas(
            &atlas,
            &transforms,
            &texture,
            &[Color::RED],
            BlendMode::Modulate,
            ImageSampling::Nearest,
            None,
            false,
        );
        builder.draw_atlas(
            &atlas,
            &transforms,
            &[],
            &[],
            BlendMode::Modulate,
            ImageSampling::Nearest,
            None,
            false,
        );
        assert_eq!(builder.op_count(), 1);
    }
}
