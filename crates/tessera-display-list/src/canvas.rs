//! Rendering backends and the adapter that replays display lists onto them.
//!
//! A [`Canvas`] takes paint objects with every draw, the way immediate-mode
//! 2D APIs do. [`CanvasDispatcher`] turns the attribute-setting calls of a
//! display list back into a [`Paint`] and lowers the logical operations a
//! canvas does not have (lines, circles, nine-patches, nested lists) onto
//! the ones it does.

use std::sync::Arc;

use tessera_common::Image;

use crate::color::{BlendMode, Color};
use crate::dispatcher::Dispatcher;
use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ImageFilter, MaskFilter, PathEffect, Shader};
use crate::geometry::{IRect, Matrix, Point, RRect, RSTransform, Rect};
use crate::paint::{
    ClipOp, DrawStyle, ImageSampling, Paint, PointMode, SrcRectConstraint, StrokeCap, StrokeJoin,
};
use crate::path::Path;
use crate::resource::{TextBlob, Vertices};

/// An immediate-mode drawing surface.
///
/// Implementations keep a stack of matrix and clip state, pushed by
/// `save`/`save_layer` and popped by `restore`. Matrices passed to
/// [`Canvas::concat`] apply to geometry before the current matrix.
pub trait Canvas {
    /// Push the matrix and clip.
    fn save(&mut self);
    /// Push the matrix and clip and draw into a new layer until the
    /// matching restore. The layer is composited with `paint`'s alpha,
    /// blend mode and filters, or plainly when `paint` is `None`.
    fn save_layer(
        &mut self,
        bounds: Option<&Rect>,
        paint: Option<&Paint>,
        backdrop: Option<&ImageFilter>,
    );
    /// Pop the matrix and clip, compositing any layer.
    fn restore(&mut self);

    /// Pre-concatenate `matrix` to the current matrix.
    fn concat(&mut self, matrix: &Matrix);
    /// Replace the current matrix with the identity.
    fn reset_matrix(&mut self);

    /// Combine the clip with a rect.
    fn clip_rect(&mut self, rect: &Rect, op: ClipOp, anti_alias: bool);
    /// Combine the clip with a rounded rect.
    fn clip_rrect(&mut self, rrect: &RRect, op: ClipOp, anti_alias: bool);
    /// Combine the clip with a path.
    fn clip_path(&mut self, path: &Path, op: ClipOp, anti_alias: bool);

    /// Fill the clip.
    fn draw_paint(&mut self, paint: &Paint);
    /// Draw a rect.
    fn draw_rect(&mut self, rect: &Rect, paint: &Paint);
    /// Draw an oval.
    fn draw_oval(&mut self, bounds: &Rect, paint: &Paint);
    /// Draw a rounded rect.
    fn draw_rrect(&mut self, rrect: &RRect, paint: &Paint);
    /// Draw the area between two rounded rects.
    fn draw_drrect(&mut self, outer: &RRect, inner: &RRect, paint: &Paint);
    /// Draw a path.
    fn draw_path(&mut self, path: &Path, paint: &Paint);
    /// Draw an arc.
    fn draw_arc(
        &mut self,
        bounds: &Rect,
        start_degrees: f32,
        sweep_degrees: f32,
        use_center: bool,
        paint: &Paint,
    );
    /// Draw points, segments or a polyline. Always stroked.
    fn draw_points(&mut self, mode: PointMode, points: &[Point], paint: &Paint);
    /// Draw a triangle mesh.
    fn draw_vertices(&mut self, vertices: &Vertices, mode: BlendMode, paint: &Paint);
    /// Draw the `src` part of an image into `dst`.
    fn draw_image_rect(
        &mut self,
        image: &Image,
        src: &Rect,
        dst: &Rect,
        sampling: ImageSampling,
        paint: Option<&Paint>,
        constraint: SrcRectConstraint,
    );
    /// Draw atlas sprites.
    fn draw_atlas(
        &mut self,
        atlas: &Image,
        transforms: &[RSTransform],
        texture: &[Rect],
        colors: &[Color],
        mode: BlendMode,
        sampling: ImageSampling,
        cull: Option<&Rect>,
        paint: Option<&Paint>,
    );
    /// Draw text with its origin at `(x, y)`.
    fn draw_text_blob(&mut self, blob: &TextBlob, x: f32, y: f32, paint: &Paint);
    /// Draw an elevation shadow.
    fn draw_shadow(
        &mut self,
        path: &Path,
        color: Color,
        elevation: f32,
        transparent_occluder: bool,
        device_pixel_ratio: f32,
    );
}

/// A [`Dispatcher`] that replays onto a [`Canvas`].
pub struct CanvasDispatcher<'a> {
    canvas: &'a mut dyn Canvas,
    paint: Paint,
}

impl<'a> CanvasDispatcher<'a> {
    /// Adapter starting from default attributes.
    pub fn new(canvas: &'a mut dyn Canvas) -> Self {
        Self {
            canvas,
            paint: Paint::default(),
        }
    }

    /// The attributes accumulated so far.
    #[must_use]
    pub const fn paint(&self) -> &Paint {
        &self.paint
    }

    /// The parts of the current attributes that apply when compositing a
    /// layer or image.
    fn layer_paint(&self) -> Paint {
        Paint {
            color: Color::BLACK.with_alpha(self.paint.color.a),
            blend_mode: self.paint.blend_mode,
            color_filter: self.paint.color_filter.clone(),
            image_filter: self.paint.image_filter.clone(),
            ..Paint::default()
        }
    }

    fn image_paint(&self, with_attributes: bool) -> Option<Paint> {
        with_attributes.then(|| Paint {
            anti_alias: self.paint.anti_alias,
            ..self.layer_paint()
        })
    }

    /// Draw `image` split into a grid of cells, fixed-size and stretched
    /// alternately along each axis.
    fn draw_lattice_cells(
        &mut self,
        image: &Image,
        x_edges: &[f32],
        y_edges: &[f32],
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        let paint = self.image_paint(with_attributes);
        let columns = lattice_axis(x_edges, dst.left, dst.right);
        let rows = lattice_axis(y_edges, dst.top, dst.bottom);
        for row in &rows {
            for column in &columns {
                let src = Rect::from_ltrb(column.src.0, row.src.0, column.src.1, row.src.1);
                let cell = Rect::from_ltrb(column.dst.0, row.dst.0, column.dst.1, row.dst.1);
                if src.is_empty() || cell.is_empty() {
                    continue;
                }
                self.canvas.draw_image_rect(
                    image,
                    &src,
                    &cell,
                    sampling,
                    paint.as_ref(),
                    SrcRectConstraint::Strict,
                );
            }
        }
    }
}

/// One lattice segment: source span and destination span along an axis.
struct LatticeSpan {
    src: (f32, f32),
    dst: (f32, f32),
}

/// Place the segments between consecutive `edges` along
/// `dst_start..dst_end`. Even segments keep their source size and odd ones
/// share the remaining space; fixed segments shrink when they do not fit.
fn lattice_axis(edges: &[f32], dst_start: f32, dst_end: f32) -> Vec<LatticeSpan> {
    let length = |w: &[f32]| (w[1] - w[0]).max(0.0);
    let fixed: f32 = edges.windows(2).step_by(2).map(length).sum();
    let stretch: f32 = edges.windows(2).skip(1).step_by(2).map(length).sum();
    let available = (dst_end - dst_start).max(0.0);

    let (fixed_scale, stretch_scale) = if fixed >= available || stretch <= 0.0 {
        (if fixed > 0.0 { available / fixed } else { 0.0 }, 0.0)
    } else {
        (1.0, (available - fixed) / stretch)
    };

    let mut position = dst_start;
    edges
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let scale = if i % 2 == 0 { fixed_scale } else { stretch_scale };
            let start = position;
            position += length(w) * scale;
            LatticeSpan {
                src: (w[0], w[1]),
                dst: (start, position),
            }
        })
        .collect()
}

/// Segment edges along one axis: the source extent with the dividers
/// strictly inside it.
#[allow(clippy::cast_precision_loss)]
fn lattice_edges(start: i32, end: i32, divs: &[i32]) -> Vec<f32> {
    let mut edges = vec![start as f32];
    let mut inner: Vec<i32> = divs.iter().copied().filter(|d| *d > start && *d < end).collect();
    inner.sort_unstable();
    inner.dedup();
    edges.extend(inner.into_iter().map(|d| d as f32));
    edges.push(end as f32);
    edges
}

impl Dispatcher for CanvasDispatcher<'_> {
    fn set_anti_alias(&mut self, anti_alias: bool) {
        self.paint.anti_alias = anti_alias;
    }

    fn set_dither(&mut self, dither: bool) {
        self.paint.dither = dither;
    }

    fn set_invert_colors(&mut self, invert: bool) {
        self.paint.invert_colors = invert;
    }

    fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.paint.stroke_cap = cap;
    }

    fn set_stroke_join(&mut self, join: StrokeJoin) {
        self.paint.stroke_join = join;
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        self.paint.draw_style = style;
    }

    fn set_stroke_width(&mut self, width: f32) {
        self.paint.stroke_width = width;
    }

    fn set_stroke_miter(&mut self, limit: f32) {
        self.paint.stroke_miter = limit;
    }

    fn set_color(&mut self, color: Color) {
        self.paint.color = color;
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.paint.blend_mode = mode;
    }

    fn set_shader(&mut self, shader: Option<&Arc<Shader>>) {
        self.paint.shader = shader.cloned();
    }

    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>) {
        self.paint.color_filter = filter.cloned();
    }

    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>) {
        self.paint.image_filter = filter.cloned();
    }

    fn set_path_effect(&mut self, effect: Option<&Arc<PathEffect>>) {
        self.paint.path_effect = effect.cloned();
    }

    fn set_mask_filter(&mut self, filter: Option<&Arc<MaskFilter>>) {
        self.paint.mask_filter = filter.cloned();
    }

    fn save(&mut self) {
        self.canvas.save();
    }

    fn save_layer(
        &mut self,
        bounds: Option<&Rect>,
        with_attributes: bool,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        let paint = with_attributes.then(|| self.layer_paint());
        self.canvas
            .save_layer(bounds, paint.as_ref(), backdrop.map(|filter| &**filter));
    }

    fn restore(&mut self) {
        self.canvas.restore();
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.canvas.concat(&Matrix::translate(tx, ty));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.canvas.concat(&Matrix::scale(sx, sy));
    }

    fn rotate(&mut self, degrees: f32) {
        self.canvas.concat(&Matrix::rotate(degrees));
    }

    fn skew(&mut self, sx: f32, sy: f32) {
        self.canvas.concat(&Matrix::skew(sx, sy));
    }

    fn transform_2d_affine(&mut self, mxx: f32, mxy: f32, mxt: f32, myx: f32, myy: f32, myt: f32) {
        self.canvas
            .concat(&Matrix::affine(mxx, mxy, mxt, myx, myy, myt));
    }

    fn transform_full_perspective(&mut self, matrix: &Matrix) {
        self.canvas.concat(matrix);
    }

    fn transform_reset(&mut self) {
        self.canvas.reset_matrix();
    }

    fn clip_rect(&mut self, rect: &Rect, op: ClipOp, anti_alias: bool) {
        self.canvas.clip_rect(rect, op, anti_alias);
    }

    fn clip_oval(&mut self, bounds: &Rect, op: ClipOp, anti_alias: bool) {
        self.canvas.clip_rrect(&RRect::oval(*bounds), op, anti_alias);
    }

    fn clip_rrect(&mut self, rrect: &RRect, op: ClipOp, anti_alias: bool) {
        self.canvas.clip_rrect(rrect, op, anti_alias);
    }

    fn clip_path(&mut self, path: &Arc<Path>, op: ClipOp, anti_alias: bool) {
        self.canvas.clip_path(path, op, anti_alias);
    }

    fn draw_paint(&mut self) {
        self.canvas.draw_paint(&self.paint);
    }

    fn draw_color(&mut self, color: Color, mode: BlendMode) {
        let paint = Paint {
            color,
            blend_mode: mode,
            ..Paint::default()
        };
        self.canvas.draw_paint(&paint);
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        self.canvas.draw_points(PointMode::Lines, &[p0, p1], &self.paint);
    }

    fn draw_rect(&mut self, rect: &Rect) {
        self.canvas.draw_rect(rect, &self.paint);
    }

    fn draw_oval(&mut self, bounds: &Rect) {
        self.canvas.draw_oval(bounds, &self.paint);
    }

    fn draw_circle(&mut self, center: Point, radius: f32) {
        self.canvas
            .draw_oval(&Rect::from_circle(center, radius), &self.paint);
    }

    fn draw_rrect(&mut self, rrect: &RRect) {
        self.canvas.draw_rrect(rrect, &self.paint);
    }

    fn draw_drrect(&mut self, outer: &RRect, inner: &RRect) {
        self.canvas.draw_drrect(outer, inner, &self.paint);
    }

    fn draw_path(&mut self, path: &Arc<Path>) {
        self.canvas.draw_path(path, &self.paint);
    }

    fn draw_arc(&mut self, bounds: &Rect, start_degrees: f32, sweep_degrees: f32, use_center: bool) {
        self.canvas
            .draw_arc(bounds, start_degrees, sweep_degrees, use_center, &self.paint);
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        self.canvas.draw_points(mode, points, &self.paint);
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {
        self.canvas.draw_vertices(vertices, mode, &self.paint);
    }

    fn draw_image(
        &mut self,
        image: &Arc<Image>,
        top_left: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        let (width, height) = image.dimensions_f32();
        let paint = self.image_paint(with_attributes);
        self.canvas.draw_image_rect(
            image,
            &Rect::from_ltrb(0.0, 0.0, width, height),
            &Rect::from_xywh(top_left.x, top_left.y, width, height),
            sampling,
            paint.as_ref(),
            SrcRectConstraint::Fast,
        );
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
        let paint = self.image_paint(with_attributes);
        self.canvas
            .draw_image_rect(image, src, dst, sampling, paint.as_ref(), constraint);
    }

    fn draw_image_nine(
        &mut self,
        image: &Arc<Image>,
        center: &IRect,
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        let width = i32::try_from(image.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(image.height()).unwrap_or(i32::MAX);
        let x_edges = lattice_edges(0, width, &[center.left, center.right]);
        let y_edges = lattice_edges(0, height, &[center.top, center.bottom]);
        self.draw_lattice_cells(image, &x_edges, &y_edges, dst, sampling, with_attributes);
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
        let x_edges = lattice_edges(src.left, src.right, x_divs);
        let y_edges = lattice_edges(src.top, src.bottom, y_divs);
        self.draw_lattice_cells(image, &x_edges, &y_edges, dst, sampling, with_attributes);
    }

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
        let paint = self.image_paint(with_attributes);
        self.canvas.draw_atlas(
            atlas,
            transforms,
            texture,
            colors,
            mode,
            sampling,
            cull,
            paint.as_ref(),
        );
    }

    fn draw_picture(
        &mut self,
        picture: &Arc<DisplayList>,
        matrix: Option<&Matrix>,
        with_attributes: bool,
    ) {
        if with_attributes {
            let paint = self.layer_paint();
            let bounds = picture.bounds();
            let layer_bounds = matrix.map_or(Some(bounds), |m| m.map_rect(&bounds));
            self.canvas
                .save_layer(layer_bounds.as_ref(), Some(&paint), None);
        } else {
            self.canvas.save();
        }
        if let Some(matrix) = matrix {
            self.canvas.concat(matrix);
        }
        picture.render_to(&mut *self.canvas);
        self.canvas.restore();
    }

    fn draw_display_list(&mut self, list: &Arc<DisplayList>) {
        self.canvas.save();
        list.render_to(&mut *self.canvas);
        self.canvas.restore();
    }

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f32, y: f32) {
        self.canvas.draw_text_blob(blob, x, y, &self.paint);
    }

    fn draw_shadow(
        &mut self,
        path: &Arc<Path>,
        color: Color,
        elevation: f32,
        transparent_occluder: bool,
        device_pixel_ratio: f32,
    ) {
        self.canvas
            .draw_shadow(path, color, elevation, transparent_occluder, device_pixel_ratio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_axis_fixed_and_stretched() {
        let spans = lattice_axis(&[0.0, 2.0, 8.0, 10.0], 0.0, 20.0);
        let dst: Vec<(f32, f32)> = spans.iter().map(|s| s.dst).collect();
        assert_eq!(dst, vec![(0.0, 2.0), (2.0, 18.0), (18.0, 20.0)]);
    }

    #[test]
    fn test_lattice_axis_shrinks_fixed_segments() {
        let spans = lattice_axis(&[0.0, 4.0, 6.0, 10.0], 0.0, 4.0);
        let dst: Vec<(f32, f32)> = spans.iter().map(|s| s.dst).collect();
        assert_eq!(dst, vec![(0.0, 2.0), (2.0, 2.0), (2.0, 4.0)]);
    }

    #[test]
    fn test_lattice_edges_filters_and_sorts() {
        assert_eq!(lattice_edges(0, 10, &[7, 3, 3, 12, 0]), vec![0.0, 3.0, 7.0, 10.0]);
    }
}
