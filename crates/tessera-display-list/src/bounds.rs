//! Conservative bounds of a display list.
//!
//! [`BoundsAccumulator`] replays a list while tracking the matrix, a
//! bounding rect of the clip and the paint attributes, and unions the
//! device-space footprint of every draw. Each footprint is an
//! overestimate: stroke and mask-blur spread are added in local space,
//! image filters are applied in layer space, and anything whose footprint
//! cannot be bounded by its geometry is bounded by the clip instead, which
//! starts as the cull rect.

use std::f32::consts::SQRT_2;
use std::mem;
use std::sync::Arc;

use tessera_common::Image;

use crate::color::{BlendMode, Color};
use crate::dispatcher::Dispatcher;
use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ImageFilter, MaskFilter, PathEffect, ShadowGeometry, Shader};
use crate::geometry::{IRect, Matrix, Point, RRect, RSTransform, Rect};
use crate::paint::{
    ClipOp, DrawStyle, ImageSampling, Paint, PointMode, SrcRectConstraint, StrokeCap, StrokeJoin,
};
use crate::path::Path;
use crate::resource::{TextBlob, Vertices};

/// Device-space spread of hairlines and anti-aliased edges.
const HAIRLINE_SPREAD: f32 = 1.0;

/// How the current attributes apply to a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    /// Geometry honoring the draw style, with closed contours.
    Shape,
    /// Geometry honoring the draw style, possibly with open contours.
    OpenShape,
    /// Always stroked (points, lines and polylines).
    Stroke,
    /// Filled regardless of the draw style (text, meshes).
    Fill,
    /// Images drawn with attributes: filters apply, stroking does not.
    Image,
    /// Drawn without attributes.
    Plain,
}

/// State pushed by a layer.
#[derive(Debug)]
struct Layer {
    outer_bounds: Rect,
    matrix: Matrix,
    filter: Option<Arc<ImageFilter>>,
    unbounded: bool,
}

#[derive(Debug)]
struct SavedState {
    matrix: Matrix,
    clip: Option<Rect>,
    layer: Option<Layer>,
}

/// A [`Dispatcher`] that computes conservative device-space bounds.
#[derive(Debug)]
pub(crate) struct BoundsAccumulator {
    cull: Rect,
    paint: Paint,
    matrix: Matrix,
    /// Bounding rect of the clip; `None` once the clip is empty.
    clip: Option<Rect>,
    stack: Vec<SavedState>,
    bounds: Rect,
}

impl BoundsAccumulator {
    fn new(cull: Rect) -> Self {
        Self {
            cull,
            paint: Paint::default(),
            matrix: Matrix::IDENTITY,
            clip: Some(Rect::LARGEST),
            stack: Vec::new(),
            bounds: Rect::EMPTY,
        }
    }

    /// Bounds of everything `list` draws, with unbounded drawing limited
    /// to `cull`.
    pub(crate) fn measure(list: &DisplayList, cull: &Rect) -> Rect {
        let mut accumulator = Self::new(*cull);
        list.dispatch(&mut accumulator);
        while !accumulator.stack.is_empty() {
            accumulator.restore();
        }
        accumulator.bounds
    }

    /// True if the current attributes can change pixels outside the
    /// geometry being drawn.
    fn paint_is_unbounded(&self) -> bool {
        self.paint.blend_mode.is_unbounded()
            || self
                .paint
                .color_filter
                .as_ref()
                .is_some_and(|filter| filter.modifies_transparent_black())
    }

    fn add_device(&mut self, rect: &Rect) {
        if let Some(visible) = self.clip.and_then(|clip| clip.intersect(rect)) {
            self.bounds = self.bounds.union(&visible);
        }
    }

    fn add_unbounded(&mut self) {
        if let Some(clip) = self.clip.and_then(|clip| clip.intersect(&self.cull)) {
            self.bounds = self.bounds.union(&clip);
        }
    }

    /// Add `rect` drawn in local coordinates with `coverage`.
    fn add_local(&mut self, rect: &Rect, coverage: Coverage) {
        let with_paint = coverage != Coverage::Plain;
        if with_paint && self.paint_is_unbounded() {
            self.add_unbounded();
            return;
        }

        let (spread, hairline) = match coverage {
            Coverage::Shape | Coverage::OpenShape => {
                let hairline = self.paint.is_stroked() && self.paint.stroke_width <= 0.0;
                (
                    self.paint.stroke_outset(coverage == Coverage::OpenShape),
                    hairline,
                )
            }
            Coverage::Stroke => {
                let half = self.paint.stroke_width.max(0.0) * 0.5;
                let reach = if self.paint.stroke_join == StrokeJoin::Miter {
                    self.paint.stroke_miter.max(SQRT_2)
                } else {
                    SQRT_2
                };
                (half * reach, self.paint.stroke_width <= 0.0)
            }
            Coverage::Fill | Coverage::Image | Coverage::Plain => (0.0, false),
        };
        let mask = if with_paint {
            self.paint.mask_filter.as_ref().map_or(0.0, |m| m.outset())
        } else {
            0.0
        };
        let spread = spread + mask;
        let local = rect.outset(spread, spread);

        let filtered = if with_paint {
            match &self.paint.image_filter {
                Some(filter) => filter.map_local_bounds(&local),
                None => Some(local),
            }
        } else {
            Some(local)
        };
        let Some(device) = filtered.and_then(|local| self.matrix.map_rect(&local)) else {
            self.add_unbounded();
            return;
        };
        let device = if hairline || self.paint.anti_alias {
            device.outset(HAIRLINE_SPREAD, HAIRLINE_SPREAD)
        } else {
            device
        };
        self.add_device(&device);
    }

    fn add_local_with(&mut self, rect: &Rect, with_attributes: bool) {
        let coverage = if with_attributes {
            Coverage::Image
        } else {
            Coverage::Plain
        };
        self.add_local(rect, coverage);
    }

    fn intersect_clip(&mut self, local: &Rect, op: ClipOp) {
        if op == ClipOp::Difference {
            return;
        }
        if let Some(device) = self.matrix.map_rect(local) {
            self.clip = self.clip.and_then(|clip| clip.intersect(&device));
        }
    }
}

/// Device-space area touched by `filter` applied to `content`, which was
/// drawn into a layer under `matrix`. `None` means unbounded.
fn filter_layer_content(filter: &ImageFilter, content: &Rect, matrix: &Matrix) -> Option<Rect> {
    let inverse = matrix.invert_affine()?;
    let local = if content.is_empty() {
        *content
    } else {
        inverse.map_rect(content)?
    };
    let mapped = filter.map_local_bounds(&local)?;
    if content.is_empty() {
        return Some(Rect::EMPTY);
    }
    matrix.map_rect(&mapped)
}

impl Dispatcher for BoundsAccumulator {
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
        self.stack.push(SavedState {
            matrix: self.matrix,
            clip: self.clip,
            layer: None,
        });
    }

    fn save_layer(
        &mut self,
        bounds: Option<&Rect>,
        with_attributes: bool,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        let layer_bounds = bounds.and_then(|b| self.matrix.map_rect(b));
        let layer = Layer {
            outer_bounds: mem::replace(&mut self.bounds, Rect::EMPTY),
            matrix: self.matrix,
            filter: if with_attributes {
                self.paint.image_filter.clone()
            } else {
                None
            },
            unbounded: with_attributes && self.paint_is_unbounded(),
        };
        self.stack.push(SavedState {
            matrix: self.matrix,
            clip: self.clip,
            layer: Some(layer),
        });
        if let Some(rect) = layer_bounds {
            self.clip = self.clip.and_then(|clip| clip.intersect(&rect));
        }
        if backdrop.is_some() {
            // The layer starts as the filtered backdrop under its clip.
            self.add_unbounded();
        }
    }

    fn restore(&mut self) {
        let Some(saved) = self.stack.pop() else {
            return;
        };
        let layer_clip = self.clip;
        self.matrix = saved.matrix;
        self.clip = saved.clip;
        let Some(layer) = saved.layer else {
            return;
        };

        let content = mem::replace(&mut self.bounds, layer.outer_bounds);
        if layer.unbounded {
            if let Some(clip) = layer_clip.and_then(|clip| clip.intersect(&self.cull)) {
                self.add_device(&clip);
            }
            return;
        }
        let filtered = match &layer.filter {
            Some(filter) => filter_layer_content(filter, &content, &layer.matrix),
            None => Some(content),
        };
        match filtered {
            Some(rect) => self.add_device(&rect),
            None => self.add_unbounded(),
        }
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.matrix = self.matrix.concat(&Matrix::translate(tx, ty));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.matrix = self.matrix.concat(&Matrix::scale(sx, sy));
    }

    fn rotate(&mut self, degrees: f32) {
        self.matrix = self.matrix.concat(&Matrix::rotate(degrees));
    }

    fn skew(&mut self, sx: f32, sy: f32) {
        self.matrix = self.matrix.concat(&Matrix::skew(sx, sy));
    }

    fn transform_2d_affine(&mut self, mxx: f32, mxy: f32, mxt: f32, myx: f32, myy: f32, myt: f32) {
        self.matrix = self
            .matrix
            .concat(&Matrix::affine(mxx, mxy, mxt, myx, myy, myt));
    }

    fn transform_full_perspective(&mut self, matrix: &Matrix) {
        self.matrix = self.matrix.concat(matrix);
    }

    fn transform_reset(&mut self) {
        self.matrix = Matrix::IDENTITY;
    }

    fn clip_rect(&mut self, rect: &Rect, op: ClipOp, _anti_alias: bool) {
        self.intersect_clip(rect, op);
    }

    fn clip_oval(&mut self, bounds: &Rect, op: ClipOp, _anti_alias: bool) {
        self.intersect_clip(bounds, op);
    }

    fn clip_rrect(&mut self, rrect: &RRect, op: ClipOp, _anti_alias: bool) {
        self.intersect_clip(rrect.rect(), op);
    }

    fn clip_path(&mut self, path: &Arc<Path>, op: ClipOp, _anti_alias: bool) {
        self.intersect_clip(&path.bounds(), op);
    }

    fn draw_paint(&mut self) {
        self.add_unbounded();
    }

    fn draw_color(&mut self, _color: Color, _mode: BlendMode) {
        self.add_unbounded();
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        if let Some(rect) = Rect::bounding(&[p0, p1]) {
            self.add_local(&rect, Coverage::Stroke);
        }
    }

    fn draw_rect(&mut self, rect: &Rect) {
        self.add_local(rect, Coverage::Shape);
    }

    fn draw_oval(&mut self, bounds: &Rect) {
        self.add_local(bounds, Coverage::Shape);
    }

    fn draw_circle(&mut self, center: Point, radius: f32) {
        self.add_local(&Rect::from_circle(center, radius), Coverage::Shape);
    }

    fn draw_rrect(&mut self, rrect: &RRect) {
        self.add_local(rrect.rect(), Coverage::Shape);
    }

    fn draw_drrect(&mut self, outer: &RRect, _inner: &RRect) {
        self.add_local(outer.rect(), Coverage::Shape);
    }

    fn draw_path(&mut self, path: &Arc<Path>) {
        self.add_local(&path.bounds(), Coverage::OpenShape);
    }

    fn draw_arc(&mut self, bounds: &Rect, _start: f32, _sweep: f32, _use_center: bool) {
        self.add_local(bounds, Coverage::OpenShape);
    }

    fn draw_points(&mut self, _mode: PointMode, points: &[Point]) {
        if let Some(rect) = Rect::bounding(points) {
            self.add_local(&rect, Coverage::Stroke);
        }
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, _mode: BlendMode) {
        self.add_local(vertices.bounds(), Coverage::Fill);
    }

    fn draw_image(
        &mut self,
        image: &Arc<Image>,
        top_left: Point,
        _sampling: ImageSampling,
        with_attributes: bool,
    ) {
        let (width, height) = image.dimensions_f32();
        let dst = Rect::from_xywh(top_left.x, top_left.y, width, height);
        self.add_local_with(&dst, with_attributes);
    }

    fn draw_image_rect(
        &mut self,
        _image: &Arc<Image>,
        _src: &Rect,
        dst: &Rect,
        _sampling: ImageSampling,
        with_attributes: bool,
        _constraint: SrcRectConstraint,
    ) {
        self.add_local_with(dst, with_attributes);
    }

    fn draw_image_nine(
        &mut self,
        _image: &Arc<Image>,
        _center: &IRect,
        dst: &Rect,
        _sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.add_local_with(dst, with_attributes);
    }

    fn draw_image_lattice(
        &mut self,
        _image: &Arc<Image>,
        _x_divs: &[i32],
        _y_divs: &[i32],
        _src: &IRect,
        dst: &Rect,
        _sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.add_local_with(dst, with_attributes);
    }

    fn draw_atlas(
        &mut self,
        _atlas: &Arc<Image>,
        transforms: &[RSTransform],
        texture: &[Rect],
        _colors: &[Color],
        _mode: BlendMode,
        _sampling: ImageSampling,
        cull: Option<&Rect>,
        with_attributes: bool,
    ) {
        let sprites = transforms
            .iter()
            .zip(texture)
            .map(|(xform, tex)| xform.bounds_for_size(tex.width(), tex.height()))
            .fold(Rect::EMPTY, |acc, r| acc.union(&r));
        let sprites = match cull {
            Some(cull) => sprites.intersect(cull).unwrap_or(Rect::EMPTY),
            None => sprites,
        };
        if !sprites.is_empty() {
            self.add_local_with(&sprites, with_attributes);
        }
    }

    fn draw_picture(
        &mut self,
        picture: &Arc<DisplayList>,
        matrix: Option<&Matrix>,
        with_attributes: bool,
    ) {
        let bounds = picture.bounds();
        let local = match matrix {
            Some(m) => m.map_rect(&bounds),
            None => Some(bounds),
        };
        match local {
            Some(rect) if !rect.is_empty() => self.add_local_with(&rect, with_attributes),
            Some(_) => {}
            None => self.add_unbounded(),
        }
    }

    fn draw_display_list(&mut self, list: &Arc<DisplayList>) {
        let bounds = list.bounds();
        if !bounds.is_empty() {
            self.add_local(&bounds, Coverage::Plain);
        }
    }

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f32, y: f32) {
        self.add_local(&blob.bounds().offset(x, y), Coverage::Fill);
    }

    fn draw_shadow(
        &mut self,
        path: &Arc<Path>,
        _color: Color,
        elevation: f32,
        _transparent_occluder: bool,
        device_pixel_ratio: f32,
    ) {
        let shadow = ShadowGeometry::new(elevation, device_pixel_ratio).bounds(&path.bounds());
        self.add_local(&shadow, Coverage::Plain);
    }
}
