//! A dispatcher that logs every call it receives.

#![allow(dead_code)]

use std::sync::Arc;

use tessera_display_list::{
    BlendMode, ClipOp, Color, ColorFilter, Dispatcher, DisplayList, DrawStyle, IRect, Image,
    ImageFilter, ImageSampling, MaskFilter, Matrix, Path, PathEffect, Point, PointMode, RRect,
    RSTransform, Rect, Shader, SrcRectConstraint, StrokeCap, StrokeJoin, TextBlob, Vertices,
};

/// Logs each call as `name(args)`, with arguments in `Debug` form.
#[derive(Debug, Default)]
pub struct OpLog {
    pub calls: Vec<String>,
}

impl OpLog {
    pub fn of(list: &DisplayList) -> Vec<String> {
        let mut log = Self::default();
        list.dispatch(&mut log);
        log.calls
    }

    fn log(&mut self, call: String) {
        self.calls.push(call);
    }
}

pub fn rect(l: f32, t: f32, r: f32, b: f32) -> Rect {
    Rect::from_ltrb(l, t, r, b)
}

impl Dispatcher for OpLog {
    fn set_anti_alias(&mut self, anti_alias: bool) {
        self.log(format!("set_anti_alias({anti_alias})"));
    }

    fn set_dither(&mut self, dither: bool) {
        self.log(format!("set_dither({dither})"));
    }

    fn set_invert_colors(&mut self, invert: bool) {
        self.log(format!("set_invert_colors({invert})"));
    }

    fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.log(format!("set_stroke_cap({cap:?})"));
    }

    fn set_stroke_join(&mut self, join: StrokeJoin) {
        self.log(format!("set_stroke_join({join:?})"));
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        self.log(format!("set_draw_style({style:?})"));
    }

    fn set_stroke_width(&mut self, width: f32) {
        self.log(format!("set_stroke_width({width})"));
    }

    fn set_stroke_miter(&mut self, limit: f32) {
        self.log(format!("set_stroke_miter({limit})"));
    }

    fn set_color(&mut self, color: Color) {
        self.log(format!("set_color({color:?})"));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.log(format!("set_blend_mode({mode:?})"));
    }

    fn set_shader(&mut self, shader: Option<&Arc<Shader>>) {
        self.log(format!("set_shader({shader:?})"));
    }

    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>) {
        self.log(format!("set_color_filter({filter:?})"));
    }

    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>) {
        self.log(format!("set_image_filter({filter:?})"));
    }

    fn set_path_effect(&mut self, effect: Option<&Arc<PathEffect>>) {
        self.log(format!("set_path_effect({effect:?})"));
    }

    fn set_mask_filter(&mut self, filter: Option<&Arc<MaskFilter>>) {
        self.log(format!("set_mask_filter({filter:?})"));
    }

    fn save(&mut self) {
        self.log("save()".to_string());
    }

    fn save_layer(
        &mut self,
        bounds: Option<&Rect>,
        with_attributes: bool,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        self.log(format!(
            "save_layer({bounds:?}, {with_attributes}, {backdrop:?})"
        ));
    }

    fn restore(&mut self) {
        self.log("restore()".to_string());
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.log(format!("translate({tx}, {ty})"));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.log(format!("scale({sx}, {sy})"));
    }

    fn rotate(&mut self, degrees: f32) {
        self.log(format!("rotate({degrees})"));
    }

    fn skew(&mut self, sx: f32, sy: f32) {
        self.log(format!("skew({sx}, {sy})"));
    }

    fn transform_2d_affine(&mut self, mxx: f32, mxy: f32, mxt: f32, myx: f32, myy: f32, myt: f32) {
        self.log(format!(
            "transform_2d_affine({mxx}, {mxy}, {mxt}, {myx}, {myy}, {myt})"
        ));
    }

    fn transform_full_perspective(&mut self, matrix: &Matrix) {
        self.log(format!("transform_full_perspective({:?})", matrix.values()));
    }

    fn transform_reset(&mut self) {
        self.log("transform_reset()".to_string());
    }

    fn clip_rect(&mut self, rect: &Rect, op: ClipOp, anti_alias: bool) {
        self.log(format!("clip_rect({rect:?}, {op:?}, {anti_alias})"));
    }

    fn clip_oval(&mut self, bounds: &Rect, op: ClipOp, anti_alias: bool) {
        self.log(format!("clip_oval({bounds:?}, {op:?}, {anti_alias})"));
    }

    fn clip_rrect(&mut self, rrect: &RRect, op: ClipOp, anti_alias: bool) {
        self.log(format!("clip_rrect({rrect:?}, {op:?}, {anti_alias})"));
    }

    fn clip_path(&mut self, path: &Arc<Path>, op: ClipOp, anti_alias: bool) {
        self.log(format!("clip_path({:?}, {op:?}, {anti_alias})", path.bounds()));
    }

    fn draw_paint(&mut self) {
        self.log("draw_paint()".to_string());
    }

    fn draw_color(&mut self, color: Color, mode: BlendMode) {
        self.log(format!("draw_color({color:?}, {mode:?})"));
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        self.log(format!("draw_line({p0:?}, {p1:?})"));
    }

    fn draw_rect(&mut self, rect: &Rect) {
        self.log(format!("draw_rect({rect:?})"));
    }

    fn draw_oval(&mut self, bounds: &Rect) {
        self.log(format!("draw_oval({bounds:?})"));
    }

    fn draw_circle(&mut self, center: Point, radius: f32) {
        self.log(format!("draw_circle({center:?}, {radius})"));
    }

    fn draw_rrect(&mut self, rrect: &RRect) {
        self.log(format!("draw_rrect({rrect:?})"));
    }

    fn draw_drrect(&mut self, outer: &RRect, inner: &RRect) {
        self.log(format!("draw_drrect({outer:?}, {inner:?})"));
    }

    fn draw_path(&mut self, path: &Arc<Path>) {
        self.log(format!("draw_path({:?})", path.bounds()));
    }

    fn draw_arc(&mut self, bounds: &Rect, start_degrees: f32, sweep_degrees: f32, use_center: bool) {
        self.log(format!(
            "draw_arc({bounds:?}, {start_degrees}, {sweep_degrees}, {use_center})"
        ));
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        self.log(format!("draw_points({mode:?}, {points:?})"));
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {
        self.log(format!(
            "draw_vertices({} positions, {mode:?})",
            vertices.positions().len()
        ));
    }

    fn draw_image(
        &mut self,
        image: &Arc<Image>,
        top_left: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.log(format!(
            "draw_image({:?}, {top_left:?}, {sampling:?}, {with_attributes})",
            image.dimensions_f32()
        ));
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
        self.log(format!(
            "draw_image_rect({:?}, {src:?}, {dst:?}, {sampling:?}, {with_attributes}, {constraint:?})",
            image.dimensions_f32()
        ));
    }

    fn draw_image_nine(
        &mut self,
        image: &Arc<Image>,
        center: &IRect,
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.log(format!(
            "draw_image_nine({:?}, {center:?}, {dst:?}, {sampling:?}, {with_attributes})",
            image.dimensions_f32()
        ));
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
        self.log(format!(
            "draw_image_lattice({:?}, {x_divs:?}, {y_divs:?}, {src:?}, {dst:?}, {sampling:?}, {with_attributes})",
            image.dimensions_f32()
        ));
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
        self.log(format!(
            "draw_atlas({:?}, {transforms:?}, {texture:?}, {colors:?}, {mode:?}, {sampling:?}, {cull:?}, {with_attributes})",
            atlas.dimensions_f32()
        ));
    }

    fn draw_picture(
        &mut self,
        picture: &Arc<DisplayList>,
        matrix: Option<&Matrix>,
        with_attributes: bool,
    ) {
        self.log(format!(
            "draw_picture({} ops, {:?}, {with_attributes})",
            picture.op_count(),
            matrix.map(Matrix::values)
        ));
    }

    fn draw_display_list(&mut self, list: &Arc<DisplayList>) {
        self.log(format!("draw_display_list({} ops)", list.op_count()));
    }

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f32, y: f32) {
        self.log(format!("draw_text_blob({:?}, {x}, {y})", blob.text()));
    }

    fn draw_shadow(
        &mut self,
        path: &Arc<Path>,
        color: Color,
        elevation: f32,
        transparent_occluder: bool,
        device_pixel_ratio: f32,
    ) {
        self.log(format!(
            "draw_shadow({:?}, {color:?}, {elevation}, {transparent_occluder}, {device_pixel_ratio})",
            path.bounds()
        ));
    }
}
