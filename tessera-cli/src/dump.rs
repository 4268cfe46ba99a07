//! Op listings for the `dump` command.
//!
//! [`OpListing`] is a dispatcher that turns playback into a flat list of
//! entries, descending into nested display lists. The entries are printed
//! either as an indented colored listing or as JSON.

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{Value, json};
use tessera_display_list::{
    BlendMode, ClipOp, Color, ColorFilter, Dispatcher, DisplayList, DrawStyle, IRect,
    ImageFilter, ImageSampling, Image, MaskFilter, Matrix, Path, PathEffect, Point, PointMode,
    RRect, RSTransform, Rect, Shader, SrcRectConstraint, StrokeCap, StrokeJoin, TextBlob,
    Vertices,
};

/// One dispatched call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpEntry {
    /// Nesting depth; ops of a nested list are one deeper than the
    /// `draw_display_list` that plays them.
    pub depth: usize,
    /// Dispatcher method name.
    pub op: &'static str,
    /// Named arguments.
    pub args: Value,
}

/// Dispatcher collecting [`OpEntry`] values.
#[derive(Debug, Default)]
pub struct OpListing {
    depth: usize,
    entries: Vec<OpEntry>,
}

impl OpListing {
    /// Play `list` and collect its ops.
    pub fn of(list: &DisplayList) -> Vec<OpEntry> {
        let mut listing = Self::default();
        list.dispatch(&mut listing);
        listing.entries
    }

    fn push(&mut self, op: &'static str, args: Value) {
        self.entries.push(OpEntry {
            depth: self.depth,
            op,
            args,
        });
    }
}

/// Print `entries` as an indented listing, one op per line.
pub fn print_listing(entries: &[OpEntry]) {
    for (index, entry) in entries.iter().enumerate() {
        let indent = "  ".repeat(entry.depth);
        let args = match &entry.args {
            Value::Object(map) if !map.is_empty() => map
                .iter()
                .map(|(key, value)| format!("{}={}", key.dimmed(), compact(value)))
                .collect::<Vec<_>>()
                .join(" "),
            _ => String::new(),
        };
        let name = if entry.op.starts_with("set_") {
            entry.op.yellow().to_string()
        } else if entry.op.starts_with("draw_") {
            entry.op.green().bold().to_string()
        } else {
            entry.op.cyan().to_string()
        };
        println!("{:>4} {indent}{name} {args}", index.dimmed());
    }
}

/// Print `entries` as a pretty JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json(entries: &[OpEntry]) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(entries)?);
    Ok(())
}

/// Single-line rendering of an argument value.
fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{key}:{}", compact(value)))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(compact).collect();
            format!("[{}]", items.join(","))
        }
        other => other.to_string(),
    }
}

fn path_summary(path: &Path) -> Value {
    json!({
        "verbs": path.verbs().len(),
        "fill_type": path.fill_type(),
        "bounds": path.bounds(),
    })
}

fn image_summary(image: &Image) -> Value {
    json!({ "width": image.width(), "height": image.height() })
}

fn shader_summary(shader: &Shader) -> Value {
    match shader {
        Shader::Color(color) => json!({ "color": color }),
        Shader::LinearGradient {
            start, end, stops, ..
        } => json!({ "linear_gradient": { "start": start, "end": end, "stops": stops.len() } }),
        Shader::RadialGradient {
            center,
            radius,
            stops,
            ..
        } => json!({
            "radial_gradient": { "center": center, "radius": radius, "stops": stops.len() }
        }),
        Shader::Image { image, .. } => json!({ "image": image_summary(image) }),
    }
}

fn color_filter_summary(filter: &ColorFilter) -> Value {
    match filter {
        ColorFilter::Blend { color, mode } => json!({ "blend": { "color": color, "mode": mode } }),
        ColorFilter::Matrix(_) => json!("matrix"),
        ColorFilter::LinearToSrgbGamma => json!("linear_to_srgb"),
        ColorFilter::SrgbToLinearGamma => json!("srgb_to_linear"),
    }
}

fn image_filter_summary(filter: &ImageFilter) -> Value {
    match filter {
        ImageFilter::Blur {
            sigma_x, sigma_y, ..
        } => json!({ "blur": [sigma_x, sigma_y] }),
        ImageFilter::Dilate { radius_x, radius_y } => json!({ "dilate": [radius_x, radius_y] }),
        ImageFilter::Erode { radius_x, radius_y } => json!({ "erode": [radius_x, radius_y] }),
        ImageFilter::Matrix { matrix, .. } => json!({ "matrix": matrix }),
        ImageFilter::ColorFilter(inner) => json!({ "color_filter": color_filter_summary(inner) }),
        ImageFilter::Compose { outer, inner } => json!({
            "compose": [image_filter_summary(outer), image_filter_summary(inner)]
        }),
    }
}

fn path_effect_summary(effect: &PathEffect) -> Value {
    match effect {
        PathEffect::Dash { intervals, phase } => {
            json!({ "dash": { "intervals": intervals, "phase": phase } })
        }
        PathEffect::Corner { radius } => json!({ "corner": radius }),
    }
}

fn mask_filter_summary(filter: &MaskFilter) -> Value {
    match filter {
        MaskFilter::Blur { style, sigma } => json!({ "blur": { "style": style, "sigma": sigma } }),
    }
}

impl Dispatcher for OpListing {
    fn set_anti_alias(&mut self, anti_alias: bool) {
        self.push("set_anti_alias", json!({ "value": anti_alias }));
    }

    fn set_dither(&mut self, dither: bool) {
        self.push("set_dither", json!({ "value": dither }));
    }

    fn set_invert_colors(&mut self, invert: bool) {
        self.push("set_invert_colors", json!({ "value": invert }));
    }

    fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.push("set_stroke_cap", json!({ "value": cap }));
    }

    fn set_stroke_join(&mut self, join: StrokeJoin) {
        self.push("set_stroke_join", json!({ "value": join }));
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        self.push("set_draw_style", json!({ "value": style }));
    }

    fn set_stroke_width(&mut self, width: f32) {
        self.push("set_stroke_width", json!({ "value": width }));
    }

    fn set_stroke_miter(&mut self, limit: f32) {
        self.push("set_stroke_miter", json!({ "value": limit }));
    }

    fn set_color(&mut self, color: Color) {
        self.push("set_color", json!({ "value": color }));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.push("set_blend_mode", json!({ "value": mode }));
    }

    fn set_shader(&mut self, shader: Option<&Arc<Shader>>) {
        let value = shader.map_or(Value::Null, |s| shader_summary(s));
        self.push("set_shader", json!({ "value": value }));
    }

    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>) {
        let value = filter.map_or(Value::Null, |f| color_filter_summary(f));
        self.push("set_color_filter", json!({ "value": value }));
    }

    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>) {
        let value = filter.map_or(Value::Null, |f| image_filter_summary(f));
        self.push("set_image_filter", json!({ "value": value }));
    }

    fn set_path_effect(&mut self, effect: Option<&Arc<PathEffect>>) {
        let value = effect.map_or(Value::Null, |e| path_effect_summary(e));
        self.push("set_path_effect", json!({ "value": value }));
    }

    fn set_mask_filter(&mut self, filter: Option<&Arc<MaskFilter>>) {
        let value = filter.map_or(Value::Null, |f| mask_filter_summary(f));
        self.push("set_mask_filter", json!({ "value": value }));
    }

    fn save(&mut self) {
        self.push("save", json!({}));
    }

    fn save_layer(
        &mut self,
        bounds: Option<&Rect>,
        with_attributes: bool,
        backdrop: Option<&Arc<ImageFilter>>,
    ) {
        let backdrop = backdrop.map_or(Value::Null, |f| image_filter_summary(f));
        self.push(
            "save_layer",
            json!({ "bounds": bounds, "with_attributes": with_attributes, "backdrop": backdrop }),
        );
    }

    fn restore(&mut self) {
        self.push("restore", json!({}));
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.push("translate", json!({ "tx": tx, "ty": ty }));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.push("scale", json!({ "sx": sx, "sy": sy }));
    }

    fn rotate(&mut self, degrees: f32) {
        self.push("rotate", json!({ "degrees": degrees }));
    }

    fn skew(&mut self, sx: f32, sy: f32) {
        self.push("skew", json!({ "sx": sx, "sy": sy }));
    }

    fn transform_2d_affine(&mut self, mxx: f32, mxy: f32, mxt: f32, myx: f32, myy: f32, myt: f32) {
        self.push(
            "transform_2d_affine",
            json!({ "row_x": [mxx, mxy, mxt], "row_y": [myx, myy, myt] }),
        );
    }

    fn transform_full_perspective(&mut self, matrix: &Matrix) {
        self.push("transform_full_perspective", json!({ "matrix": matrix }));
    }

    fn transform_reset(&mut self) {
        self.push("transform_reset", json!({}));
    }

    fn clip_rect(&mut self, rect: &Rect, op: ClipOp, anti_alias: bool) {
        self.push(
            "clip_rect",
            json!({ "rect": rect, "op": op, "anti_alias": anti_alias }),
        );
    }

    fn clip_oval(&mut self, bounds: &Rect, op: ClipOp, anti_alias: bool) {
        self.push(
            "clip_oval",
            json!({ "bounds": bounds, "op": op, "anti_alias": anti_alias }),
        );
    }

    fn clip_rrect(&mut self, rrect: &RRect, op: ClipOp, anti_alias: bool) {
        self.push(
            "clip_rrect",
            json!({ "rrect": rrect, "op": op, "anti_alias": anti_alias }),
        );
    }

    fn clip_path(&mut self, path: &Arc<Path>, op: ClipOp, anti_alias: bool) {
        self.push(
            "clip_path",
            json!({ "path": path_summary(path), "op": op, "anti_alias": anti_alias }),
        );
    }

    fn draw_paint(&mut self) {
        self.push("draw_paint", json!({}));
    }

    fn draw_color(&mut self, color: Color, mode: BlendMode) {
        self.push("draw_color", json!({ "color": color, "mode": mode }));
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        self.push("draw_line", json!({ "p0": p0, "p1": p1 }));
    }

    fn draw_rect(&mut self, rect: &Rect) {
        self.push("draw_rect", json!({ "rect": rect }));
    }

    fn draw_oval(&mut self, bounds: &Rect) {
        self.push("draw_oval", json!({ "bounds": bounds }));
    }

    fn draw_circle(&mut self, center: Point, radius: f32) {
        self.push("draw_circle", json!({ "center": center, "radius": radius }));
    }

    fn draw_rrect(&mut self, rrect: &RRect) {
        self.push("draw_rrect", json!({ "rrect": rrect }));
    }

    fn draw_drrect(&mut self, outer: &RRect, inner: &RRect) {
        self.push("draw_drrect", json!({ "outer": outer, "inner": inner }));
    }

    fn draw_path(&mut self, path: &Arc<Path>) {
        self.push("draw_path", json!({ "path": path_summary(path) }));
    }

    fn draw_arc(&mut self, bounds: &Rect, start_degrees: f32, sweep_degrees: f32, use_center: bool) {
        self.push(
            "draw_arc",
            json!({
                "bounds": bounds,
                "start": start_degrees,
                "sweep": sweep_degrees,
                "use_center": use_center,
            }),
        );
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        self.push("draw_points", json!({ "mode": mode, "points": points }));
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode) {
        self.push(
            "draw_vertices",
            json!({
                "mode": vertices.mode(),
                "vertices": vertices.positions().len(),
                "bounds": vertices.bounds(),
                "blend": mode,
            }),
        );
    }

    fn draw_image(
        &mut self,
        image: &Arc<Image>,
        top_left: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.push(
            "draw_image",
            json!({
                "image": image_summary(image),
                "top_left": top_left,
                "sampling": sampling,
                "with_attributes": with_attributes,
            }),
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
        self.push(
            "draw_image_rect",
            json!({
                "image": image_summary(image),
                "src": src,
                "dst": dst,
                "sampling": sampling,
                "with_attributes": with_attributes,
                "constraint": constraint,
            }),
        );
    }

    fn draw_image_nine(
        &mut self,
        image: &Arc<Image>,
        center: &IRect,
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    ) {
        self.push(
            "draw_image_nine",
            json!({
                "image": image_summary(image),
                "center": center,
                "dst": dst,
                "sampling": sampling,
                "with_attributes": with_attributes,
            }),
        );
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
        self.push(
            "draw_image_lattice",
            json!({
                "image": image_summary(image),
                "x_divs": x_divs,
                "y_divs": y_divs,
                "src": src,
                "dst": dst,
                "sampling": sampling,
                "with_attributes": with_attributes,
            }),
        );
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
        self.push(
            "draw_atlas",
            json!({
                "atlas": image_summary(atlas),
                "sprites": transforms.len().min(texture.len()),
                "colors": colors.len(),
                "mode": mode,
                "sampling": sampling,
                "cull": cull,
                "with_attributes": with_attributes,
            }),
        );
    }

    fn draw_picture(
        &mut self,
        picture: &Arc<DisplayList>,
        matrix: Option<&Matrix>,
        with_attributes: bool,
    ) {
        self.push(
            "draw_picture",
            json!({
                "id": picture.unique_id(),
                "matrix": matrix,
                "with_attributes": with_attributes,
            }),
        );
        self.depth += 1;
        picture.dispatch(self);
        self.depth -= 1;
    }

    fn draw_display_list(&mut self, list: &Arc<DisplayList>) {
        self.push(
            "draw_display_list",
            json!({ "id": list.unique_id(), "ops": list.op_count() }),
        );
        self.depth += 1;
        list.dispatch(self);
        self.depth -= 1;
    }

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f32, y: f32) {
        self.push(
            "draw_text_blob",
            json!({ "text": blob.text(), "size": blob.font_size(), "x": x, "y": y }),
        );
    }

    fn draw_shadow(
        &mut self,
        path: &Arc<Path>,
        color: Color,
        elevation: f32,
        transparent_occluder: bool,
        device_pixel_ratio: f32,
    ) {
        self.push(
            "draw_shadow",
            json!({
                "path": path_summary(path),
                "color": color,
                "elevation": elevation,
                "transparent_occluder": transparent_occluder,
                "dpr": device_pixel_ratio,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_display_list::DisplayListBuilder;

    #[test]
    fn test_listing_descends_into_nested_lists() {
        let mut inner = DisplayListBuilder::new();
        inner.draw_rect(&Rect::from_ltrb(0.0, 0.0, 1.0, 1.0));
        let inner = Arc::new(inner.build());

        let mut outer = DisplayListBuilder::new();
        outer.draw_display_list(&inner);
        outer.draw_paint();
        let entries = OpListing::of(&outer.build());

        let ops: Vec<(usize, &str)> = entries.iter().map(|e| (e.depth, e.op)).collect();
        assert_eq!(
            ops,
            vec![(0, "draw_display_list"), (1, "draw_rect"), (0, "draw_paint")]
        );
    }

    #[test]
    fn test_json_entry_shape() {
        let mut builder = DisplayListBuilder::new();
        builder.set_color(Color::RED);
        let entries = OpListing::of(&builder.build());
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0]["op"], "set_color");
        assert_eq!(json[0]["depth"], 0);
        assert_eq!(json[0]["args"]["value"]["r"], 255);
    }

    #[test]
    fn test_compact_formats_nested_values() {
        let value = json!({ "a": [1, 2], "b": "x" });
        assert_eq!(compact(&value), "{a:[1,2],b:x}");
    }
}
