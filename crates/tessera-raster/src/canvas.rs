//! A [`Canvas`] drawing into a tiny-skia pixmap.
//!
//! Layers are full-surface pixmaps swapped in for the parent until the
//! matching restore, then filtered and composited through the parent's
//! clip. Draws whose paint carries a filter take the same route through a
//! temporary layer, so filters see unclipped content.

use std::mem;

use tessera_common::{Image, warn_once};
use tessera_display_list::{
    BlendMode, BlurStyle, Canvas, ClipOp, Color, DrawStyle, ImageFilter, ImageSampling,
    MaskFilter, Matrix, Paint, Path, Point, PointMode, RRect, RSTransform, Rect,
    ShadowGeometry, SrcRectConstraint, StrokeCap, TextBlob, Vertices,
};
use tiny_skia::{
    FillRule, FilterQuality, Mask, PathBuilder, Pixmap, PixmapPaint, SpreadMode, Transform,
};

use crate::convert;
use crate::error::RasterError;
use crate::filter;
use crate::options::RasterOptions;
use crate::text::{self, FontSet};

/// Parent surface and compositing paint of an open layer.
struct LayerFrame {
    parent: Pixmap,
    paint: Option<Paint>,
}

struct SavedState {
    transform: Transform,
    clip: Option<Mask>,
    layer: Option<LayerFrame>,
}

/// Reference software backend.
pub struct PixmapCanvas {
    pixmap: Pixmap,
    /// Transparent surface of the same size, cloned for new layers.
    blank: Pixmap,
    /// Empty mask of the same size, cloned for new clips.
    blank_mask: Mask,
    transform: Transform,
    /// Coverage of the clip; `None` means unclipped.
    clip: Option<Mask>,
    stack: Vec<SavedState>,
    fonts: FontSet,
}

impl PixmapCanvas {
    /// Create a surface cleared to `options.background`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidSurfaceSize`] if either dimension is
    /// zero or too large to allocate.
    pub fn new(options: &RasterOptions) -> Result<Self, RasterError> {
        let invalid = || RasterError::InvalidSurfaceSize {
            width: options.width,
            height: options.height,
        };
        let blank = Pixmap::new(options.width, options.height).ok_or_else(invalid)?;
        let blank_mask = Mask::new(options.width, options.height).ok_or_else(invalid)?;
        let mut pixmap = blank.clone();
        pixmap.fill(convert::to_color(options.background));
        Ok(Self {
            pixmap,
            blank,
            blank_mask,
            transform: Transform::identity(),
            clip: None,
            stack: Vec::new(),
            fonts: FontSet::load(&options.font_paths),
        })
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Number of saves and layers not yet restored.
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// The rendered surface, with any open layers composited.
    #[must_use]
    pub fn into_pixmap(mut self) -> Pixmap {
        while !self.stack.is_empty() {
            self.restore();
        }
        self.pixmap
    }

    #[allow(clippy::cast_precision_loss)]
    fn surface_rect(&self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    /// Composite `layer` onto the current surface through the clip.
    fn composite(&mut self, layer: &Pixmap, alpha: u8, mode: BlendMode) {
        let paint = PixmapPaint {
            opacity: f32::from(alpha) / 255.0,
            blend_mode: convert::to_blend_mode(mode),
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &paint,
            Transform::identity(),
            self.clip.as_ref(),
        );
    }

    /// Run `draw` with `paint`, routing through a temporary layer when the
    /// paint has filters. `draw` receives the paint with its filters
    /// removed.
    fn paint_layered(&mut self, paint: &Paint, draw: impl FnOnce(&mut Self, &Paint)) {
        if paint.color_filter.is_none() && paint.image_filter.is_none() && paint.mask_filter.is_none()
        {
            draw(self, paint);
            return;
        }

        let plain = Paint {
            color_filter: None,
            image_filter: None,
            mask_filter: None,
            blend_mode: BlendMode::SrcOver,
            ..paint.clone()
        };
        let parent = mem::replace(&mut self.pixmap, self.blank.clone());
        let clip = self.clip.take();
        draw(self, &plain);
        self.clip = clip;
        let mut layer = mem::replace(&mut self.pixmap, parent);

        if let Some(MaskFilter::Blur { style, sigma }) = paint.mask_filter.as_deref() {
            if *style == BlurStyle::Inner {
                let _ = warn_once("Raster", "inner mask blurs are drawn unblurred");
            } else {
                let radius = filter::device_radius(*sigma, &self.transform);
                filter::blur(&mut layer, radius, radius);
            }
        }
        if let Some(color_filter) = &paint.color_filter {
            filter::apply_color_filter(&mut layer, color_filter);
        }
        if let Some(image_filter) = &paint.image_filter {
            filter::apply_image_filter(&mut layer, image_filter, &self.transform, &self.blank);
        }
        self.composite(&layer, u8::MAX, paint.blend_mode);
    }

    /// Fill and/or stroke `path` as `paint`'s draw style asks.
    fn draw_shape(&mut self, path: Option<tiny_skia::Path>, rule: FillRule, paint: &Paint) {
        let Some(path) = path else {
            return;
        };
        self.paint_layered(paint, |canvas, paint| {
            let pixmap = convert::shader_pixmap(paint);
            let skia = convert::to_paint(paint, pixmap.as_ref());
            if paint.draw_style != DrawStyle::Stroke {
                canvas
                    .pixmap
                    .fill_path(&path, &skia, rule, canvas.transform, canvas.clip.as_ref());
            }
            if paint.is_stroked() {
                canvas.pixmap.stroke_path(
                    &path,
                    &skia,
                    &convert::to_stroke(paint),
                    canvas.transform,
                    canvas.clip.as_ref(),
                );
            }
        });
    }

    /// Stroke `path` regardless of the draw style.
    fn stroke_shape(&mut self, path: Option<tiny_skia::Path>, paint: &Paint) {
        let stroked = Paint {
            draw_style: DrawStyle::Stroke,
            ..paint.clone()
        };
        self.draw_shape(path, FillRule::Winding, &stroked);
    }

    /// One-device-pixel squares at each point, for hairline points.
    fn draw_hairline_points(&mut self, points: &[Point], paint: &Paint) {
        let transform = self.transform;
        let mut pb = PathBuilder::new();
        for p in points {
            let mut mapped = [tiny_skia::Point::from_xy(p.x, p.y)];
            transform.map_points(&mut mapped);
            if let Some(rect) =
                tiny_skia::Rect::from_xywh(mapped[0].x - 0.5, mapped[0].y - 0.5, 1.0, 1.0)
            {
                pb.push_rect(rect);
            }
        }
        let Some(path) = pb.finish() else {
            return;
        };
        let fill = Paint {
            draw_style: DrawStyle::Fill,
            ..paint.clone()
        };
        self.transform = Transform::identity();
        self.draw_shape(Some(path), FillRule::Winding, &fill);
        self.transform = transform;
    }

    /// Combine the clip with `path`.
    fn clip_with(
        &mut self,
        path: Option<tiny_skia::Path>,
        rule: FillRule,
        op: ClipOp,
        anti_alias: bool,
    ) {
        let Some(path) = path else {
            if op == ClipOp::Intersect {
                self.clip = Some(self.blank_mask.clone());
            }
            return;
        };
        match op {
            ClipOp::Intersect => match &mut self.clip {
                Some(mask) => mask.intersect_path(&path, rule, anti_alias, self.transform),
                None => {
                    let mut mask = self.blank_mask.clone();
                    mask.fill_path(&path, rule, anti_alias, self.transform);
                    self.clip = Some(mask);
                }
            },
            ClipOp::Difference => {
                let mut shape = self.blank_mask.clone();
                shape.fill_path(&path, rule, anti_alias, self.transform);
                for coverage in shape.data_mut() {
                    *coverage = u8::MAX - *coverage;
                }
                if let Some(existing) = &self.clip {
                    for (dst, src) in shape.data_mut().iter_mut().zip(existing.data()) {
                        let product = (u16::from(*dst) * u16::from(*src) + 127) / 255;
                        *dst = u8::try_from(product).unwrap_or(u8::MAX);
                    }
                }
                self.clip = Some(shape);
            }
        }
    }

    /// Draw `src` of `pixmap` into `dst` under `transform`.
    fn fill_image_rect(
        &mut self,
        pixmap: &Pixmap,
        src: &Rect,
        dst: &Rect,
        transform: Transform,
        sampling: ImageSampling,
        paint: &Paint,
    ) {
        if src.is_empty() || dst.is_empty() {
            return;
        }
        let Some(dst_rect) = convert::to_rect(dst) else {
            return;
        };
        let sx = dst.width() / src.width();
        let sy = dst.height() / src.height();
        let placement = Transform::from_row(
            sx,
            0.0,
            0.0,
            sy,
            src.left.mul_add(-sx, dst.left),
            src.top.mul_add(-sy, dst.top),
        );
        self.paint_layered(paint, |canvas, paint| {
            let skia = tiny_skia::Paint {
                shader: tiny_skia::Pattern::new(
                    pixmap.as_ref(),
                    SpreadMode::Pad,
                    convert::to_quality(sampling),
                    f32::from(paint.color.a) / 255.0,
                    placement,
                ),
                blend_mode: convert::to_blend_mode(paint.blend_mode),
                anti_alias: paint.anti_alias,
                ..tiny_skia::Paint::default()
            };
            canvas
                .pixmap
                .fill_rect(dst_rect, &skia, transform, canvas.clip.as_ref());
        });
    }
}

impl Canvas for PixmapCanvas {
    fn save(&mut self) {
        self.stack.push(SavedState {
            transform: self.transform,
            clip: self.clip.clone(),
            layer: None,
        });
    }

    fn save_layer(
        &mut self,
        bounds: Option<&Rect>,
        paint: Option<&Paint>,
        backdrop: Option<&ImageFilter>,
    ) {
        let parent = mem::replace(&mut self.pixmap, self.blank.clone());
        let backdrop_source = backdrop.map(|_| parent.clone());
        self.stack.push(SavedState {
            transform: self.transform,
            clip: self.clip.clone(),
            layer: Some(LayerFrame {
                parent,
                paint: paint.cloned(),
            }),
        });
        if let Some(bounds) = bounds {
            self.clip_rect(bounds, ClipOp::Intersect, false);
        }
        if let (Some(filter), Some(mut source)) = (backdrop, backdrop_source) {
            filter::apply_image_filter(&mut source, filter, &self.transform, &self.blank);
            self.composite(&source, u8::MAX, BlendMode::Src);
        }
    }

    fn restore(&mut self) {
        let Some(saved) = self.stack.pop() else {
            return;
        };
        self.transform = saved.transform;
        self.clip = saved.clip;
        let Some(frame) = saved.layer else {
            return;
        };

        let mut content = mem::replace(&mut self.pixmap, frame.parent);
        let paint = frame.paint.unwrap_or_default();
        if let Some(image_filter) = &paint.image_filter {
            filter::apply_image_filter(&mut content, image_filter, &self.transform, &self.blank);
        }
        if let Some(color_filter) = &paint.color_filter {
            filter::apply_color_filter(&mut content, color_filter);
        }
        self.composite(&content, paint.color.a, paint.blend_mode);
    }

    fn concat(&mut self, matrix: &Matrix) {
        self.transform = self.transform.pre_concat(convert::to_transform(matrix));
    }

    fn reset_matrix(&mut self) {
        self.transform = Transform::identity();
    }

    fn clip_rect(&mut self, rect: &Rect, op: ClipOp, anti_alias: bool) {
        self.clip_with(convert::rect_path(rect), FillRule::Winding, op, anti_alias);
    }

    fn clip_rrect(&mut self, rrect: &RRect, op: ClipOp, anti_alias: bool) {
        self.clip_with(convert::rrect_path(rrect), FillRule::Winding, op, anti_alias);
    }

    fn clip_path(&mut self, path: &Path, op: ClipOp, anti_alias: bool) {
        let rule = convert::to_fill_rule(path.fill_type());
        self.clip_with(convert::to_path(path), rule, op, anti_alias);
    }

    fn draw_paint(&mut self, paint: &Paint) {
        let Some(surface) = self.surface_rect() else {
            return;
        };
        self.paint_layered(paint, |canvas, paint| {
            let pixmap = convert::shader_pixmap(paint);
            let skia = convert::to_paint(paint, pixmap.as_ref());
            canvas
                .pixmap
                .fill_rect(surface, &skia, Transform::identity(), canvas.clip.as_ref());
        });
    }

    fn draw_rect(&mut self, rect: &Rect, paint: &Paint) {
        self.draw_shape(convert::rect_path(rect), FillRule::Winding, paint);
    }

    fn draw_oval(&mut self, bounds: &Rect, paint: &Paint) {
        self.draw_shape(convert::oval_path(bounds), FillRule::Winding, paint);
    }

    fn draw_rrect(&mut self, rrect: &RRect, paint: &Paint) {
        self.draw_shape(convert::rrect_path(rrect), FillRule::Winding, paint);
    }

    fn draw_drrect(&mut self, outer: &RRect, inner: &RRect, paint: &Paint) {
        self.draw_shape(convert::drrect_path(outer, inner), FillRule::EvenOdd, paint);
    }

    fn draw_path(&mut self, path: &Path, paint: &Paint) {
        let rule = convert::to_fill_rule(path.fill_type());
        self.draw_shape(convert::to_path(path), rule, paint);
    }

    fn draw_arc(
        &mut self,
        bounds: &Rect,
        start_degrees: f32,
        sweep_degrees: f32,
        use_center: bool,
        paint: &Paint,
    ) {
        let path = convert::arc_path(bounds, start_degrees, sweep_degrees, use_center);
        self.draw_shape(path, FillRule::Winding, paint);
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point], paint: &Paint) {
        if points.is_empty() {
            return;
        }
        let mut pb = PathBuilder::new();
        match mode {
            PointMode::Points => {
                if paint.stroke_width <= 0.0 {
                    self.draw_hairline_points(points, paint);
                    return;
                }
                let half = paint.stroke_width * 0.5;
                for p in points {
                    if paint.stroke_cap == StrokeCap::Round {
                        pb.push_circle(p.x, p.y, half);
                    } else if let Some(rect) =
                        tiny_skia::Rect::from_ltrb(p.x - half, p.y - half, p.x + half, p.y + half)
                    {
                        pb.push_rect(rect);
                    }
                }
                let fill = Paint {
                    draw_style: DrawStyle::Fill,
                    ..paint.clone()
                };
                self.draw_shape(pb.finish(), FillRule::Winding, &fill);
                return;
            }
            PointMode::Lines => {
                for pair in points.chunks_exact(2) {
                    pb.move_to(pair[0].x, pair[0].y);
                    pb.line_to(pair[1].x, pair[1].y);
                }
            }
            PointMode::Polygon => {
                pb.move_to(points[0].x, points[0].y);
                for p in &points[1..] {
                    pb.line_to(p.x, p.y);
                }
            }
        }
        self.stroke_shape(pb.finish(), paint);
    }

    fn draw_vertices(&mut self, vertices: &Vertices, _mode: BlendMode, paint: &Paint) {
        let positions = vertices.positions();
        if vertices.texture_coordinates().is_some() {
            let _ = warn_once("Raster", "vertex texture coordinates are ignored");
        }
        let colors = vertices.colors();
        if colors.is_some() {
            let _ = warn_once("Raster", "per-vertex colors are drawn as flat triangles");
        }
        let fill = Paint {
            draw_style: DrawStyle::Fill,
            ..paint.clone()
        };
        for [a, b, c] in vertices.triangles() {
            let mut pb = PathBuilder::new();
            pb.move_to(positions[a].x, positions[a].y);
            pb.line_to(positions[b].x, positions[b].y);
            pb.line_to(positions[c].x, positions[c].y);
            pb.close();
            let triangle_paint = match colors {
                Some(colors) => {
                    let mean = average(&[colors[a], colors[b], colors[c]]);
                    Paint {
                        color: convert::modulate(mean, paint.color.a, false),
                        shader: None,
                        ..fill.clone()
                    }
                }
                None => fill.clone(),
            };
            self.draw_shape(pb.finish(), FillRule::Winding, &triangle_paint);
        }
    }

    fn draw_image_rect(
        &mut self,
        image: &Image,
        src: &Rect,
        dst: &Rect,
        sampling: ImageSampling,
        paint: Option<&Paint>,
        _constraint: SrcRectConstraint,
    ) {
        let Some(pixmap) = convert::image_pixmap(image) else {
            return;
        };
        let paint = paint.cloned().unwrap_or_default();
        let transform = self.transform;
        self.fill_image_rect(&pixmap, src, dst, transform, sampling, &paint);
    }

    fn draw_atlas(
        &mut self,
        atlas: &Image,
        transforms: &[RSTransform],
        texture: &[Rect],
        colors: &[Color],
        _mode: BlendMode,
        sampling: ImageSampling,
        cull: Option<&Rect>,
        paint: Option<&Paint>,
    ) {
        let Some(pixmap) = convert::image_pixmap(atlas) else {
            return;
        };
        if !colors.is_empty() {
            let _ = warn_once("Raster", "atlas sprite colors are ignored");
        }
        let paint = paint.cloned().unwrap_or_default();
        self.save();
        if let Some(cull) = cull {
            self.clip_rect(cull, ClipOp::Intersect, false);
        }
        for (xform, tex) in transforms.iter().zip(texture) {
            let sprite = self
                .transform
                .pre_concat(convert::to_transform(&xform.to_matrix()))
                .pre_translate(-tex.left, -tex.top);
            self.fill_image_rect(&pixmap, tex, tex, sprite, sampling, &paint);
        }
        self.restore();
    }

    #[allow(clippy::cast_sign_loss)]
    fn draw_text_blob(&mut self, blob: &TextBlob, x: f32, y: f32, paint: &Paint) {
        let glyphs = self.fonts.layout(blob.text(), blob.font_size());
        let Some((left, top, right, bottom)) = text::extents(&glyphs) else {
            return;
        };
        let (width, height) = ((right - left) as u32, (bottom - top) as u32);
        let Some(mut pixels) = Pixmap::new(width, height) else {
            return;
        };
        let color = convert::modulate(paint.color, u8::MAX, paint.invert_colors);

        for glyph in &glyphs {
            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    let coverage = glyph.coverage[gy * glyph.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    // In range: extents cover every glyph box.
                    let px = (glyph.left - left) as usize + gx;
                    let py = (glyph.top - top) as usize + gy;
                    let alpha = u16::from(coverage) * u16::from(color.a) / 255;
                    let alpha = u8::try_from(alpha).unwrap_or(u8::MAX);
                    let premultiplied =
                        tiny_skia::ColorU8::from_rgba(color.r, color.g, color.b, alpha)
                            .premultiply();
                    let i = (py * width as usize + px) * 4;
                    pixels.data_mut()[i..i + 4].copy_from_slice(&[
                        premultiplied.red(),
                        premultiplied.green(),
                        premultiplied.blue(),
                        premultiplied.alpha(),
                    ]);
                }
            }
        }

        // Glyphs are rasterized on whole pixels relative to the origin; a
        // fractional origin is carried by the transform and resampled.
        let fractional = x.fract() != 0.0 || y.fract() != 0.0;
        self.paint_layered(paint, |canvas, paint| {
            let pixmap_paint = PixmapPaint {
                blend_mode: convert::to_blend_mode(paint.blend_mode),
                quality: if fractional {
                    FilterQuality::Bilinear
                } else {
                    FilterQuality::Nearest
                },
                ..PixmapPaint::default()
            };
            canvas.pixmap.draw_pixmap(
                left,
                top,
                pixels.as_ref(),
                &pixmap_paint,
                canvas.transform.pre_translate(x, y),
                canvas.clip.as_ref(),
            );
        });
    }

    fn draw_shadow(
        &mut self,
        path: &Path,
        color: Color,
        elevation: f32,
        _transparent_occluder: bool,
        device_pixel_ratio: f32,
    ) {
        let geometry = ShadowGeometry::new(elevation, device_pixel_ratio);
        let Some(shadow) = convert::to_path(&path.offset(geometry.offset.x, geometry.offset.y))
        else {
            return;
        };
        let mut layer = self.blank.clone();
        let paint = tiny_skia::Paint {
            shader: tiny_skia::Shader::SolidColor(convert::to_color(color)),
            anti_alias: true,
            ..tiny_skia::Paint::default()
        };
        layer.fill_path(
            &shadow,
            &paint,
            convert::to_fill_rule(path.fill_type()),
            self.transform,
            None,
        );
        let radius = filter::device_radius(geometry.blur_sigma, &self.transform);
        filter::blur(&mut layer, radius, radius);
        self.composite(&layer, u8::MAX, BlendMode::SrcOver);
    }
}

/// Channel-wise mean of `colors`.
fn average(colors: &[Color; 3]) -> Color {
    let mean = |channel: fn(&Color) -> u8| {
        let sum: u16 = colors.iter().map(|c| u16::from(channel(c))).sum();
        u8::try_from(sum / 3).unwrap_or(u8::MAX)
    };
    Color::rgba(mean(|c| c.r), mean(|c| c.g), mean(|c| c.b), mean(|c| c.a))
}

impl std::fmt::Debug for PixmapCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapCanvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("save_depth", &self.stack.len())
            .field("clipped", &self.clip.is_some())
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(size: u32) -> PixmapCanvas {
        let options = RasterOptions {
            font_paths: Vec::new(),
            ..RasterOptions::new(size, size)
        };
        PixmapCanvas::new(&options).unwrap()
    }

    fn pixel(canvas: &PixmapCanvas, x: u32, y: u32) -> [u8; 4] {
        let p = canvas.pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn test_zero_size_surface_is_rejected() {
        let result = PixmapCanvas::new(&RasterOptions::new(0, 10));
        assert!(matches!(
            result,
            Err(RasterError::InvalidSurfaceSize {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn test_rect_fill() {
        let mut c = canvas(20);
        c.draw_rect(&Rect::from_ltrb(5.0, 5.0, 10.0, 10.0), &Paint::with_color(Color::RED));
        assert_eq!(pixel(&c, 7, 7), [255, 0, 0, 255]);
        assert_eq!(pixel(&c, 2, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn test_difference_clip_leaves_hole() {
        let mut c = canvas(20);
        c.clip_rect(&Rect::from_ltrb(5.0, 5.0, 10.0, 10.0), ClipOp::Difference, false);
        c.draw_paint(&Paint::with_color(Color::BLUE));
        assert_eq!(pixel(&c, 7, 7), [255, 255, 255, 255]);
        assert_eq!(pixel(&c, 15, 15), [0, 0, 255, 255]);
    }

    #[test]
    fn test_restore_pops_transform_and_clip() {
        let mut c = canvas(20);
        c.save();
        c.concat(&Matrix::translate(10.0, 10.0));
        c.clip_rect(&Rect::from_ltrb(0.0, 0.0, 2.0, 2.0), ClipOp::Intersect, false);
        c.restore();
        assert_eq!(c.save_depth(), 0);
        c.draw_rect(&Rect::from_ltrb(0.0, 0.0, 4.0, 4.0), &Paint::with_color(Color::GREEN));
        assert_eq!(pixel(&c, 1, 1), [0, 255, 0, 255]);
    }

    #[test]
    fn test_layer_alpha_composites_on_restore() {
        let mut c = canvas(10);
        let layer_paint = Paint::with_color(Color::BLACK.with_alpha(0));
        c.save_layer(None, Some(&layer_paint), None);
        c.draw_paint(&Paint::with_color(Color::RED));
        assert_eq!(pixel(&c, 5, 5), [255, 0, 0, 255]);
        c.restore();
        assert_eq!(pixel(&c, 5, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn test_hairline_points_cover_single_pixels() {
        let mut c = canvas(10);
        c.draw_points(
            PointMode::Points,
            &[Point::new(3.5, 3.5)],
            &Paint::with_color(Color::BLACK),
        );
        assert_eq!(pixel(&c, 3, 3), [0, 0, 0, 255]);
        assert_eq!(pixel(&c, 4, 4), [255, 255, 255, 255]);
    }

    /// Horizontal center of mass of dark pixels on a white surface.
    #[allow(clippy::cast_precision_loss)]
    fn ink_center_x(canvas: &PixmapCanvas) -> f32 {
        let (mut weight, mut moment) = (0.0, 0.0);
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                let ink = f32::from(255 - pixel(canvas, x, y)[0]);
                weight += ink;
                moment += ink * x as f32;
            }
        }
        moment / weight
    }

    #[test]
    fn test_text_keeps_fractional_origin() {
        let blob = TextBlob::new("l", 30.0);
        let mut centers = Vec::new();
        for x in [10.0, 10.5] {
            let mut c = PixmapCanvas::new(&RasterOptions::new(60, 60)).unwrap();
            if !c.fonts.is_available() {
                return;
            }
            c.draw_text_blob(&blob, x, 40.0, &Paint::with_color(Color::BLACK));
            centers.push(ink_center_x(&c));
        }
        let shift = centers[1] - centers[0];
        assert!((0.25..0.75).contains(&shift), "shift {shift}");
    }

    #[test]
    fn test_average_color() {
        let c = average(&[Color::rgb(0, 0, 0), Color::rgb(30, 60, 90), Color::rgb(0, 0, 0)]);
        assert_eq!(c, Color::rgba(10, 20, 30, 255));
    }
}
