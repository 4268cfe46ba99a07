//! Conversions from display-list value types to tiny-skia.

use tessera_common::{Image, warn_once};
use tessera_display_list::{
    BlendMode, Color, FillType, ImageSampling, Matrix, Paint, Path, PathEffect, PathVerb, Point,
    RRect, Rect, Shader, StrokeCap, StrokeJoin, TileMode,
};
use tiny_skia::{
    BlendMode as SkiaBlendMode, ColorU8, FillRule, FilterQuality, GradientStop, IntSize, LineCap,
    LineJoin, LinearGradient, Pattern, PathBuilder, Pixmap, RadialGradient, SpreadMode, Stroke,
    StrokeDash, Transform,
};

/// The affine part of `matrix`. Perspective is dropped with a warning.
pub fn to_transform(matrix: &Matrix) -> Transform {
    if !matrix.is_2d_affine() {
        let _ = warn_once("Raster", "perspective transforms are drawn as affine");
    }
    let [mxx, mxy, mxt, myx, myy, myt] = matrix.to_affine();
    Transform::from_row(mxx, myx, mxy, myy, mxt, myt)
}

/// Smallest factor by which `transform` scales any direction.
///
/// Spreads that are specified in local units (blur, dilation) cover at least
/// this many device pixels per unit.
pub fn min_scale(transform: &Transform) -> f32 {
    let (a, b, c, d) = (transform.sx, transform.kx, transform.ky, transform.sy);
    let sum = a.mul_add(a, b.mul_add(b, c.mul_add(c, d * d)));
    let det = a.mul_add(d, -(b * c));
    let disc = sum.mul_add(sum, -4.0 * det * det).max(0.0).sqrt();
    ((sum - disc) * 0.5).max(0.0).sqrt()
}

pub fn to_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// `color` with its alpha scaled by `alpha / 255` and, when `invert` is
/// set, its channels inverted.
pub fn modulate(color: Color, alpha: u8, invert: bool) -> Color {
    let a = u16::from(color.a) * u16::from(alpha) / 255;
    let a = u8::try_from(a).unwrap_or(u8::MAX);
    if invert {
        Color::rgba(255 - color.r, 255 - color.g, 255 - color.b, a)
    } else {
        Color::rgba(color.r, color.g, color.b, a)
    }
}

pub const fn to_blend_mode(mode: BlendMode) -> SkiaBlendMode {
    match mode {
        BlendMode::Clear => SkiaBlendMode::Clear,
        BlendMode::Src => SkiaBlendMode::Source,
        BlendMode::Dst => SkiaBlendMode::Destination,
        BlendMode::SrcOver => SkiaBlendMode::SourceOver,
        BlendMode::DstOver => SkiaBlendMode::DestinationOver,
        BlendMode::SrcIn => SkiaBlendMode::SourceIn,
        BlendMode::DstIn => SkiaBlendMode::DestinationIn,
        BlendMode::SrcOut => SkiaBlendMode::SourceOut,
        BlendMode::DstOut => SkiaBlendMode::DestinationOut,
        BlendMode::SrcATop => SkiaBlendMode::SourceAtop,
        BlendMode::DstATop => SkiaBlendMode::DestinationAtop,
        BlendMode::Xor => SkiaBlendMode::Xor,
        BlendMode::Plus => SkiaBlendMode::Plus,
        BlendMode::Modulate => SkiaBlendMode::Modulate,
        BlendMode::Screen => SkiaBlendMode::Screen,
        BlendMode::Overlay => SkiaBlendMode::Overlay,
        BlendMode::Darken => SkiaBlendMode::Darken,
        BlendMode::Lighten => SkiaBlendMode::Lighten,
        BlendMode::ColorDodge => SkiaBlendMode::ColorDodge,
        BlendMode::ColorBurn => SkiaBlendMode::ColorBurn,
        BlendMode::HardLight => SkiaBlendMode::HardLight,
        BlendMode::SoftLight => SkiaBlendMode::SoftLight,
        BlendMode::Difference => SkiaBlendMode::Difference,
        BlendMode::Exclusion => SkiaBlendMode::Exclusion,
        BlendMode::Multiply => SkiaBlendMode::Multiply,
        BlendMode::Hue => SkiaBlendMode::Hue,
        BlendMode::Saturation => SkiaBlendMode::Saturation,
        BlendMode::Color => SkiaBlendMode::Color,
        BlendMode::Luminosity => SkiaBlendMode::Luminosity,
    }
}

pub const fn to_quality(sampling: ImageSampling) -> FilterQuality {
    match sampling {
        ImageSampling::Nearest => FilterQuality::Nearest,
        ImageSampling::Linear | ImageSampling::MipmapLinear => FilterQuality::Bilinear,
        ImageSampling::Cubic => FilterQuality::Bicubic,
    }
}

/// tiny-skia has no decal spread; clamping is the closest match.
const fn to_spread(tile_mode: TileMode) -> SpreadMode {
    match tile_mode {
        TileMode::Clamp | TileMode::Decal => SpreadMode::Pad,
        TileMode::Repeat => SpreadMode::Repeat,
        TileMode::Mirror => SpreadMode::Reflect,
    }
}

pub const fn to_fill_rule(fill_type: FillType) -> FillRule {
    match fill_type {
        FillType::Winding => FillRule::Winding,
        FillType::EvenOdd => FillRule::EvenOdd,
    }
}

pub fn to_rect(rect: &Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(rect.left, rect.top, rect.right, rect.bottom)
}

pub fn to_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for verb in path.verbs() {
        match *verb {
            PathVerb::MoveTo(p) => pb.move_to(p.x, p.y),
            PathVerb::LineTo(p) => pb.line_to(p.x, p.y),
            PathVerb::QuadTo(c, p) => pb.quad_to(c.x, c.y, p.x, p.y),
            PathVerb::CubicTo(c1, c2, p) => pb.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathVerb::Close => pb.close(),
        }
    }
    pb.finish()
}

pub fn rect_path(rect: &Rect) -> Option<tiny_skia::Path> {
    to_rect(rect).map(PathBuilder::from_rect)
}

pub fn oval_path(bounds: &Rect) -> Option<tiny_skia::Path> {
    to_path(&Path::from_oval(bounds))
}

pub fn rrect_path(rrect: &RRect) -> Option<tiny_skia::Path> {
    to_path(&Path::from_rrect(rrect))
}

/// Both contours of a rounded-rect ring, for even-odd filling.
pub fn drrect_path(outer: &RRect, inner: &RRect) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.push_path(&rrect_path(outer)?);
    pb.push_path(&rrect_path(inner)?);
    pb.finish()
}

/// An elliptical arc inscribed in `bounds`. Angles are clockwise from the
/// positive x axis; a full sweep draws the whole oval.
pub fn arc_path(
    bounds: &Rect,
    start_degrees: f32,
    sweep_degrees: f32,
    use_center: bool,
) -> Option<tiny_skia::Path> {
    if sweep_degrees.abs() >= 360.0 {
        return oval_path(bounds);
    }
    let center = bounds.center();
    let (rx, ry) = (bounds.width() * 0.5, bounds.height() * 0.5);
    let at = |degrees: f32| {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(rx.mul_add(cos, center.x), ry.mul_add(sin, center.y))
    };

    let mut pb = PathBuilder::new();
    let start = at(start_degrees);
    if use_center {
        pb.move_to(center.x, center.y);
        pb.line_to(start.x, start.y);
    } else {
        pb.move_to(start.x, start.y);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let segments = (sweep_degrees.abs() / 90.0).ceil().max(1.0) as u32;
    #[allow(clippy::cast_precision_loss)]
    let step = sweep_degrees / segments as f32;
    let handle = 4.0 / 3.0 * (step.to_radians() / 4.0).tan();
    let mut angle = start_degrees;
    for _ in 0..segments {
        let (s0, c0) = angle.to_radians().sin_cos();
        let (s1, c1) = (angle + step).to_radians().sin_cos();
        let p0 = at(angle);
        let p1 = at(angle + step);
        pb.cubic_to(
            p0.x - handle * rx * s0,
            p0.y + handle * ry * c0,
            p1.x + handle * rx * s1,
            p1.y - handle * ry * c1,
            p1.x,
            p1.y,
        );
        angle += step;
    }
    if use_center {
        pb.close();
    }
    pb.finish()
}

/// Stroke parameters of `paint`. Zero width strokes are hairlines.
pub fn to_stroke(paint: &Paint) -> Stroke {
    let dash = match paint.path_effect.as_deref() {
        Some(PathEffect::Dash { intervals, phase }) => {
            StrokeDash::new(intervals.clone(), *phase).or_else(|| {
                let _ = warn_once("Raster", "invalid dash intervals ignored");
                None
            })
        }
        Some(PathEffect::Corner { .. }) => {
            let _ = warn_once("Raster", "corner path effects are not supported");
            None
        }
        None => None,
    };
    Stroke {
        width: paint.stroke_width.max(0.0),
        miter_limit: paint.stroke_miter,
        line_cap: match paint.stroke_cap {
            StrokeCap::Butt => LineCap::Butt,
            StrokeCap::Round => LineCap::Round,
            StrokeCap::Square => LineCap::Square,
        },
        line_join: match paint.stroke_join {
            StrokeJoin::Miter => LineJoin::Miter,
            StrokeJoin::Round => LineJoin::Round,
            StrokeJoin::Bevel => LineJoin::Bevel,
        },
        dash,
    }
}

/// Premultiplied copy of `image`.
pub fn image_pixmap(image: &Image) -> Option<Pixmap> {
    let data = image
        .rgba_data()
        .chunks_exact(4)
        .flat_map(|px| {
            let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Pixmap::from_vec(data, IntSize::from_wh(image.width(), image.height())?)
}

/// Pixels a paint's shader samples, converted ahead of building the
/// tiny-skia paint that borrows them.
pub fn shader_pixmap(paint: &Paint) -> Option<Pixmap> {
    match paint.shader.as_deref() {
        Some(Shader::Image { image, .. }) => image_pixmap(image),
        _ => None,
    }
}

/// The tiny-skia paint for `paint`'s color source and blend mode.
/// `pixmap` must come from [`shader_pixmap`] for the same paint.
pub fn to_paint<'a>(paint: &Paint, pixmap: Option<&'a Pixmap>) -> tiny_skia::Paint<'a> {
    let alpha = paint.color.a;
    let invert = paint.invert_colors;
    let solid = || tiny_skia::Shader::SolidColor(to_color(modulate(paint.color, 255, invert)));
    let stops = |stops: &[tessera_display_list::GradientStop]| -> Vec<GradientStop> {
        stops
            .iter()
            .map(|s| GradientStop::new(s.offset, to_color(modulate(s.color, alpha, invert))))
            .collect()
    };

    let shader = match paint.shader.as_deref() {
        None => solid(),
        Some(Shader::Color(color)) => {
            tiny_skia::Shader::SolidColor(to_color(modulate(*color, alpha, invert)))
        }
        Some(Shader::LinearGradient {
            start,
            end,
            stops: s,
            tile_mode,
        }) => LinearGradient::new(
            tiny_skia::Point::from_xy(start.x, start.y),
            tiny_skia::Point::from_xy(end.x, end.y),
            stops(s),
            to_spread(*tile_mode),
            Transform::identity(),
        )
        .unwrap_or_else(solid),
        Some(Shader::RadialGradient {
            center,
            radius,
            stops: s,
            tile_mode,
        }) => {
            let c = tiny_skia::Point::from_xy(center.x, center.y);
            RadialGradient::new(c, c, *radius, stops(s), to_spread(*tile_mode), Transform::identity())
                .unwrap_or_else(solid)
        }
        Some(Shader::Image {
            tile_x,
            sampling,
            matrix,
            ..
        }) => match pixmap {
            Some(pixmap) => Pattern::new(
                pixmap.as_ref(),
                to_spread(*tile_x),
                to_quality(*sampling),
                f32::from(alpha) / 255.0,
                to_transform(matrix),
            ),
            None => solid(),
        },
    };

    tiny_skia::Paint {
        shader,
        blend_mode: to_blend_mode(paint.blend_mode),
        anti_alias: paint.anti_alias,
        ..tiny_skia::Paint::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matches_matrix_mapping() {
        let matrix = Matrix::translate(10.0, 5.0).concat(&Matrix::scale(2.0, 3.0));
        let transform = to_transform(&matrix);
        let mut points = [tiny_skia::Point::from_xy(1.0, 1.0)];
        transform.map_points(&mut points);
        let expected = matrix.map_point(Point::new(1.0, 1.0)).unwrap();
        assert_eq!((points[0].x, points[0].y), (expected.x, expected.y));
    }

    #[test]
    fn test_min_scale() {
        let scale = min_scale(&Transform::from_scale(2.0, 0.5));
        assert!((scale - 0.5).abs() < 1e-5);
        let rotated = to_transform(&Matrix::rotate(30.0).concat(&Matrix::scale(3.0, 3.0)));
        assert!((min_scale(&rotated) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_modulate_alpha_and_invert() {
        let c = modulate(Color::rgba(10, 20, 30, 255), 128, true);
        assert_eq!(c, Color::rgba(245, 235, 225, 128));
    }

    #[test]
    fn test_arc_path_stays_in_bounds() {
        let bounds = Rect::from_ltrb(0.0, 0.0, 40.0, 20.0);
        let path = arc_path(&bounds, 0.0, 180.0, true).unwrap();
        let b = path.bounds();
        assert!(b.left() >= -0.01 && b.top() >= -0.01);
        assert!(b.right() <= 40.01 && b.bottom() <= 20.01);
    }

    #[test]
    fn test_image_pixmap_premultiplies() {
        let image = Image::solid(2, 2, [255, 0, 0, 128]).unwrap();
        let pixmap = image_pixmap(&image).unwrap();
        assert_eq!(&pixmap.data()[..4], &[128, 0, 0, 128]);
    }
}
