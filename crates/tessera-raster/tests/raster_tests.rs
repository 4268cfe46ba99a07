//! Integration tests for the tiny-skia backend.

use std::env;
use std::sync::Arc;

use tessera_display_list::{
    BlendMode, BlurStyle, ClipOp, Color, Dispatcher, DisplayList, DisplayListBuilder, DrawStyle,
    ImageFilter, MaskFilter, Path, Point, PointMode, Rect, StrokeJoin, TextBlob, TileMode,
};
use tessera_raster::{
    PixmapCanvas, RasterError, RasterOptions, render_display_list, save_png, to_rgba_image,
};
use tiny_skia::Pixmap;

const SIZE: u32 = 100;

fn options() -> RasterOptions {
    RasterOptions {
        font_paths: Vec::new(),
        ..RasterOptions::new(SIZE, SIZE)
    }
}

fn surface() -> Rect {
    Rect::from_ltrb(0.0, 0.0, 100.0, 100.0)
}

fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
    let p = pixmap.pixel(x, y).unwrap().demultiply();
    [p.red(), p.green(), p.blue(), p.alpha()]
}

fn render(list: &DisplayList) -> Pixmap {
    render_display_list(list, &options()).unwrap()
}

/// Pixels a list paints onto a transparent surface must lie inside its
/// rounded-out bounds.
fn assert_bounds_cover_pixels(list: &DisplayList) {
    assert_bounds_cover_pixels_with(list, options());
}

fn assert_bounds_cover_pixels_with(list: &DisplayList, options: RasterOptions) {
    let transparent = options.with_background(Color::TRANSPARENT);
    let pixmap = render_display_list(list, &transparent).unwrap();
    let bounds = list.bounds().round_out();
    for y in 0..SIZE {
        for x in 0..SIZE {
            if pixmap.pixel(x, y).unwrap().alpha() == 0 {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let (fx, fy) = (x as f32, y as f32);
            assert!(
                fx >= bounds.left && fx < bounds.right && fy >= bounds.top && fy < bounds.bottom,
                "pixel ({x}, {y}) outside bounds {bounds:?}"
            );
        }
    }
}

fn scenario() -> DisplayList {
    let mut builder = DisplayListBuilder::with_cull_rect(surface());
    builder.set_color(Color::BLUE);
    builder.draw_rect(&Rect::from_ltrb(10.0, 10.0, 50.0, 50.0));
    builder.save();
    builder.clip_rect(&Rect::from_ltrb(0.0, 0.0, 25.0, 25.0), ClipOp::Intersect, false);
    builder.draw_rect(&Rect::from_ltrb(10.0, 10.0, 50.0, 50.0));
    builder.restore();
    builder.build()
}

#[test]
fn test_scenario_pixels() {
    let pixmap = render(&scenario());
    assert_eq!(pixel(&pixmap, 30, 30), [0, 0, 255, 255]);
    assert_eq!(pixel(&pixmap, 5, 5), [255, 255, 255, 255]);
    assert_eq!(pixel(&pixmap, 60, 60), [255, 255, 255, 255]);
}

#[test]
fn test_bounds_cover_scenario() {
    assert_bounds_cover_pixels(&scenario());
}

#[test]
fn test_bounds_cover_mitered_stroke() {
    let mut builder = DisplayListBuilder::with_cull_rect(surface());
    builder.set_draw_style(DrawStyle::Stroke);
    builder.set_stroke_width(8.0);
    builder.set_stroke_join(StrokeJoin::Miter);
    let mut path = Path::new();
    let _ = path
        .move_to(Point::new(20.0, 70.0))
        .line_to(Point::new(50.0, 30.0))
        .line_to(Point::new(80.0, 70.0));
    builder.draw_path(&Arc::new(path));
    assert_bounds_cover_pixels(&builder.build());
}

#[test]
fn test_bounds_cover_rotated_anti_aliased_oval() {
    let mut builder = DisplayListBuilder::with_cull_rect(surface());
    builder.set_anti_alias(true);
    builder.translate(50.0, 50.0);
    builder.rotate(30.0);
    builder.draw_oval(&Rect::from_ltrb(-30.0, -10.0, 30.0, 10.0));
    assert_bounds_cover_pixels(&builder.build());
}

#[test]
fn test_bounds_cover_blurred_layer() {
    let mut builder = DisplayListBuilder::with_cull_rect(surface());
    builder.set_image_filter(Some(&Arc::new(ImageFilter::Blur {
        sigma_x: 3.0,
        sigma_y: 2.0,
        tile_mode: TileMode::Decal,
    })));
    builder.save_layer(None, true, None);
    builder.set_image_filter(None);
    builder.draw_rect(&Rect::from_ltrb(30.0, 30.0, 60.0, 50.0));
    builder.restore();
    assert_bounds_cover_pixels(&builder.build());
}

#[test]
fn test_bounds_cover_mask_blur_and_points() {
    let mut builder = DisplayListBuilder::with_cull_rect(surface());
    builder.set_mask_filter(Some(&Arc::new(MaskFilter::Blur {
        style: BlurStyle::Normal,
        sigma: 2.0,
    })));
    builder.draw_circle(Point::new(40.0, 40.0), 10.0);
    builder.set_mask_filter(None);
    builder.set_stroke_width(4.0);
    builder.draw_points(
        PointMode::Points,
        &[Point::new(70.0, 20.0), Point::new(80.0, 80.0)],
    );
    builder.draw_line(Point::new(10.0, 90.0), Point::new(60.0, 85.0));
    assert_bounds_cover_pixels(&builder.build());
}

#[test]
fn test_bounds_cover_arc_and_shadow() {
    let mut builder = DisplayListBuilder::with_cull_rect(surface());
    builder.draw_arc(&Rect::from_ltrb(10.0, 10.0, 50.0, 50.0), 45.0, 200.0, true);
    let occluder = Path::from_rect(&Rect::from_ltrb(55.0, 55.0, 80.0, 80.0));
    builder.draw_shadow(&Arc::new(occluder), Color::BLACK, 4.0, false, 1.0);
    assert_bounds_cover_pixels(&builder.build());
}

/// Descenders, negative side bearings and stacked accents all reach past a
/// plain em box. Uses the system font list; without a font nothing is drawn.
#[test]
fn test_bounds_cover_text_with_descenders_and_accents() {
    for (x, y) in [(8.0, 60.0), (8.5, 60.3)] {
        let mut builder = DisplayListBuilder::with_cull_rect(surface());
        builder.set_color(Color::BLACK);
        builder.draw_text_blob(&Arc::new(TextBlob::new("j\u{29d}\u{1eaa}g", 24.0)), x, y);
        assert_bounds_cover_pixels_with(&builder.build(), RasterOptions::new(SIZE, SIZE));
    }
}

#[test]
fn test_difference_clip_cuts_hole() {
    let mut builder = DisplayListBuilder::with_cull_rect(surface());
    builder.clip_rect(&Rect::from_ltrb(40.0, 40.0, 60.0, 60.0), ClipOp::Difference, false);
    builder.draw_color(Color::RED, BlendMode::SrcOver);
    let pixmap = render(&builder.build());
    assert_eq!(pixel(&pixmap, 50, 50), [255, 255, 255, 255]);
    assert_eq!(pixel(&pixmap, 10, 10), [255, 0, 0, 255]);
}

#[test]
fn test_layer_opacity() {
    let mut builder = DisplayListBuilder::with_cull_rect(surface());
    builder.set_color(Color::BLACK.with_alpha(128));
    builder.save_layer(None, true, None);
    builder.set_color(Color::BLACK);
    builder.draw_rect(&Rect::from_ltrb(0.0, 0.0, 50.0, 50.0));
    builder.restore();
    let pixmap = render(&builder.build());
    let [r, g, b, a] = pixel(&pixmap, 25, 25);
    assert_eq!(a, 255);
    assert!(r.abs_diff(127) <= 2 && r == g && g == b);
    assert_eq!(pixel(&pixmap, 75, 75), [255, 255, 255, 255]);
}

#[test]
fn test_nested_list_renders_from_default_attributes() {
    let mut inner = DisplayListBuilder::with_cull_rect(surface());
    inner.draw_rect(&Rect::from_ltrb(0.0, 0.0, 10.0, 10.0));
    let inner = Arc::new(inner.build());

    let mut outer = DisplayListBuilder::with_cull_rect(surface());
    outer.set_color(Color::RED);
    outer.translate(20.0, 20.0);
    outer.draw_display_list(&inner);
    let pixmap = render(&outer.build());
    assert_eq!(pixel(&pixmap, 25, 25), [0, 0, 0, 255]);
    assert_eq!(pixel(&pixmap, 5, 5), [255, 255, 255, 255]);
}

#[test]
fn test_save_png_round_trips_pixels() {
    let pixmap = render(&scenario());
    let path = env::temp_dir().join(format!("tessera-raster-{}.png", std::process::id()));
    save_png(&pixmap, &path).unwrap();
    let decoded = image::open(&path).unwrap().to_rgba8();
    let _ = std::fs::remove_file(&path);
    assert_eq!(decoded, to_rgba_image(&pixmap));
}

#[test]
fn test_save_to_missing_directory_fails() {
    let pixmap = render(&scenario());
    let path = env::temp_dir().join("tessera-missing-dir").join("out.png");
    assert!(matches!(
        save_png(&pixmap, &path),
        Err(RasterError::Save { .. })
    ));
}

#[test]
fn test_zero_size_surface() {
    let result = render_display_list(&scenario(), &RasterOptions::new(10, 0));
    assert!(matches!(
        result,
        Err(RasterError::InvalidSurfaceSize {
            width: 10,
            height: 0
        })
    ));
}

#[test]
fn test_into_pixmap_closes_open_layers() {
    use tessera_display_list::{Canvas, Paint};

    let mut canvas = PixmapCanvas::new(&options()).unwrap();
    canvas.save_layer(None, None, None);
    canvas.draw_rect(
        &Rect::from_ltrb(0.0, 0.0, 10.0, 10.0),
        &Paint::with_color(Color::GREEN),
    );
    assert_eq!(canvas.save_depth(), 1);
    let pixmap = canvas.into_pixmap();
    assert_eq!(pixel(&pixmap, 5, 5), [0, 255, 0, 255]);
}
