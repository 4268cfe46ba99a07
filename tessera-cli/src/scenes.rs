//! Built-in scenes for the command line.

use std::sync::Arc;

use anyhow::{Context, Result};
use tessera_display_list::{
    BlendMode, BlurStyle, ClipOp, Color, Dispatcher, DisplayList, DisplayListBuilder, DrawStyle,
    GradientStop, IRect, Image, ImageFilter, ImageSampling, MaskFilter, Matrix, Path, PathEffect,
    Point, PointMode, RRect, RSTransform, Rect, Shader, SrcRectConstraint, StrokeCap, StrokeJoin,
    TextBlob, TileMode, VertexMode, Vertices,
};

/// Logical size every scene is recorded for.
pub const SCENE_WIDTH: f32 = 400.0;
/// Logical size every scene is recorded for.
pub const SCENE_HEIGHT: f32 = 300.0;

/// A named scene recorder.
pub struct Scene {
    /// Name used on the command line.
    pub name: &'static str,
    /// One-line description for `scenes`.
    pub description: &'static str,
    record: fn() -> Result<DisplayList>,
}

impl Scene {
    /// Record the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource the scene needs cannot be created.
    pub fn build(&self) -> Result<DisplayList> {
        (self.record)()
    }
}

/// Every built-in scene, in listing order.
pub const SCENES: &[Scene] = &[
    Scene {
        name: "clipped-rects",
        description: "a rect drawn twice, once under a clip",
        record: clipped_rects,
    },
    Scene {
        name: "shapes",
        description: "strokes, dashes, arcs, points and paths",
        record: shapes,
    },
    Scene {
        name: "layers",
        description: "layer opacity, blend modes and filters",
        record: layers,
    },
    Scene {
        name: "images",
        description: "gradients, nine-patch, atlas sprites and vertices",
        record: images,
    },
    Scene {
        name: "nested",
        description: "a display list replayed under several transforms",
        record: nested,
    },
    Scene {
        name: "text",
        description: "text blobs and elevation shadows",
        record: text,
    },
];

/// Look up a scene by name.
pub fn find(name: &str) -> Option<&'static Scene> {
    SCENES.iter().find(|scene| scene.name == name)
}

fn builder() -> DisplayListBuilder {
    DisplayListBuilder::with_cull_rect(Rect::from_ltrb(0.0, 0.0, SCENE_WIDTH, SCENE_HEIGHT))
}

fn clipped_rects() -> Result<DisplayList> {
    let mut b = builder();
    b.set_color(Color::BLUE);
    b.draw_rect(&Rect::from_ltrb(10.0, 10.0, 50.0, 50.0));
    b.save();
    b.clip_rect(&Rect::from_ltrb(0.0, 0.0, 25.0, 25.0), ClipOp::Intersect, false);
    b.draw_rect(&Rect::from_ltrb(10.0, 10.0, 50.0, 50.0));
    b.restore();
    Ok(b.build())
}

fn shapes() -> Result<DisplayList> {
    let mut b = builder();
    b.set_anti_alias(true);

    b.set_color(Color::rgb(230, 120, 40));
    b.draw_rrect(&RRect::from_rect_xy(
        Rect::from_xywh(20.0, 20.0, 120.0, 80.0),
        16.0,
        16.0,
    ));

    b.set_draw_style(DrawStyle::Stroke);
    b.set_stroke_width(6.0);
    b.set_stroke_join(StrokeJoin::Round);
    b.set_color(Color::rgb(40, 90, 200));
    let mut zigzag = Path::new();
    let _ = zigzag
        .move_to(Point::new(170.0, 90.0))
        .line_to(Point::new(200.0, 30.0))
        .line_to(Point::new(230.0, 90.0))
        .line_to(Point::new(260.0, 30.0));
    b.draw_path(&Arc::new(zigzag));

    b.set_path_effect(Some(&Arc::new(PathEffect::Dash {
        intervals: vec![12.0, 6.0],
        phase: 0.0,
    })));
    b.set_stroke_width(3.0);
    b.draw_circle(Point::new(340.0, 60.0), 35.0);
    b.set_path_effect(None);

    b.set_stroke_cap(StrokeCap::Round);
    b.draw_arc(&Rect::from_xywh(20.0, 130.0, 100.0, 100.0), -90.0, 270.0, false);
    b.set_draw_style(DrawStyle::Fill);
    b.set_color(Color::rgb(60, 160, 90));
    b.draw_arc(&Rect::from_xywh(150.0, 130.0, 100.0, 100.0), 30.0, 120.0, true);

    b.set_color(Color::BLACK);
    b.set_stroke_width(8.0);
    let dots: Vec<Point> = (0..6u8)
        .map(|i| Point::new(f32::from(i).mul_add(20.0, 280.0), 150.0))
        .collect();
    b.draw_points(PointMode::Points, &dots);
    b.set_stroke_width(2.0);
    b.set_stroke_cap(StrokeCap::Butt);
    b.draw_points(
        PointMode::Polygon,
        &[
            Point::new(280.0, 190.0),
            Point::new(330.0, 240.0),
            Point::new(380.0, 190.0),
        ],
    );
    b.draw_line(Point::new(20.0, 270.0), Point::new(380.0, 270.0));

    b.set_color(Color::rgb(180, 40, 120));
    b.draw_drrect(
        &RRect::from_rect_xy(Rect::from_xywh(150.0, 240.0, 100.0, 50.0), 10.0, 10.0),
        &RRect::from_rect(Rect::from_xywh(165.0, 250.0, 70.0, 30.0)),
    );
    Ok(b.build())
}

fn layers() -> Result<DisplayList> {
    let mut b = builder();
    b.set_color(Color::rgb(240, 240, 220));
    b.draw_paint();

    b.set_color(Color::BLACK.with_alpha(128));
    b.save_layer(Some(&Rect::from_xywh(20.0, 20.0, 160.0, 120.0)), true, None);
    b.set_color(Color::RED);
    b.draw_circle(Point::new(80.0, 80.0), 50.0);
    b.set_color(Color::BLUE);
    b.draw_circle(Point::new(120.0, 80.0), 50.0);
    b.restore();

    b.set_image_filter(Some(&Arc::new(ImageFilter::Blur {
        sigma_x: 4.0,
        sigma_y: 4.0,
        tile_mode: TileMode::Decal,
    })));
    b.save_layer(None, true, None);
    b.set_image_filter(None);
    b.set_color(Color::rgb(20, 140, 60));
    b.draw_rect(&Rect::from_xywh(220.0, 40.0, 120.0, 80.0));
    b.restore();

    b.set_color(Color::rgb(200, 60, 200));
    b.set_blend_mode(BlendMode::Multiply);
    b.draw_rect(&Rect::from_xywh(60.0, 170.0, 140.0, 90.0));
    b.set_blend_mode(BlendMode::SrcOver);

    b.set_mask_filter(Some(&Arc::new(MaskFilter::Blur {
        style: BlurStyle::Normal,
        sigma: 5.0,
    })));
    b.set_color(Color::rgb(30, 30, 30));
    b.draw_oval(&Rect::from_xywh(240.0, 180.0, 120.0, 70.0));
    b.set_mask_filter(None);

    b.save();
    b.clip_rect(&Rect::from_xywh(250.0, 190.0, 100.0, 50.0), ClipOp::Difference, false);
    b.set_color(Color::rgb(250, 200, 0));
    b.draw_rect(&Rect::from_xywh(230.0, 170.0, 140.0, 90.0));
    b.restore();
    Ok(b.build())
}

/// A checkerboard of `cell`-pixel squares.
fn checkerboard(cells: u32, cell: u32) -> Result<Image> {
    let size = cells * cell;
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dark = (x / cell + y / cell) % 2 == 0;
            data.extend_from_slice(if dark {
                &[60, 60, 80, 255]
            } else {
                &[220, 220, 240, 255]
            });
        }
    }
    Image::new(size, size, data).context("building checkerboard image")
}

fn images() -> Result<DisplayList> {
    let mut b = builder();
    b.set_shader(Some(&Arc::new(Shader::LinearGradient {
        start: Point::new(0.0, 0.0),
        end: Point::new(SCENE_WIDTH, 0.0),
        stops: vec![
            GradientStop::new(0.0, Color::rgb(255, 180, 0)),
            GradientStop::new(1.0, Color::rgb(200, 0, 120)),
        ],
        tile_mode: TileMode::Clamp,
    })));
    b.draw_rect(&Rect::from_xywh(0.0, 0.0, SCENE_WIDTH, 60.0));
    b.set_shader(Some(&Arc::new(Shader::RadialGradient {
        center: Point::new(340.0, 130.0),
        radius: 50.0,
        stops: vec![
            GradientStop::new(0.0, Color::WHITE),
            GradientStop::new(1.0, Color::rgb(0, 80, 160)),
        ],
        tile_mode: TileMode::Clamp,
    })));
    b.draw_circle(Point::new(340.0, 130.0), 50.0);
    b.set_shader(None);

    let board = Arc::new(checkerboard(4, 8)?);
    b.draw_image(&board, Point::new(20.0, 80.0), ImageSampling::Nearest, false);
    b.draw_image_rect(
        &board,
        &Rect::from_xywh(0.0, 0.0, 16.0, 16.0),
        &Rect::from_xywh(80.0, 80.0, 64.0, 64.0),
        ImageSampling::Nearest,
        false,
        SrcRectConstraint::Strict,
    );
    b.draw_image_nine(
        &board,
        &IRect::from_ltrb(8, 8, 24, 24),
        &Rect::from_xywh(160.0, 80.0, 120.0, 60.0),
        ImageSampling::Linear,
        false,
    );

    let sprites: Vec<RSTransform> = (0..4u8)
        .map(|i| {
            let angle = f32::from(i) * 0.4;
            RSTransform::new(
                angle.cos(),
                angle.sin(),
                f32::from(i).mul_add(50.0, 30.0),
                180.0,
            )
        })
        .collect();
    let texture = vec![Rect::from_xywh(0.0, 0.0, 16.0, 16.0); sprites.len()];
    b.draw_atlas(
        &board,
        &sprites,
        &texture,
        &[],
        BlendMode::Modulate,
        ImageSampling::Nearest,
        None,
        false,
    );

    let mesh = Vertices::new(
        VertexMode::TriangleFan,
        vec![
            Point::new(300.0, 220.0),
            Point::new(260.0, 280.0),
            Point::new(340.0, 280.0),
            Point::new(380.0, 230.0),
        ],
        None,
        Some(vec![Color::RED, Color::GREEN, Color::BLUE, Color::WHITE]),
        None,
    );
    b.draw_vertices(&Arc::new(mesh), BlendMode::Modulate);
    Ok(b.build())
}

fn nested() -> Result<DisplayList> {
    let mut tile = DisplayListBuilder::with_cull_rect(Rect::from_xywh(0.0, 0.0, 60.0, 60.0));
    tile.set_anti_alias(true);
    tile.set_color(Color::rgb(90, 60, 200));
    tile.draw_rrect(&RRect::from_rect_xy(
        Rect::from_xywh(0.0, 0.0, 60.0, 60.0),
        12.0,
        12.0,
    ));
    tile.set_color(Color::WHITE);
    tile.draw_circle(Point::new(30.0, 30.0), 14.0);
    let tile = Arc::new(tile.build());

    let mut b = builder();
    for row in 0..3u8 {
        for column in 0..5u8 {
            b.save();
            b.translate(
                f32::from(column).mul_add(75.0, 20.0),
                f32::from(row).mul_add(90.0, 20.0),
            );
            if (row + column) % 2 == 1 {
                b.transform(&Matrix::rotate(8.0));
            }
            b.draw_display_list(&tile);
            b.restore();
        }
    }
    Ok(b.build())
}

fn text() -> Result<DisplayList> {
    let mut b = builder();
    b.set_color(Color::rgb(245, 245, 245));
    b.draw_paint();

    let card = Path::from_rrect(&RRect::from_rect_xy(
        Rect::from_xywh(40.0, 40.0, 320.0, 140.0),
        12.0,
        12.0,
    ));
    b.draw_shadow(&Arc::new(card.clone()), Color::BLACK.with_alpha(90), 8.0, false, 1.0);
    b.set_color(Color::WHITE);
    b.draw_path(&Arc::new(card));

    b.set_anti_alias(true);
    b.set_color(Color::rgb(30, 30, 40));
    b.draw_text_blob(&Arc::new(TextBlob::new("Tessera", 40.0)), 60.0, 100.0);
    b.set_color(Color::rgb(110, 110, 120));
    b.draw_text_blob(
        &Arc::new(TextBlob::new("display lists, recorded once", 18.0)),
        60.0,
        140.0,
    );
    Ok(b.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_names_are_unique() {
        for (i, scene) in SCENES.iter().enumerate() {
            assert!(SCENES[i + 1..].iter().all(|other| other.name != scene.name));
        }
    }

    #[test]
    fn test_every_scene_records_balanced_ops() {
        for scene in SCENES {
            let list = scene.build().unwrap();
            assert!(list.op_count() > 0, "{} is empty", scene.name);
            let saves = list
                .kinds()
                .filter(|k| k.to_string().starts_with("Save"))
                .count();
            let restores = list.kinds().filter(|k| k.to_string() == "Restore").count();
            assert_eq!(saves, restores, "{} is unbalanced", scene.name);
        }
    }

    #[test]
    fn test_clipped_rects_scene() {
        let list = find("clipped-rects").unwrap().build().unwrap();
        assert_eq!(list.op_count(), 6);
        assert_eq!(list.bounds(), Rect::from_ltrb(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_nested_scene_counts_inner_ops() {
        let list = find("nested").unwrap().build().unwrap();
        assert!(list.op_count_nested() > list.op_count());
    }

    #[test]
    fn test_unknown_scene() {
        assert!(find("missing").is_none());
    }
}
