//! The playback interface.

use std::sync::Arc;

use tessera_common::Image;

use crate::color::{BlendMode, Color};
use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ImageFilter, MaskFilter, PathEffect, Shader};
use crate::geometry::{IRect, Matrix, Point, RRect, RSTransform, Rect};
use crate::paint::{
    ClipOp, DrawStyle, ImageSampling, PointMode, SrcRectConstraint, StrokeCap, StrokeJoin,
};
use crate::path::Path;
use crate::resource::{TextBlob, Vertices};

/// Consumer of display list playback.
///
/// There is one method per logical operation rather than per record kind:
/// a rounded rect recorded as a plain rect arrives through
/// [`Dispatcher::draw_rect`], and a path clip recorded as a rect clip
/// arrives through [`Dispatcher::clip_rect`].
///
/// Paint attributes are set by their own calls and stay in effect until
/// changed; they are not affected by `save`/`restore`. Draw calls use the
/// current attributes. Calls that take `with_attributes` use only the
/// alpha, blend mode and filters of the current attributes when it is
/// true, and ignore them otherwise.
///
/// Resources arrive as `&Arc<T>` so an implementation may keep them.
pub trait Dispatcher {
    /// Set anti-aliasing of edges.
    fn set_anti_alias(&mut self, anti_alias: bool);
    /// Set dithering of gradients.
    fn set_dither(&mut self, dither: bool);
    /// Set inversion of output colors.
    fn set_invert_colors(&mut self, invert: bool);
    /// Set the end cap of open stroked contours.
    fn set_stroke_cap(&mut self, cap: StrokeCap);
    /// Set the corner join of strokes.
    fn set_stroke_join(&mut self, join: StrokeJoin);
    /// Set whether geometry is filled, stroked, or both.
    fn set_draw_style(&mut self, style: DrawStyle);
    /// Set the stroke width. Zero draws hairlines.
    fn set_stroke_width(&mut self, width: f32);
    /// Set the miter limit.
    fn set_stroke_miter(&mut self, limit: f32);
    /// Set the solid color.
    fn set_color(&mut self, color: Color);
    /// Set the blend mode.
    fn set_blend_mode(&mut self, mode: BlendMode);
    /// Set or clear the shader.
    fn set_shader(&mut self, shader: Option<&Arc<Shader>>);
    /// Set or clear the color filter.
    fn set_color_filter(&mut self, filter: Option<&Arc<ColorFilter>>);
    /// Set or clear the image filter.
    fn set_image_filter(&mut self, filter: Option<&Arc<ImageFilter>>);
    /// Set or clear the path effect.
    fn set_path_effect(&mut self, effect: Option<&Arc<PathEffect>>);
    /// Set or clear the mask filter.
    fn set_mask_filter(&mut self, filter: Option<&Arc<MaskFilter>>);

    /// Push the matrix and clip.
    fn save(&mut self);
    /// Push the matrix and clip and begin an offscreen layer, optionally
    /// limited to `bounds` and seeded with the filtered backdrop.
    fn save_layer(
        &mut self,
        bounds: Option<&Rect>,
        with_attributes: bool,
        backdrop: Option<&Arc<ImageFilter>>,
    );
    /// Pop the matrix and clip, compositing a layer begun by the matching
    /// save.
    fn restore(&mut self);

    /// Translate the matrix.
    fn translate(&mut self, tx: f32, ty: f32);
    /// Scale the matrix.
    fn scale(&mut self, sx: f32, sy: f32);
    /// Rotate the matrix clockwise by `degrees`.
    fn rotate(&mut self, degrees: f32);
    /// Skew the matrix.
    fn skew(&mut self, sx: f32, sy: f32);
    /// Concatenate a 2D affine matrix.
    fn transform_2d_affine(&mut self, mxx: f32, mxy: f32, mxt: f32, myx: f32, myy: f32, myt: f32);
    /// Concatenate a full 4x4 matrix.
    fn transform_full_perspective(&mut self, matrix: &Matrix);
    /// Replace the matrix with the identity.
    fn transform_reset(&mut self);

    /// Combine the clip with a rect.
    fn clip_rect(&mut self, rect: &Rect, op: ClipOp, anti_alias: bool);
    /// Combine the clip with an oval.
    fn clip_oval(&mut self, bounds: &Rect, op: ClipOp, anti_alias: bool);
    /// Combine the clip with a rounded rect.
    fn clip_rrect(&mut self, rrect: &RRect, op: ClipOp, anti_alias: bool);
    /// Combine the clip with a path.
    fn clip_path(&mut self, path: &Arc<Path>, op: ClipOp, anti_alias: bool);

    /// Fill the clip with the current attributes.
    fn draw_paint(&mut self);
    /// Fill the clip with a color, ignoring the current attributes.
    fn draw_color(&mut self, color: Color, mode: BlendMode);
    /// Draw a line segment.
    fn draw_line(&mut self, p0: Point, p1: Point);
    /// Draw a rect.
    fn draw_rect(&mut self, rect: &Rect);
    /// Draw an oval inscribed in `bounds`.
    fn draw_oval(&mut self, bounds: &Rect);
    /// Draw a circle.
    fn draw_circle(&mut self, center: Point, radius: f32);
    /// Draw a rounded rect.
    fn draw_rrect(&mut self, rrect: &RRect);
    /// Draw the area inside `outer` and outside `inner`.
    fn draw_drrect(&mut self, outer: &RRect, inner: &RRect);
    /// Draw a path.
    fn draw_path(&mut self, path: &Arc<Path>);
    /// Draw an arc of the oval in `bounds`. Angles are in degrees,
    /// clockwise from the positive x axis.
    fn draw_arc(&mut self, bounds: &Rect, start_degrees: f32, sweep_degrees: f32, use_center: bool);
    /// Draw points, segments or a polyline.
    fn draw_points(&mut self, mode: PointMode, points: &[Point]);
    /// Draw a triangle mesh.
    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode);
    /// Draw an image with its top-left corner at `top_left`.
    fn draw_image(
        &mut self,
        image: &Arc<Image>,
        top_left: Point,
        sampling: ImageSampling,
        with_attributes: bool,
    );
    /// Draw the `src` part of an image into `dst`.
    fn draw_image_rect(
        &mut self,
        image: &Arc<Image>,
        src: &Rect,
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
        constraint: SrcRectConstraint,
    );
    /// Draw an image as a nine-patch: corners unscaled, edges stretched in
    /// one direction and `center` stretched in both.
    fn draw_image_nine(
        &mut self,
        image: &Arc<Image>,
        center: &IRect,
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    );
    /// Draw an image split along x and y dividers; even-indexed columns and
    /// rows are fixed size and odd-indexed ones stretch.
    fn draw_image_lattice(
        &mut self,
        image: &Arc<Image>,
        x_divs: &[i32],
        y_divs: &[i32],
        src: &IRect,
        dst: &Rect,
        sampling: ImageSampling,
        with_attributes: bool,
    );
    /// Draw sprites from an atlas. `colors` is empty or has one entry per
    /// sprite, blended with the sprite using `mode`.
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
    );
    /// Draw a recorded picture, optionally under an extra matrix.
    fn draw_picture(
        &mut self,
        picture: &Arc<DisplayList>,
        matrix: Option<&Matrix>,
        with_attributes: bool,
    );
    /// Draw a nested display list. It starts from default attributes.
    fn draw_display_list(&mut self, list: &Arc<DisplayList>);
    /// Draw a text blob with its origin at `(x, y)`.
    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f32, y: f32);
    /// Draw the shadow `path` casts at `elevation`.
    fn draw_shadow(
        &mut self,
        path: &Arc<Path>,
        color: Color,
        elevation: f32,
        transparent_occluder: bool,
        device_pixel_ratio: f32,
    );
}
