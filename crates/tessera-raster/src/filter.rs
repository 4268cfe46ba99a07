//! Pixel filters applied to offscreen layers.
//!
//! All filters work in device space on premultiplied pixels. Spreads given
//! in local units are scaled by the smallest scale of the layer transform,
//! and never reach further than three local standard deviations (blur) or
//! one radius (morphology).

use tessera_common::warn_once;
use tessera_display_list::{ColorFilter, ImageFilter};
use tiny_skia::{ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::convert::{min_scale, to_blend_mode, to_color, to_quality, to_transform};

/// Radius in whole pixels of a local-unit spread under `transform`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn device_radius(local: f32, transform: &Transform) -> usize {
    let radius = (local.abs() * min_scale(transform)).floor();
    if radius.is_finite() { radius as usize } else { 0 }
}

/// One box-filter pass along rows (`horizontal`) or columns. Pixels outside
/// the surface count as transparent.
fn box_pass(pixmap: &mut Pixmap, radius: usize, horizontal: bool) {
    if radius == 0 {
        return;
    }
    let (width, height) = (pixmap.width() as usize, pixmap.height() as usize);
    let (lines, length) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };
    let index = |line: usize, i: usize| {
        if horizontal {
            (line * width + i) * 4
        } else {
            (i * width + line) * 4
        }
    };
    let window = u32::try_from(radius * 2 + 1).unwrap_or(u32::MAX);
    let data = pixmap.data_mut();
    let mut source = vec![[0_u8; 4]; length];
    for line in 0..lines {
        for (i, px) in source.iter_mut().enumerate() {
            let at = index(line, i);
            px.copy_from_slice(&data[at..at + 4]);
        }
        let mut sum = [0_u32; 4];
        for px in source.iter().take(radius.min(length)) {
            for c in 0..4 {
                sum[c] += u32::from(px[c]);
            }
        }
        for i in 0..length {
            if let Some(entering) = source.get(i + radius) {
                for c in 0..4 {
                    sum[c] += u32::from(entering[c]);
                }
            }
            let at = index(line, i);
            for c in 0..4 {
                data[at + c] = u8::try_from(sum[c] / window).unwrap_or(u8::MAX);
            }
            if let Some(leaving) = i.checked_sub(radius).and_then(|j| source.get(j)) {
                for c in 0..4 {
                    sum[c] -= u32::from(leaving[c]);
                }
            }
        }
    }
}

/// Approximate a gaussian blur with three box passes per axis.
pub fn blur(pixmap: &mut Pixmap, radius_x: usize, radius_y: usize) {
    for _ in 0..3 {
        box_pass(pixmap, radius_x, true);
        box_pass(pixmap, radius_y, false);
    }
}

/// Per-channel maximum (`dilate`) or minimum over a rectangular window.
fn morphology(pixmap: &mut Pixmap, radius_x: usize, radius_y: usize, dilate: bool) {
    for (radius, horizontal) in [(radius_x, true), (radius_y, false)] {
        if radius == 0 {
            continue;
        }
        let (width, height) = (pixmap.width() as usize, pixmap.height() as usize);
        let source = pixmap.data().to_vec();
        let data = pixmap.data_mut();
        for y in 0..height {
            for x in 0..width {
                let (pos, length) = if horizontal { (x, width) } else { (y, height) };
                let lo = pos.saturating_sub(radius);
                let hi = (pos + radius).min(length - 1);
                let touches_edge = pos < radius || pos + radius >= length;
                for c in 0..4 {
                    let values = (lo..=hi).map(|i| {
                        let at = if horizontal {
                            (y * width + i) * 4
                        } else {
                            (i * width + x) * 4
                        };
                        source[at + c]
                    });
                    let value = if dilate {
                        values.max().unwrap_or(0)
                    } else if touches_edge {
                        0
                    } else {
                        values.min().unwrap_or(0)
                    };
                    data[(y * width + x) * 4 + c] = value;
                }
            }
        }
    }
}

fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055f32.mul_add(v.powf(1.0 / 2.4), -0.055)
    }
}

/// Apply `map` to every pixel as unpremultiplied normalized RGBA.
fn map_pixels(pixmap: &mut Pixmap, map: impl Fn([f32; 4]) -> [f32; 4]) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    for px in pixmap.pixels_mut() {
        let c = px.demultiply();
        let [r, g, b, a] = map([
            f32::from(c.red()) / 255.0,
            f32::from(c.green()) / 255.0,
            f32::from(c.blue()) / 255.0,
            f32::from(c.alpha()) / 255.0,
        ]);
        *px = ColorU8::from_rgba(to_u8(r), to_u8(g), to_u8(b), to_u8(a)).premultiply();
    }
}

/// Run every pixel of `pixmap` through `filter`.
pub fn apply_color_filter(pixmap: &mut Pixmap, filter: &ColorFilter) {
    match filter {
        ColorFilter::Blend { color, mode } => {
            let (width, height) = (pixmap.width(), pixmap.height());
            #[allow(clippy::cast_precision_loss)]
            let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, width as f32, height as f32)
            else {
                return;
            };
            let paint = tiny_skia::Paint {
                shader: tiny_skia::Shader::SolidColor(to_color(*color)),
                blend_mode: to_blend_mode(*mode),
                ..tiny_skia::Paint::default()
            };
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
        ColorFilter::Matrix(m) => map_pixels(pixmap, |c| {
            let row = |r: usize| {
                m[r * 5].mul_add(
                    c[0],
                    m[r * 5 + 1].mul_add(c[1], m[r * 5 + 2].mul_add(c[2], m[r * 5 + 3] * c[3])),
                ) + m[r * 5 + 4]
            };
            [row(0), row(1), row(2), row(3)]
        }),
        ColorFilter::LinearToSrgbGamma => map_pixels(pixmap, |[r, g, b, a]| {
            [linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b), a]
        }),
        ColorFilter::SrgbToLinearGamma => map_pixels(pixmap, |[r, g, b, a]| {
            [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
        }),
    }
}

/// Apply `filter` to a layer drawn under `transform`.
///
/// `blank` is a transparent surface of the same size, used as the target of
/// resampling filters.
pub fn apply_image_filter(
    pixmap: &mut Pixmap,
    filter: &ImageFilter,
    transform: &Transform,
    blank: &Pixmap,
) {
    match filter {
        ImageFilter::Blur {
            sigma_x, sigma_y, ..
        } => blur(
            pixmap,
            device_radius(*sigma_x, transform),
            device_radius(*sigma_y, transform),
        ),
        ImageFilter::Dilate { radius_x, radius_y } => morphology(
            pixmap,
            device_radius(*radius_x, transform),
            device_radius(*radius_y, transform),
            true,
        ),
        ImageFilter::Erode { radius_x, radius_y } => morphology(
            pixmap,
            device_radius(*radius_x, transform),
            device_radius(*radius_y, transform),
            false,
        ),
        ImageFilter::Matrix { matrix, sampling } => {
            let Some(inverse) = transform.invert() else {
                let _ = warn_once("Raster", "matrix filter under a singular transform skipped");
                return;
            };
            let device = transform.pre_concat(to_transform(matrix)).pre_concat(inverse);
            let mut target = blank.clone();
            let paint = PixmapPaint {
                quality: match to_quality(*sampling) {
                    FilterQuality::Bicubic => FilterQuality::Bilinear,
                    quality => quality,
                },
                ..PixmapPaint::default()
            };
            target.draw_pixmap(0, 0, pixmap.as_ref(), &paint, device, None);
            *pixmap = target;
        }
        ImageFilter::ColorFilter(color_filter) => apply_color_filter(pixmap, color_filter),
        ImageFilter::Compose { outer, inner } => {
            apply_image_filter(pixmap, inner, transform, blank);
            apply_image_filter(pixmap, outer, transform, blank);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(size: u32, at: (u32, u32)) -> Pixmap {
        let mut pixmap = Pixmap::new(size, size).unwrap();
        let i = ((at.1 * size + at.0) * 4) as usize;
        pixmap.data_mut()[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
        pixmap
    }

    fn painted(pixmap: &Pixmap) -> Vec<(u32, u32)> {
        let width = pixmap.width();
        pixmap
            .pixels()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alpha() > 0)
            .map(|(i, _)| {
                let i = u32::try_from(i).unwrap();
                (i % width, i / width)
            })
            .collect()
    }

    #[test]
    fn test_blur_spread_is_three_radii() {
        let mut pixmap = dot(21, (10, 10));
        blur(&mut pixmap, 2, 2);
        let touched = painted(&pixmap);
        assert!(touched.iter().all(|&(x, y)| x.abs_diff(10) <= 6 && y.abs_diff(10) <= 6));
        assert!(touched.contains(&(10, 10)));
    }

    #[test]
    fn test_dilate_grows_by_radius() {
        let mut pixmap = dot(9, (4, 4));
        morphology(&mut pixmap, 1, 2, true);
        let touched = painted(&pixmap);
        assert_eq!(touched.len(), 3 * 5);
    }

    #[test]
    fn test_erode_removes_isolated_pixel() {
        let mut pixmap = dot(9, (4, 4));
        morphology(&mut pixmap, 1, 1, false);
        assert!(painted(&pixmap).is_empty());
    }

    #[test]
    fn test_color_matrix_inverts_red() {
        let mut pixmap = Pixmap::new(1, 1).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(255, 0, 0, 255));
        let mut m = [0.0; 20];
        m[0] = -1.0;
        m[4] = 1.0;
        m[6] = 1.0;
        m[12] = 1.0;
        m[18] = 1.0;
        apply_color_filter(&mut pixmap, &ColorFilter::Matrix(m));
        assert_eq!(pixmap.data(), &[0, 0, 0, 255]);
    }

    #[test]
    fn test_device_radius_scales_with_transform() {
        assert_eq!(device_radius(2.0, &Transform::from_scale(2.0, 3.0)), 4);
        assert_eq!(device_radius(0.4, &Transform::identity()), 0);
    }
}
