//! Crossfade compositor.

use image::RgbaImage;
use tracing::warn;

use crate::canvas::Canvas;

/// Linear per-channel interpolation `a * (1 - t) + b * t`, alpha included.
///
/// `t` is clamped to `[0, 1]`; the endpoints return exact copies of the
/// inputs. Canvases of different sizes cannot be blended and yield `b`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend(a: &Canvas, b: &Canvas, t: f32) -> Canvas {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if a.size() != b.size() {
        warn!(a = ?a.size(), b = ?b.size(), "blend size mismatch; showing incoming frame");
        return b.clone();
    }
    if t <= 0.0 {
        return a.clone();
    }
    if t >= 1.0 {
        return b.clone();
    }

    let keep = 1.0 - t;
    let pixels: Vec<u8> = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&pa, &pb)| (f32::from(pa) * keep + f32::from(pb) * t).round() as u8)
        .collect();
    match RgbaImage::from_raw(a.width(), a.height(), pixels) {
        Some(image) => Canvas::from_image(image),
        None => b.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ScreenSize;
    use image::Rgba;

    fn solid(rgba: [u8; 4]) -> Canvas {
        Canvas::from_image(RgbaImage::from_pixel(3, 2, Rgba(rgba)))
    }

    #[test]
    fn endpoints_are_exact() {
        let a = solid([10, 200, 30, 255]);
        let b = solid([250, 0, 99, 255]);
        assert_eq!(blend(&a, &b, 0.0), a);
        assert_eq!(blend(&a, &b, 1.0), b);
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let a = solid([10, 20, 30, 255]);
        let b = solid([200, 100, 0, 255]);
        assert_eq!(blend(&a, &b, -3.0), a);
        assert_eq!(blend(&a, &b, 7.5), b);
        assert_eq!(blend(&a, &b, f32::NAN), a);
    }

    #[test]
    fn midpoint_is_the_average() {
        let a = solid([0, 100, 255, 255]);
        let b = solid([100, 0, 55, 255]);
        assert_eq!(blend(&a, &b, 0.5).pixel(1, 1), [50, 50, 155, 255]);
    }

    #[test]
    fn monotonic_per_channel() {
        let a = solid([0, 255, 17, 255]);
        let b = solid([255, 0, 240, 255]);
        let mut last = blend(&a, &b, 0.0).pixel(0, 0);
        for step in 1..=30 {
            let px = blend(&a, &b, step as f32 / 30.0).pixel(0, 0);
            assert!(px[0] >= last[0]);
            assert!(px[1] <= last[1]);
            assert!(px[2] >= last[2]);
            assert_eq!(px[3], 255);
            last = px;
        }
    }

    #[test]
    fn size_mismatch_yields_incoming() {
        let a = Canvas::black(ScreenSize::new(2, 2));
        let b = solid([1, 2, 3, 255]);
        assert_eq!(blend(&a, &b, 0.3), b);
    }
}
