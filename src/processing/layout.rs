use crate::canvas::ScreenSize;

/// Size of a `src_w × src_h` image scaled uniformly to fit entirely inside
/// `screen`, never cropping.
///
/// Wider-than-screen images are clamped to the screen width, everything
/// else to the screen height; the other side is truncated, and both stay
/// at least one pixel.
#[allow(clippy::cast_possible_truncation)]
pub fn fit_inside(src_w: u32, src_h: u32, screen: ScreenSize) -> (u32, u32) {
    // Integer cross-multiplication keeps exact-aspect images exact.
    let iw = u64::from(src_w.max(1));
    let ih = u64::from(src_h.max(1));
    let sw = u64::from(screen.width.max(1));
    let sh = u64::from(screen.height.max(1));

    let (w, h) = if iw * sh > sw * ih {
        (sw, sw * ih / iw)
    } else {
        (sh * iw / ih, sh)
    };
    (w.clamp(1, sw) as u32, h.clamp(1, sh) as u32)
}

pub fn center_offset(inner_w: u32, inner_h: u32, outer_w: u32, outer_h: u32) -> (u32, u32) {
    let ox = outer_w.saturating_sub(inner_w) / 2;
    let oy = outer_h.saturating_sub(inner_h) / 2;
    (ox, oy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_on_16x9_fills_height() {
        let (w, h) = fit_inside(1000, 1000, ScreenSize::new(1920, 1080));
        assert_eq!((w, h), (1080, 1080));
        assert_eq!(center_offset(w, h, 1920, 1080), (420, 0));
    }

    #[test]
    fn wide_on_16x9_fills_width() {
        let (w, h) = fit_inside(4000, 2000, ScreenSize::new(1920, 1080));
        assert_eq!((w, h), (1920, 960));
        assert_eq!(center_offset(w, h, 1920, 1080), (0, 60));
    }

    #[test]
    fn small_images_are_scaled_up() {
        assert_eq!(fit_inside(16, 9, ScreenSize::new(1920, 1080)), (1920, 1080));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_inside(100_000, 1, ScreenSize::new(100, 100)), (100, 1));
    }
}
