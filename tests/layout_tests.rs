use rust_slideshow::canvas::ScreenSize;
use rust_slideshow::processing::layout::{center_offset, fit_inside};

fn check_aspect(src: (u32, u32), screen: ScreenSize) {
    let (w, h) = fit_inside(src.0, src.1, screen);
    assert!(w <= screen.width && h <= screen.height);
    assert!(w == screen.width || h == screen.height, "{src:?} -> {w}x{h} touches no edge");
    // aspect preserved within one pixel
    let expected_h = f64::from(w) * f64::from(src.1) / f64::from(src.0);
    let expected_w = f64::from(h) * f64::from(src.0) / f64::from(src.1);
    assert!(
        (f64::from(h) - expected_h).abs() <= 1.0 || (f64::from(w) - expected_w).abs() <= 1.0,
        "{src:?} -> {w}x{h}"
    );
}

#[test]
fn common_camera_sizes_fit_common_screens() {
    let screens = [ScreenSize::new(1920, 1080), ScreenSize::new(2560, 1600), ScreenSize::new(1080, 1920)];
    let sources = [(6000, 4000), (4000, 6000), (4032, 3024), (1920, 1080), (7, 3), (1, 1)];
    for screen in screens {
        for src in sources {
            check_aspect(src, screen);
        }
    }
}

#[test]
fn portrait_on_landscape_is_pillarboxed() {
    let screen = ScreenSize::new(1920, 1080);
    let (w, h) = fit_inside(3000, 4000, screen);
    assert_eq!((w, h), (810, 1080));
    assert_eq!(center_offset(w, h, screen.width, screen.height), (555, 0));
}
