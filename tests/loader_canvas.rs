use std::fs;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use rust_slideshow::canvas::{Canvas, ScreenSize};
use rust_slideshow::error::DecodeError;
use rust_slideshow::tasks::loader::{CanvasSource, PrefetchLoader, load_canvas, prepare_canvas};
use tempfile::tempdir;

#[test]
fn png_is_letterboxed_to_screen_size() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("tall.png");
    RgbaImage::from_pixel(30, 60, Rgba([0, 200, 0, 255])).save(&path).unwrap();

    let screen = ScreenSize::new(64, 48);
    let canvas = prepare_canvas(&path, screen).unwrap();
    assert_eq!(canvas.size(), screen);
    assert!(canvas.is_opaque());
    // 24x48 band centred horizontally: columns 20..44
    assert_eq!(canvas.pixel(5, 24), [0, 0, 0, 255]);
    assert_eq!(canvas.pixel(32, 24), [0, 200, 0, 255]);
    assert_eq!(canvas.pixel(58, 24), [0, 0, 0, 255]);
}

#[test]
fn transparent_pixels_become_black() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("clear.png");
    RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 0])).save(&path).unwrap();

    let canvas = prepare_canvas(&path, ScreenSize::new(10, 10)).unwrap();
    assert!(canvas.is_opaque());
    assert_eq!(canvas.pixel(5, 5), [0, 0, 0, 255]);
}

#[test]
fn garbage_file_reports_decode_error() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("broken.png");
    fs::write(&path, b"\x89PNG but not really").unwrap();

    let err = prepare_canvas(&path, ScreenSize::new(4, 4)).unwrap_err();
    assert!(matches!(err, DecodeError::Image { .. }));
    assert_eq!(load_canvas(&path, ScreenSize::new(4, 4)), Canvas::black(ScreenSize::new(4, 4)));
}

#[test]
fn missing_file_reports_io_error() {
    let err = prepare_canvas(std::path::Path::new("/definitely/missing.jpg"), ScreenSize::new(2, 2)).unwrap_err();
    assert!(matches!(err, DecodeError::Io { .. }));
}

#[test]
fn prefetched_canvas_matches_inline_decode() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a.png");
    let b = tmp.path().join("b.png");
    RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])).save(&a).unwrap();
    RgbaImage::from_pixel(4, 4, Rgba([40, 50, 60, 255])).save(&b).unwrap();

    let screen = ScreenSize::new(4, 4);
    let mut loader = PrefetchLoader::spawn(vec![a, b.clone()], screen);
    loader.prefetch(1);
    std::thread::sleep(Duration::from_millis(20));
    let canvas = loader.canvas(1);
    assert_eq!(canvas, load_canvas(&b, screen));
    assert_eq!(loader.canvas(0).pixel(0, 0), [10, 20, 30, 255]);
    // out of range never panics
    assert_eq!(loader.canvas(7), Canvas::black(screen));
}
