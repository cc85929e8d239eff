//! Screen-sized RGBA8 frame buffers handed between the loader, the
//! compositor and the display sink.

use image::{Rgba, RgbaImage};

/// Physical screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    /// Build a size, clamping both dimensions to at least one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// A fully opaque frame of exactly screen size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Plain opaque black frame.
    pub fn black(size: ScreenSize) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, Rgba([0, 0, 0, 255])),
        }
    }

    /// Wrap an existing buffer.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn size(&self) -> ScreenSize {
        ScreenSize {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA8 bytes, row-major, no padding.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// True when every pixel has alpha 255.
    pub fn is_opaque(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == u8::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_canvas_is_opaque_and_sized() {
        let canvas = Canvas::black(ScreenSize::new(4, 3));
        assert_eq!((canvas.width(), canvas.height()), (4, 3));
        assert!(canvas.is_opaque());
        assert_eq!(canvas.pixel(3, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn screen_size_never_zero() {
        assert_eq!(ScreenSize::new(0, 0), ScreenSize::new(1, 1));
    }
}
