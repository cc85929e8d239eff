//! Image loading: decode, orient, letterbox.
//!
//! [`load_canvas`] is the infallible entry point the sequencer relies on; a
//! file that cannot be decoded becomes a black frame. [`PrefetchLoader`]
//! runs the same work on a background thread for the slide that is most
//! likely to be shown next.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use fast_image_resize as fir;
use image::{RgbaImage, imageops};
use tracing::{debug, warn};

use crate::canvas::{Canvas, ScreenSize};
use crate::error::DecodeError;
use crate::processing::layout::{center_offset, fit_inside};
use crate::processing::orientation::read_orientation;

/// Where the sequencer gets its canvases from.
pub trait CanvasSource {
    /// Produce the canvas for slide `index`. Never fails; unreadable slides
    /// come back black.
    fn canvas(&mut self, index: usize) -> Canvas;

    /// Hint that `index` is likely to be requested next.
    fn prefetch(&mut self, _index: usize) {}
}

// Decodes an image to RGBA8 and applies EXIF orientation if available.
fn decode_rgba8_apply_exif(path: &Path) -> Result<RgbaImage, DecodeError> {
    let io_err = |source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    };
    let img = image::ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format() // sniff based on content/extension
        .map_err(io_err)?
        .decode()
        .map_err(|source| DecodeError::Image {
            path: path.to_path_buf(),
            source,
        })?;

    let orientation = read_orientation(path);
    Ok(orientation.apply(img.to_rgba8()))
}

fn resize_rgba(path: &Path, source: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage, DecodeError> {
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }
    let resize_err = |reason: String| DecodeError::Resize {
        path: path.to_path_buf(),
        reason,
    };

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .map_err(|e| resize_err(e.to_string()))?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|e| resize_err(e.to_string()))?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| resize_err("resized buffer has the wrong length".into()))
}

// Composite over black so the canvas stays opaque.
#[allow(clippy::cast_possible_truncation)]
fn flatten_alpha(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let a = u16::from(px.0[3]);
        if a == 255 {
            continue;
        }
        for c in &mut px.0[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
        px.0[3] = 255;
    }
}

/// Letterbox an already upright image onto a black screen-sized canvas.
pub fn normalize(path: &Path, upright: &RgbaImage, screen: ScreenSize) -> Result<Canvas, DecodeError> {
    let (w, h) = fit_inside(upright.width(), upright.height(), screen);
    // flatten first so hidden colour under transparent pixels never bleeds
    let mut flat = upright.clone();
    flatten_alpha(&mut flat);
    let scaled = resize_rgba(path, &flat, w, h)?;

    let (ox, oy) = center_offset(w, h, screen.width, screen.height);
    let mut canvas = Canvas::black(screen).into_image();
    imageops::replace(&mut canvas, &scaled, i64::from(ox), i64::from(oy));
    Ok(Canvas::from_image(canvas))
}

/// Decode, orient and letterbox `path`.
pub fn prepare_canvas(path: &Path, screen: ScreenSize) -> Result<Canvas, DecodeError> {
    let upright = decode_rgba8_apply_exif(path)?;
    normalize(path, &upright, screen)
}

/// Like [`prepare_canvas`] but substitutes a black canvas on failure.
pub fn load_canvas(path: &Path, screen: ScreenSize) -> Canvas {
    match prepare_canvas(path, screen) {
        Ok(canvas) => {
            debug!(path = %path.display(), "canvas prepared");
            canvas
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "decode failed; showing black frame");
            Canvas::black(screen)
        }
    }
}

/// Decodes on the calling thread.
#[derive(Debug, Clone)]
pub struct FileLoader {
    images: Vec<PathBuf>,
    screen: ScreenSize,
}

impl FileLoader {
    pub fn new(images: Vec<PathBuf>, screen: ScreenSize) -> Self {
        Self { images, screen }
    }
}

impl CanvasSource for FileLoader {
    fn canvas(&mut self, index: usize) -> Canvas {
        match self.images.get(index) {
            Some(path) => load_canvas(path, self.screen),
            None => Canvas::black(self.screen),
        }
    }
}

/// Message sent to the background decode thread.
enum LoaderMsg {
    Decode(usize),
    Quit,
}

struct Prepared {
    index: usize,
    canvas: Canvas,
}

/// Decodes predicted slides on a worker thread; results are collected on
/// the thread that owns the loader.
pub struct PrefetchLoader {
    images: Arc<[PathBuf]>,
    screen: ScreenSize,
    tx_req: Sender<LoaderMsg>,
    rx_res: Receiver<Prepared>,
    in_flight: HashSet<usize>,
    ready: HashMap<usize, Canvas>,
    worker: Option<JoinHandle<()>>,
}

impl PrefetchLoader {
    pub fn spawn(images: Vec<PathBuf>, screen: ScreenSize) -> Self {
        let images: Arc<[PathBuf]> = images.into();
        let (tx_req, rx_req) = crossbeam_channel::unbounded::<LoaderMsg>();
        let (tx_res, rx_res) = crossbeam_channel::unbounded::<Prepared>();
        let worker = {
            let images = Arc::clone(&images);
            thread::Builder::new()
                .name("slide-prefetch".into())
                .spawn(move || decode_worker(&images, screen, &rx_req, &tx_res))
        };
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(error = %err, "failed to spawn prefetch thread; decoding inline");
                None
            }
        };
        Self {
            images,
            screen,
            tx_req,
            rx_res,
            in_flight: HashSet::new(),
            ready: HashMap::new(),
            worker,
        }
    }

    fn drain_finished(&mut self) {
        while let Ok(done) = self.rx_res.try_recv() {
            self.in_flight.remove(&done.index);
            self.ready.insert(done.index, done.canvas);
        }
    }

    fn wait_for(&mut self, index: usize) -> Option<Canvas> {
        while self.in_flight.contains(&index) {
            let Ok(done) = self.rx_res.recv() else {
                self.in_flight.clear();
                return None;
            };
            self.in_flight.remove(&done.index);
            if done.index == index {
                return Some(done.canvas);
            }
            self.ready.insert(done.index, done.canvas);
        }
        None
    }

    fn decode_inline(&self, index: usize) -> Canvas {
        match self.images.get(index) {
            Some(path) => load_canvas(path, self.screen),
            None => Canvas::black(self.screen),
        }
    }
}

impl CanvasSource for PrefetchLoader {
    fn canvas(&mut self, index: usize) -> Canvas {
        self.drain_finished();
        let canvas = match self.ready.remove(&index) {
            Some(canvas) => {
                debug!(index, "prefetch hit");
                canvas
            }
            None => match self.wait_for(index) {
                Some(canvas) => {
                    debug!(index, "prefetch joined in flight");
                    canvas
                }
                None => self.decode_inline(index),
            },
        };
        // Only the requested slide is worth keeping.
        self.ready.clear();
        canvas
    }

    fn prefetch(&mut self, index: usize) {
        self.drain_finished();
        if index >= self.images.len()
            || self.ready.contains_key(&index)
            || self.in_flight.contains(&index)
            || self.worker.is_none()
        {
            return;
        }
        if self.tx_req.send(LoaderMsg::Decode(index)).is_ok() {
            debug!(index, "prefetch requested");
            self.in_flight.insert(index);
        }
    }
}

impl Drop for PrefetchLoader {
    fn drop(&mut self) {
        let _ = self.tx_req.send(LoaderMsg::Quit);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn decode_worker(images: &[PathBuf], screen: ScreenSize, rx: &Receiver<LoaderMsg>, tx: &Sender<Prepared>) {
    while let Ok(msg) = rx.recv() {
        match msg {
            LoaderMsg::Quit => break,
            LoaderMsg::Decode(index) => {
                let canvas = match images.get(index) {
                    Some(path) => load_canvas(path, screen),
                    None => Canvas::black(screen),
                };
                if tx.send(Prepared { index, canvas }).is_err() {
                    break;
                }
            }
        }
    }
}
