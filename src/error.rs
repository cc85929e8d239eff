use std::path::PathBuf;

use thiserror::Error;

/// Library error type for slideshow setup and shell operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured photo directory is missing or not a directory.
    #[error("invalid photo directory: {0}")]
    BadDir(String),

    /// The scan completed but found no images; the engine is never started.
    #[error("no images found in {}", .0.display())]
    EmptyLibrary(PathBuf),

    /// A slideshow setting is out of range.
    #[error("invalid slideshow configuration: {0}")]
    InvalidConfig(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

/// Failure to turn one image file into pixels.
///
/// Recovered inside the loader by substituting a black canvas.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to resize {}: {reason}", path.display())]
    Resize { path: PathBuf, reason: String },
}

/// The display surface could not take a frame.
///
/// The frame is skipped; transitions and timers carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderSinkError {
    #[error("display surface lost")]
    SurfaceLost,

    #[error("display surface timed out")]
    Timeout,

    #[error("display surface out of memory")]
    OutOfMemory,

    #[error("display surface unavailable: {0}")]
    Unavailable(String),
}
