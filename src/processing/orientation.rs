//! EXIF orientation lookup and pixel-grid correction.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::RgbaImage;
use image::imageops;
use tracing::debug;

/// The eight EXIF orientation values, named by the transform that
/// brings the stored pixels upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    /// Map a raw EXIF tag value; unknown values are treated as upright.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }

    /// Whether applying this orientation swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::Transpose | Self::Rotate90 | Self::Transverse | Self::Rotate270
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal (1)",
            Self::FlipHorizontal => "Mirrored horizontal (2)",
            Self::Rotate180 => "Rotated 180° (3)",
            Self::FlipVertical => "Mirrored vertical (4)",
            Self::Transpose => "Mirrored horizontal + Rotated 270° (5)",
            Self::Rotate90 => "Rotated 90° CW (6)",
            Self::Transverse => "Mirrored horizontal + Rotated 90° (7)",
            Self::Rotate270 => "Rotated 270° CW (8)",
        }
    }

    /// Return the upright pixel grid.
    pub fn apply(self, img: RgbaImage) -> RgbaImage {
        match self {
            Self::Normal => img,
            Self::FlipHorizontal => imageops::flip_horizontal(&img),
            Self::Rotate180 => imageops::rotate180(&img),
            Self::FlipVertical => imageops::flip_vertical(&img),
            // transpose: rotate90 + flip_horizontal
            Self::Transpose => imageops::flip_horizontal(&imageops::rotate90(&img)),
            Self::Rotate90 => imageops::rotate90(&img),
            // transverse: rotate270 + flip_horizontal
            Self::Transverse => imageops::flip_horizontal(&imageops::rotate270(&img)),
            Self::Rotate270 => imageops::rotate270(&img),
        }
    }
}

/// Read the primary-image orientation tag. Missing or unreadable metadata
/// yields [`Orientation::Normal`].
pub fn read_orientation(path: &Path) -> Orientation {
    let Some(raw) = read_orientation_tag(path) else {
        return Orientation::Normal;
    };
    let orientation = Orientation::from_exif(raw);
    debug!(path = %path.display(), orientation = orientation.label(), "exif orientation");
    orientation
}

fn read_orientation_tag(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0)
}
