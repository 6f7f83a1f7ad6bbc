#![forbid(unsafe_code)]

//! Image decoding.
//!
//! The backend talks to decoders through [`ImageLoader`] so hosts (and
//! tests) can substitute their own. [`ImageCrateLoader`] is the default and
//! uses the `image` crate with format sniffing and EXIF orientation.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use image::error::LimitErrorKind;
use image::{DynamicImage, ImageDecoder, ImageError, ImageReader, ImageResult, RgbaImage};
use sbx_core::{SbxError, Size};

/// A decoded image in straight RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pixels: RgbaImage,
}

impl DecodedImage {
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Natural size after orientation.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    #[must_use]
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

/// Why an image could not be decoded.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Decode { path: PathBuf, source: ImageError },
}

impl LoadError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Decode { path, .. } => path,
        }
    }

    /// Whether the decoder ran out of its memory allowance.
    #[must_use]
    pub fn is_out_of_memory(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == io::ErrorKind::OutOfMemory,
            Self::Decode {
                source: ImageError::Limits(limit),
                ..
            } => matches!(limit.kind(), LimitErrorKind::InsufficientMemory),
            Self::Decode { .. } => false,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Decode { path, source } => {
                write!(f, "cannot decode {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
        }
    }
}

impl From<LoadError> for SbxError {
    fn from(err: LoadError) -> Self {
        if err.is_out_of_memory() {
            SbxError::oom(err.to_string())
        } else {
            SbxError::io(err.path().display().to_string(), err.to_string())
        }
    }
}

/// Decodes image files.
pub trait ImageLoader {
    /// Decode `path`. With `orient` set, the decoder-reported orientation
    /// is applied so the natural size reflects it.
    fn decode(&self, path: &Path, orient: bool) -> Result<DecodedImage, LoadError>;
}

/// [`ImageLoader`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateLoader;

impl ImageLoader for ImageCrateLoader {
    fn decode(&self, path: &Path, orient: bool) -> Result<DecodedImage, LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let decode_err = |source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let reader = ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?;
        let decoder = reader.into_decoder().map_err(decode_err)?;
        let decoded = DecodedImage::new(decode_rgba(decoder, orient).map_err(decode_err)?);
        tracing::debug!(
            target: "sbx.layout",
            path = %path.display(),
            width = decoded.size().width,
            height = decoded.size().height,
            orient,
            "image decoded"
        );
        Ok(decoded)
    }
}

/// Whether `path` can be opened for reading.
#[must_use]
pub fn is_readable(path: &Path) -> bool {
    File::open(path).is_ok()
}

/// Run `decoder` to completion. EXIF orientation is only read, and only
/// able to fail the decode, when `orient` is set.
fn decode_rgba(mut decoder: impl ImageDecoder, orient: bool) -> ImageResult<RgbaImage> {
    let orientation = if orient {
        Some(decoder.orientation()?)
    } else {
        None
    };
    let mut image = DynamicImage::from_decoder(decoder)?;
    if let Some(orientation) = orientation {
        image.apply_orientation(orientation);
    }
    Ok(image.into_rgba8())
}
