#![forbid(unsafe_code)]

//! Snapshot baking: resample the visible part of the decoded image and
//! composite it into a transparent buffer the size of the container.

use std::fmt;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use sbx_core::{Rect, SbxError, Size};

use crate::engine::CropPlan;

/// Upper bound on the pixel count of a snapshot.
pub const MAX_SNAPSHOT_PIXELS: u64 = 1 << 26;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// A buffer would exceed [`MAX_SNAPSHOT_PIXELS`].
    TooLarge { size: Size },
    /// The allocator refused the buffer.
    Alloc { size: Size },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { size } => {
                write!(f, "snapshot buffer {}x{} is too large", size.width, size.height)
            }
            Self::Alloc { size } => write!(
                f,
                "could not allocate snapshot buffer {}x{}",
                size.width, size.height
            ),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<SnapshotError> for SbxError {
    fn from(err: SnapshotError) -> Self {
        SbxError::oom(err.to_string())
    }
}

/// Allocate a fully transparent RGBA buffer without aborting on failure.
///
/// # Errors
///
/// [`SnapshotError`] when the buffer exceeds the budget or cannot be
/// allocated.
pub fn transparent_canvas(size: Size) -> Result<RgbaImage, SnapshotError> {
    if size.area() > MAX_SNAPSHOT_PIXELS {
        return Err(SnapshotError::TooLarge { size });
    }
    let len = (size.area() * 4) as usize;
    let mut raw = Vec::new();
    raw.try_reserve_exact(len)
        .map_err(|_| SnapshotError::Alloc { size })?;
    raw.resize(len, 0);
    RgbaImage::from_raw(size.width, size.height, raw).ok_or(SnapshotError::Alloc { size })
}

/// Bake `source` according to `crop`.
///
/// The result is exactly `crop.viewport` in size. Pixels outside the
/// scaled image stay transparent; parts of the scaled image outside the
/// viewport are cut off. Only the visible part of the source is resampled,
/// so no buffer larger than the viewport is ever allocated.
///
/// # Errors
///
/// [`SnapshotError`] when the viewport is too large.
pub fn bake(source: &RgbaImage, crop: &CropPlan) -> Result<RgbaImage, SnapshotError> {
    let mut canvas = transparent_canvas(crop.viewport)?;

    let natural = Size::new(source.width(), source.height());
    let Some(visible) = crop
        .placement()
        .intersection_opt(&Rect::from_size(crop.viewport))
    else {
        return Ok(canvas);
    };
    if natural.is_empty() || crop.scaled.is_empty() {
        return Ok(canvas);
    }

    // Visible rectangle in scaled-image coordinates, mapped back to source
    // pixels per axis.
    let (x0, x1) = source_span(
        i64::from(visible.x) - i64::from(crop.offset_x),
        visible.width,
        natural.width,
        crop.scaled.width,
    );
    let (y0, y1) = source_span(
        i64::from(visible.y) - i64::from(crop.offset_y),
        visible.height,
        natural.height,
        crop.scaled.height,
    );

    let region = imageops::crop_imm(source, x0, y0, x1 - x0, y1 - y0).to_image();
    let region = if region.dimensions() == (visible.width, visible.height) {
        region
    } else {
        imageops::resize(&region, visible.width, visible.height, FilterType::Triangle)
    };
    imageops::replace(
        &mut canvas,
        &region,
        i64::from(visible.x),
        i64::from(visible.y),
    );

    tracing::trace!(
        target: "sbx.layout",
        width = canvas.width(),
        height = canvas.height(),
        source_x = x0,
        source_y = y0,
        source_width = x1 - x0,
        source_height = y1 - y0,
        "snapshot baked"
    );
    Ok(canvas)
}

/// Source pixel range `[start, end)` covering `len` scaled pixels starting
/// at `offset`. Never empty and never outside `0..natural`.
fn source_span(offset: i64, len: u32, natural: u32, scaled: u32) -> (u32, u32) {
    let ratio = f64::from(natural) / f64::from(scaled);
    let start = (offset as f64 * ratio).floor().max(0.0) as u32;
    let end = ((offset + i64::from(len)) as f64 * ratio).ceil() as u32;
    let start = start.min(natural - 1);
    let end = end.clamp(start + 1, natural);
    (start, end)
}
