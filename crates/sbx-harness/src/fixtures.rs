#![forbid(unsafe_code)]

//! Files the backend reads: layout descriptions and raster images.

use std::io;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

/// Write an opaque `width`×`height` PNG into `dir`.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> io::Result<PathBuf> {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([200, 80, 40, 255]))
        .save(&path)
        .map_err(io::Error::other)?;
    Ok(path)
}

/// Write a layout file. The recording toolkit only needs it to exist.
pub fn write_layout(dir: &Path, name: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, "collections { group { name: \"main\"; } }\n")?;
    Ok(path)
}
