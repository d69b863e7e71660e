//! Whole-raster application of the bit-plane codec.
//!
//! A frame pair comes in as two RGB rasters, the secret is resampled to the
//! cover's geometry, and the pixel codec runs over every coordinate. The
//! file-level wrappers own the image lifetimes for exactly one call: read,
//! transform, persist, drop.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageBuffer, RgbImage};

use crate::bitplane::{embed_pixel, reveal_pixel};
use crate::error::FrameveilError;
use crate::result::Result;

/// embeds a secret raster into a cover raster, producing a stego raster
/// with the cover's dimensions
///
/// The secret is resampled with nearest-neighbour when the geometries differ.
/// Nearest keeps the operation deterministic and avoids interpolated channel
/// values that would dilute the carried top bit.
pub fn embed_frame(cover: &RgbImage, secret: &RgbImage) -> RgbImage {
    let (width, height) = cover.dimensions();

    let resampled;
    let secret = if secret.dimensions() == (width, height) {
        secret
    } else {
        resampled = imageops::resize(secret, width, height, FilterType::Nearest);
        &resampled
    };

    ImageBuffer::from_fn(width, height, |x, y| {
        embed_pixel(*cover.get_pixel(x, y), *secret.get_pixel(x, y))
    })
}

/// recovers the carried raster from a stego raster, same dimensions as input
pub fn reveal_frame(stego: &RgbImage) -> RgbImage {
    let (width, height) = stego.dimensions();

    ImageBuffer::from_fn(width, height, |x, y| reveal_pixel(*stego.get_pixel(x, y)))
}

/// reads any decodable image and normalizes it to 8-bit RGB,
/// discarding alpha or palette information
pub fn read_frame(path: &Path) -> Result<RgbImage> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| match e {
            image::ImageError::IoError(source) => FrameveilError::ReadError { source },
            _ => FrameveilError::UnsupportedImage(path.to_owned()),
        })
}

/// persists a raster as a lossless PNG file
pub fn save_frame(frame: &RgbImage, path: &Path) -> Result<()> {
    frame.save(path).map_err(|e| match e {
        image::ImageError::IoError(source) => FrameveilError::WriteError { source },
        _ => FrameveilError::FrameEncodingError(path.to_owned()),
    })
}

/// one embed call over backing files: read both, embed, persist the result
pub fn embed_frame_file(cover: &Path, secret: &Path, output: &Path) -> Result<()> {
    let cover = read_frame(cover)?;
    let secret = read_frame(secret)?;

    save_frame(&embed_frame(&cover, &secret), output)
}

/// one reveal call over backing files
pub fn reveal_frame_file(stego: &Path, output: &Path) -> Result<()> {
    let stego = read_frame(stego)?;

    save_frame(&reveal_frame(&stego), output)
}
