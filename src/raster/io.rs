use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::error::PrettifierResult,
    raster::buffer::{Image, PixelFormat},
};

/// Decode a heightmap file into single-channel `[0, 1]` height samples.
///
/// 16-bit grayscale sources keep their full precision; anything else is reduced to luma.
pub fn load_heightmap(path: impl AsRef<Path>) -> PrettifierResult<Image> {
    let path = path.as_ref();
    let dyn_img =
        image::open(path).with_context(|| format!("open heightmap '{}'", path.display()))?;
    heightmap_from_dynamic(&dyn_img)
}

/// Decode a color image (satellite imagery) into normalized RGBA samples.
pub fn load_color(path: impl AsRef<Path>) -> PrettifierResult<Image> {
    let path = path.as_ref();
    let dyn_img =
        image::open(path).with_context(|| format!("open color image '{}'", path.display()))?;
    color_from_dynamic(&dyn_img)
}

pub fn heightmap_from_dynamic(img: &image::DynamicImage) -> PrettifierResult<Image> {
    let luma = img.to_luma16();
    let (width, height) = luma.dimensions();
    let data = luma
        .into_raw()
        .into_iter()
        .map(|v| f32::from(v) / 65535.0)
        .collect();
    Image::from_samples(width, height, PixelFormat::R32Float, data)
}

pub fn color_from_dynamic(img: &image::DynamicImage) -> PrettifierResult<Image> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let data = rgba
        .into_raw()
        .into_iter()
        .map(|v| f32::from(v) / 255.0)
        .collect();
    Image::from_samples(width, height, PixelFormat::Rgba8Unorm, data)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/io.rs"]
mod tests;
