use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use image::{ExtendedColorType, codecs::jpeg::JpegEncoder};

use crate::{
    foundation::{
        error::{PrettifierError, PrettifierResult},
        math::clamp01,
    },
    raster::Image,
};

pub const JPEG_QUALITY: u8 = 100;

pub fn ensure_parent_dir(path: &Path) -> PrettifierResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `<dir>/<stem>_Processed.jpg`, next to `input` unless `out_dir` is given.
pub fn processed_output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{stem}_Processed.jpg"))
}

fn quantize8(v: f32) -> u8 {
    (clamp01(v) * 255.0).round() as u8
}

fn quantize16(v: f32) -> u16 {
    (clamp01(v) * 65535.0).round() as u16
}

/// 8-bit samples and their color type: grayscale for height data, RGB for color.
fn to_8bit(img: &Image, keep_alpha: bool) -> (Vec<u8>, ExtendedColorType) {
    let ch = img.channels();
    if !img.format().is_color() {
        let data = img.samples().chunks(ch).map(|px| quantize8(px[0])).collect();
        return (data, ExtendedColorType::L8);
    }
    let take = if keep_alpha { 4 } else { 3 };
    let data = img
        .samples()
        .chunks(ch)
        .flat_map(|px| px[..take].iter().map(|&v| quantize8(v)))
        .collect();
    let ty = if keep_alpha {
        ExtendedColorType::Rgba8
    } else {
        ExtendedColorType::Rgb8
    };
    (data, ty)
}

/// Write `img` as a quality-100 JPEG. Height data is written as grayscale.
#[tracing::instrument(level = "debug", skip(img))]
pub fn export_jpeg(img: &Image, path: &Path) -> PrettifierResult<()> {
    ensure_parent_dir(path)?;
    let (data, ty) = to_8bit(img, false);
    let file = File::create(path)
        .map_err(|e| PrettifierError::export(format!("create '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
        .encode(&data, img.width(), img.height(), ty)
        .map_err(|e| PrettifierError::export(format!("encode '{}': {e}", path.display())))?;
    writer
        .flush()
        .map_err(|e| PrettifierError::export(format!("write '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), "exported jpeg");
    Ok(())
}

/// Write `img` as an 8-bit PNG (RGBA for color, grayscale for height data).
#[tracing::instrument(level = "debug", skip(img))]
pub fn export_png(img: &Image, path: &Path) -> PrettifierResult<()> {
    ensure_parent_dir(path)?;
    let (data, ty) = to_8bit(img, true);
    image::save_buffer_with_format(
        path,
        &data,
        img.width(),
        img.height(),
        ty,
        image::ImageFormat::Png,
    )
    .map_err(|e| PrettifierError::export(format!("encode '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), "exported png");
    Ok(())
}

/// Write the height channel as a 16-bit grayscale PNG.
#[tracing::instrument(level = "debug", skip(img))]
pub fn export_heightmap_png16(img: &Image, path: &Path) -> PrettifierResult<()> {
    if img.format().is_color() {
        return Err(PrettifierError::export(
            "16-bit heightmap export expects height data",
        ));
    }
    ensure_parent_dir(path)?;
    let ch = img.channels();
    let data: Vec<u16> = img.samples().chunks(ch).map(|px| quantize16(px[0])).collect();
    let buf = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(
        img.width(),
        img.height(),
        data,
    )
    .ok_or_else(|| PrettifierError::export("heightmap buffer size mismatch"))?;
    buf.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| PrettifierError::export(format!("encode '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), "exported 16-bit heightmap");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/encode.rs"]
mod tests;
