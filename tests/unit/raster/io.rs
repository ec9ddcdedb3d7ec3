use super::*;

#[test]
fn sixteen_bit_heightmap_keeps_precision() {
    let raw = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(2, 1, vec![0, 65535])
        .unwrap();
    let img = heightmap_from_dynamic(&image::DynamicImage::ImageLuma16(raw)).unwrap();
    assert_eq!(img.format(), PixelFormat::R32Float);
    assert_eq!(img.samples(), &[0.0, 1.0]);
}

#[test]
fn color_is_normalized_rgba() {
    let raw = image::RgbaImage::from_raw(1, 1, vec![255, 0, 51, 255]).unwrap();
    let img = color_from_dynamic(&image::DynamicImage::ImageRgba8(raw)).unwrap();
    assert_eq!(img.format(), PixelFormat::Rgba8Unorm);
    assert_eq!(img.samples(), &[1.0, 0.0, 0.2, 1.0]);
}

#[test]
fn missing_file_is_an_error() {
    let err = load_heightmap("definitely/not/here.png").unwrap_err();
    assert!(err.to_string().contains("open heightmap"));
}
