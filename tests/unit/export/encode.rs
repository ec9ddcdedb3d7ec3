use super::*;
use crate::raster::PixelFormat;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "terrain_prettifier_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn processed_path_follows_naming() {
    assert_eq!(
        processed_output_path(Path::new("maps/valley.png"), None),
        PathBuf::from("maps/valley_Processed.jpg")
    );
    assert_eq!(
        processed_output_path(Path::new("maps/valley.png"), Some(Path::new("out"))),
        PathBuf::from("out/valley_Processed.jpg")
    );
}

#[test]
fn jpeg_export_writes_decodable_file() {
    let dir = temp_dir("jpeg");
    let path = dir.join("nested/sat_Processed.jpg");
    let img = Image::from_fn(16, 8, PixelFormat::Rgba8Unorm, |x, _, c| match c {
        0 => x as f32 / 15.0,
        3 => 0.5,
        _ => 0.25,
    })
    .unwrap();
    export_jpeg(&img, &path).unwrap();

    let decoded = image::open(&path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 8));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn height_data_exports_as_grayscale_jpeg() {
    let dir = temp_dir("jpeg_gray");
    let path = dir.join("h.jpg");
    let img = Image::filled(4, 4, PixelFormat::R32Float, 0.5).unwrap();
    export_jpeg(&img, &path).unwrap();
    let decoded = image::open(&path).unwrap();
    assert_eq!(decoded.color(), image::ColorType::L8);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn png16_round_trips_heights() {
    let dir = temp_dir("png16");
    let path = dir.join("h16.png");
    let img = Image::from_samples(2, 1, PixelFormat::R32Float, vec![0.0, 1.0]).unwrap();
    export_heightmap_png16(&img, &path).unwrap();

    let back = crate::raster::io::load_heightmap(&path).unwrap();
    assert_eq!(back.samples(), img.samples());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn png16_rejects_color() {
    let img = Image::filled(2, 2, PixelFormat::Rgba8Unorm, 0.0).unwrap();
    let err = export_heightmap_png16(&img, Path::new("unused.png")).unwrap_err();
    assert!(matches!(err, PrettifierError::Export(_)));
}

#[test]
fn png_export_keeps_alpha() {
    let dir = temp_dir("png8");
    let path = dir.join("preview.png");
    let img = Image::filled(3, 3, PixelFormat::Rgba8Unorm, 1.0).unwrap();
    export_png(&img, &path).unwrap();
    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(1, 1).0, [255, 255, 255, 255]);
    let _ = std::fs::remove_dir_all(&dir);
}
