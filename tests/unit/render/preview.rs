use super::*;
use crate::{config::model::RendererConfig, foundation::core::TerrainBounds};

fn params(renderer: &RendererConfig, w: u32, h: u32) -> TerrainParams {
    TerrainParams::bind(&TerrainBounds::default(), renderer, w, h)
}

fn flat(w: u32, h: u32) -> Image {
    Image::filled(w, h, PixelFormat::R32Float, 0.0).unwrap()
}

#[test]
fn unlit_preview_is_exposure_scaled_albedo() {
    let renderer = RendererConfig {
        lighting: false,
        exposure: 0.5,
        ..RendererConfig::default()
    };
    let out = render_preview(&flat(8, 8), None, &params(&renderer, 8, 8)).unwrap();
    assert_eq!(out.format(), PixelFormat::Rgba8Unorm);
    for px in out.samples().chunks(4) {
        assert_eq!(px, [0.5, 0.5, 0.5, 1.0]);
    }
}

#[test]
fn zenith_sun_fully_lights_flat_ground() {
    let renderer = RendererConfig {
        sun_altitude: 90.0,
        ..RendererConfig::default()
    };
    let out = render_preview(&flat(8, 8), None, &params(&renderer, 8, 8)).unwrap();
    assert!(out.samples().iter().all(|&s| (s - 1.0).abs() < 1e-4));
}

#[test]
fn low_sun_dims_flat_ground() {
    let renderer = RendererConfig::default();
    let out = render_preview(&flat(8, 8), None, &params(&renderer, 8, 8)).unwrap();
    let expected = AMBIENT + (1.0 - AMBIENT) * 15f32.to_radians().sin();
    assert!((out.texel(3, 3, 0) - expected).abs() < 1e-4);
}

#[test]
fn ridge_casts_shadow_away_from_sun() {
    let renderer = RendererConfig {
        sun_azimuth: 90.0,
        sun_altitude: 15.0,
        ..RendererConfig::default()
    };
    let wall = Image::from_fn(64, 64, PixelFormat::R32Float, |x, _, _| {
        if (20..22).contains(&x) { 1.0 } else { 0.0 }
    })
    .unwrap();
    let p = params(&renderer, 64, 64);
    let out = render_preview(&wall, None, &p).unwrap();
    let shadowed = out.texel(15, 32, 0);
    let lit = out.texel(40, 32, 0);
    assert!(shadowed < lit, "{shadowed} !< {lit}");
    assert!((shadowed - AMBIENT).abs() < 1e-4);

    let no_shadows = RendererConfig {
        shadows: false,
        ..renderer
    };
    let out = render_preview(&wall, None, &params(&no_shadows, 64, 64)).unwrap();
    assert_eq!(out.texel(15, 32, 0), out.texel(40, 32, 0));
}

#[test]
fn satellite_supplies_albedo() {
    let renderer = RendererConfig {
        lighting: false,
        ..RendererConfig::default()
    };
    let sat = Image::from_fn(4, 4, PixelFormat::Rgba8Unorm, |_, _, c| match c {
        0 => 0.8,
        1 => 0.4,
        2 => 0.2,
        _ => 1.0,
    })
    .unwrap();
    let out = render_preview(&flat(8, 8), Some(&sat), &params(&renderer, 8, 8)).unwrap();
    assert_eq!(&out.samples()[..4], [0.8, 0.4, 0.2, 1.0]);

    let plain = RendererConfig {
        albedo: false,
        ..renderer
    };
    let out = render_preview(&flat(8, 8), Some(&sat), &params(&plain, 8, 8)).unwrap();
    assert_eq!(&out.samples()[..4], [1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn color_heightmap_is_rejected() {
    let renderer = RendererConfig::default();
    let color = Image::filled(4, 4, PixelFormat::Rgba8Unorm, 0.0).unwrap();
    assert!(render_preview(&color, None, &params(&renderer, 4, 4)).is_err());
}
