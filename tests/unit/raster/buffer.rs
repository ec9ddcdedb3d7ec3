use super::*;

#[test]
fn from_samples_rejects_length_mismatch() {
    assert!(Image::from_samples(2, 2, PixelFormat::R32Float, vec![0.0; 3]).is_err());
    assert!(Image::from_samples(2, 2, PixelFormat::Rgba8Unorm, vec![0.0; 4]).is_err());
    assert!(Image::from_samples(0, 2, PixelFormat::R32Float, vec![]).is_err());
    let img = Image::from_samples(2, 2, PixelFormat::Rg32Float, vec![0.0; 8]).unwrap();
    assert_eq!(img.id(), BufferId::DETACHED);
    assert_eq!(img.channels(), 2);
}

#[test]
fn mip_count_reaches_one_by_one() {
    let d = ImageDesc::new(256, 256, PixelFormat::Rgba8Unorm).with_mips(true);
    assert_eq!(d.mip_count(), 8);
    let d = ImageDesc::new(300, 17, PixelFormat::Rgba8Unorm).with_mips(true);
    assert_eq!(d.mip_count(), 8);
    assert_eq!(d.with_mips(false).mip_count(), 0);
}

#[test]
fn texel_clamps_to_edge() {
    let img = Image::from_fn(3, 2, PixelFormat::R32Float, |x, y, _| (y * 3 + x) as f32).unwrap();
    assert_eq!(img.texel(-5, 0, 0), 0.0);
    assert_eq!(img.texel(10, 0, 0), 2.0);
    assert_eq!(img.texel(1, 9, 0), 4.0);
}

#[test]
fn bilinear_hits_pixel_centers_exactly() {
    let img = Image::from_fn(4, 4, PixelFormat::R32Float, |x, y, _| (x + 10 * y) as f32).unwrap();
    let v = img.sample_bilinear(2.5 / 4.0, 1.5 / 4.0, 0);
    assert!((v - 12.0).abs() < 1e-5);
    let mid = img.sample_bilinear(2.0 / 4.0, 1.5 / 4.0, 0);
    assert!((mid - 11.5).abs() < 1e-5);
}

#[test]
fn fingerprint_ignores_identity_but_not_content() {
    let a = Image::filled(4, 4, PixelFormat::R32Float, 0.5).unwrap();
    let mut b = Image::try_alloc(BufferId(7), a.desc()).unwrap();
    b.copy_resampled_from(&a);
    assert_eq!(a.fingerprint(), b.fingerprint());
    b.samples_mut()[0] = 0.25;
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn resampled_copy_downscales_and_expands_channels() {
    let src = Image::filled(8, 8, PixelFormat::R32Float, 0.75).unwrap();
    let mut dst = Image::try_alloc(BufferId(1), ImageDesc::new(4, 4, PixelFormat::Rgba8Unorm)).unwrap();
    dst.copy_resampled_from(&src);
    for px in dst.samples().chunks_exact(4) {
        assert_eq!(px, &[0.75, 0.75, 0.75, 1.0]);
    }
}

#[test]
fn mips_average_base_level() {
    let mut img = Image::try_alloc(
        BufferId(1),
        ImageDesc::new(2, 2, PixelFormat::R32Float).with_mips(true),
    )
    .unwrap();
    img.samples_mut().copy_from_slice(&[0.0, 1.0, 2.0, 3.0]);
    img.generate_mips();
    assert_eq!(img.mips().len(), 1);
    assert_eq!(img.mips()[0].width, 1);
    assert_eq!(img.mips()[0].data, vec![1.5]);
}

#[test]
fn from_fn_rejects_overflowing_shape_before_sampling() {
    let mut calls = 0u32;
    let err = Image::from_fn(u32::MAX, u32::MAX, PixelFormat::Rgba8Unorm, |_, _, _| {
        calls += 1;
        0.0
    })
    .unwrap_err();
    assert!(matches!(err, PrettifierError::Validation(_)));
    assert_eq!(calls, 0);
}
