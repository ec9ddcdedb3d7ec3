use super::*;

#[test]
fn fnv_hash_is_incremental() {
    let mut a = Fnv1a64::new();
    a.write_bytes(b"terrain");
    let mut b = Fnv1a64::new();
    b.write_bytes(b"ter");
    b.write_bytes(b"rain");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn rng_same_seed_same_sequence() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..64 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
    let mut c = Rng64::new(124);
    assert_ne!(Rng64::new(123).next_u64(), c.next_u64());
}

#[test]
fn rng_matches_reference_splitmix64() {
    let mut r = Rng64::new(0);
    assert_eq!(r.next_u64(), 0xe220_a839_7b1d_cdaf);
    assert_eq!(r.next_u64(), 0x6e78_9e6a_a1b9_65f4);
}

#[test]
fn rng_f64_stays_in_unit_interval() {
    let mut r = Rng64::new(7);
    for _ in 0..1000 {
        let v = r.next_f64_01();
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn disc_samples_are_inside_unit_disc() {
    let mut r = Rng64::new(99);
    for _ in 0..1000 {
        let (x, y) = r.next_in_unit_disc();
        assert!(x * x + y * y < 1.0);
    }
}

#[test]
fn clamp01_limits() {
    assert_eq!(clamp01(-0.5), 0.0);
    assert_eq!(clamp01(0.25), 0.25);
    assert_eq!(clamp01(3.0), 1.0);
}

#[test]
fn rotating_forward_about_up_by_90_points_right() {
    let v = rotate_about_axis(Vec3::FORWARD, Vec3::UP, 90.0);
    assert!((v.x - 1.0).abs() < 1e-6);
    assert!(v.y.abs() < 1e-6);
    assert!(v.z.abs() < 1e-6);
}

#[test]
fn smoothstep_edges() {
    assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
    assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
    assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
    assert_eq!(smoothstep(0.5, 0.5, 0.6), 1.0);
}
