use super::*;

#[test]
fn same_seed_same_table() {
    let a = RandomDirectionSet::new(123);
    let b = RandomDirectionSet::new(123);
    assert_eq!(a, b);
    assert_eq!(a.len(), RandomDirectionSet::LEN);
    assert_eq!(a.seed(), 123);
}

#[test]
fn different_seeds_differ() {
    let a = RandomDirectionSet::new(1);
    let b = RandomDirectionSet::new(2);
    assert_ne!(a.as_slice(), b.as_slice());
}

#[test]
fn entries_lie_inside_unit_disc() {
    let set = RandomDirectionSet::new(123);
    for d in set.as_slice() {
        assert!(d.hypot2() < 1.0, "{d:?}");
    }
}

#[test]
fn get_wraps() {
    let set = RandomDirectionSet::new(7);
    assert_eq!(set.get(0), set.get(RandomDirectionSet::LEN));
    assert_eq!(set.get(5), set.as_slice()[5]);
}

#[test]
fn seed_123_table_is_pinned() {
    assert_eq!(Rng64::new(123).next_u64(), 0xb4dc_9bd4_62de_412b);

    let set = RandomDirectionSet::new(123);
    let expected: [(u64, u64); 3] = [
        (0x3fe7_04b4_c474_dc72, 0x3fd7_e902_0648_4c40),
        (0x3fd7_d1a3_6a3c_0774, 0x3fd5_6339_417e_1858),
        (0x3fce_add9_a5bc_9258, 0xbfe6_fe31_2005_4e30),
    ];
    for (d, (x, y)) in set.as_slice().iter().zip(expected) {
        assert_eq!((d.x.to_bits(), d.y.to_bits()), (x, y));
    }
}
