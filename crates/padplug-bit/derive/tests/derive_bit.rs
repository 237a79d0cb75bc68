use padplug_bit_derive::Bit;
use padplug_bit_mask::{Bitable, Bitmask};

#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Face {
    South,
    East,
    West,
    North,
}

#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq)]
enum Wide {
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B9,
    B10,
    B11,
    B12,
    B13,
    B14,
    B15,
}

#[test]
fn positions_follow_declaration_order() {
    assert_eq!(Face::South.bit(), 1 << 0);
    assert_eq!(Face::East.bit(), 1 << 1);
    assert_eq!(Face::West.bit(), 1 << 2);
    assert_eq!(Face::North.bit(), 1 << 3);
    assert_eq!(Face::North.index(), 3);
    assert_eq!(Face::COUNT, 4);
}

#[test]
fn discriminant_casts_agree_with_positions() {
    for index in 0..Face::COUNT {
        let face = Face::from_index(index).unwrap();
        assert_eq!(face as u32, face.index());
    }
    assert_eq!(Face::from_index(Face::COUNT), None);
}

#[test]
fn sixteen_variants_fill_the_mask() {
    assert_eq!(Wide::COUNT, 16);
    assert_eq!(Wide::B15.bit(), 0x8000);
    assert_eq!(Bitmask::<Wide>::full().value(), u16::MAX);
    assert_eq!(Bitmask::<Wide>::full().iter().count(), 16);
}

#[test]
fn derived_elements_work_in_masks() {
    let mut mask = Bitmask::new(&[Face::South, Face::North]);
    assert!(mask.contains(Face::North));
    mask.remove(Face::North);
    assert_eq!(mask.iter().collect::<Vec<_>>(), vec![Face::South]);
}
