use super::*;

#[test]
fn pack_unpack_round_trip_all_channels() {
    for r in 0..=255u8 {
        for g in (0..=255u8).step_by(3) {
            for b in [0u8, 1, 127, 128, 254, 255] {
                assert_eq!(unpack(pack(r, g, b)), Rgb8::new(r, g, b));
            }
        }
    }
}

#[test]
fn pack_matches_shift_layout() {
    assert_eq!(pack(255, 0, 0), 0xFF0000);
    assert_eq!(pack(0, 255, 0), 0x00FF00);
    assert_eq!(pack(0, 0, 255), 0x0000FF);
    assert_eq!(pack(0x12, 0x34, 0x56), 0x123456);
}

#[test]
fn unpack_ignores_high_bits() {
    assert_eq!(unpack(0xAB12_3456), Rgb8::new(0x12, 0x34, 0x56));
    assert_eq!(unpack(u32::MAX), Rgb8::WHITE);
}

#[test]
fn bulk_entry_points_match_scalar() {
    let packed = [16_711_680u32, 65_280, 255, 0x0102_0304];
    let colors = unpack_slice(&packed);
    assert_eq!(
        colors,
        vec![
            Rgb8::new(255, 0, 0),
            Rgb8::new(0, 255, 0),
            Rgb8::new(0, 0, 255),
            Rgb8::new(2, 3, 4),
        ]
    );

    let mut out = vec![Rgb8::BLACK; packed.len()];
    unpack_into(&packed, &mut out).unwrap();
    assert_eq!(out, colors);

    assert_eq!(pack_slice(&colors[..3]), packed[..3].to_vec());
}

#[test]
fn unpack_into_rejects_length_mismatch() {
    let mut out = vec![Rgb8::BLACK; 2];
    assert!(unpack_into(&[1, 2, 3], &mut out).is_err());
}

#[test]
fn hex_parsing_accepts_optional_hash() {
    assert_eq!(Rgb8::from_hex("#FF5733").unwrap(), Rgb8::new(0xFF, 0x57, 0x33));
    assert_eq!(Rgb8::from_hex("ff5733").unwrap(), Rgb8::new(0xFF, 0x57, 0x33));
    assert_eq!(Rgb8::new(0xFF, 0x57, 0x33).to_hex(), "#ff5733");
}

#[test]
fn hex_parsing_rejects_malformed_input() {
    for bad in ["", "#FFF", "GG0000", "#FF57331", "+F5733"] {
        assert!(Rgb8::from_hex(bad).is_err(), "{bad} should be rejected");
    }
}

#[test]
fn rgb8_serializes_as_hex_string() {
    let json = serde_json::to_string(&Rgb8::new(1, 2, 3)).unwrap();
    assert_eq!(json, "\"#010203\"");
    let back: Rgb8 = serde_json::from_str("\"#FFFFFF\"").unwrap();
    assert_eq!(back, Rgb8::WHITE);
    assert!(serde_json::from_str::<Rgb8>("\"nope\"").is_err());
}
