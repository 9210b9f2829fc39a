use super::*;

#[test]
fn same_rgb_ignores_alpha() {
    let a = Rgba8::new(10, 20, 30, 0);
    let b = Rgba8::new(10, 20, 30, 255);
    assert!(a.same_rgb(b));
    assert_ne!(a, b);
    assert!(!a.same_rgb(Rgba8::new(10, 20, 31, 0)));
}

#[test]
fn white_detection_ignores_alpha() {
    assert!(Rgba8::new(255, 255, 255, 0).is_white());
    assert!(!Rgba8::new(255, 255, 254, 255).is_white());
}

#[test]
fn blend_boundaries_return_inputs_unchanged() {
    let p = Rgba8::new(200, 100, 50, 17);
    let q = Rgba8::new(10, 20, 30, 40);
    assert_eq!(p.blend(q, 1.0), p);
    assert_eq!(p.blend(q, 1.5), p);
    assert_eq!(p.blend(q, 0.0), q);
    assert_eq!(p.blend(q, -0.5), q);
}

#[test]
fn blend_interior_lies_between_inputs_and_is_opaque() {
    let p = Rgba8::new(200, 0, 77, 10);
    let q = Rgba8::new(0, 255, 77, 10);
    for f in [0.1f32, 0.25, 0.5, 0.75, 0.9] {
        let out = p.blend(q, f);
        for (o, (a, b)) in [(out.r, (p.r, q.r)), (out.g, (p.g, q.g)), (out.b, (p.b, q.b))] {
            assert!(o >= a.min(b) && o <= a.max(b), "f={f} channel {o} outside [{a},{b}]");
        }
        assert_eq!(out.a, 255);
    }
}

#[test]
fn blend_truncates() {
    // 255 * 0.5 + 0 * 0.5 = 127.5 -> 127
    let out = Rgba8::WHITE.blend(Rgba8::BLACK, 0.5);
    assert_eq!(out, Rgba8::gray(127));
}

#[test]
fn darken_walks_the_ladder_to_black() {
    let mut px = Rgba8::WHITE;
    let expected = [0xDC, 0xB4, 0x78, 0x46, 0x28];
    for v in expected {
        px = px.darken();
        assert_eq!(px, Rgba8::gray(v));
    }
    px = px.darken();
    assert_eq!(px, Rgba8::BLACK, "six steps from white reach black");
    assert_eq!(px.darken(), Rgba8::BLACK, "black is a fixed point");
}

#[test]
fn darken_lightest_step_joins_second_step() {
    assert_eq!(Rgba8::gray(0xEB).darken(), Rgba8::gray(0xDC));
}

#[test]
fn darken_off_ladder_falls_back_to_black() {
    assert_eq!(Rgba8::opaque(255, 0, 0).darken(), Rgba8::BLACK);
    assert_eq!(Rgba8::gray(0x80).darken(), Rgba8::BLACK);
}

#[test]
fn from_hex_uses_trailing_six_digits() {
    assert_eq!(Rgba8::from_hex("#FF8000").unwrap(), Rgba8::opaque(255, 128, 0));
    assert_eq!(Rgba8::from_hex("0x00ff00").unwrap(), Rgba8::opaque(0, 255, 0));
    assert_eq!(Rgba8::from_hex("80123456").unwrap(), Rgba8::opaque(0x12, 0x34, 0x56));
    assert_eq!(" 0000ff ".parse::<Rgba8>().unwrap(), Rgba8::opaque(0, 0, 255));
}

#[test]
fn from_hex_rejects_short_or_non_hex() {
    for bad in ["", "#FFF", "12345", "#GG0000", "FF00ZZ"] {
        let err = Rgba8::from_hex(bad).unwrap_err();
        assert!(
            matches!(err, MergeError::ColorFormat { ref input, .. } if input == bad),
            "{bad:?} -> {err:?}"
        );
    }
}

#[test]
fn hex_roundtrip_for_named_color() {
    let c = Rgba8::opaque(0x12, 0xAB, 0xEF);
    assert_eq!(c.to_hex(), "#12ABEF");
    assert_eq!(Rgba8::from_hex(&c.to_hex()).unwrap(), c);
}

#[test]
fn desaturate_is_idempotent_and_keeps_grays() {
    let gray = Rgba8::new(40, 40, 40, 9);
    assert_eq!(gray.desaturate(), gray);

    let c = Rgba8::new(10, 20, 31, 128);
    let once = c.desaturate();
    assert_eq!(once, Rgba8::new(20, 20, 20, 128));
    assert_eq!(once.desaturate(), once);
}

#[test]
fn contains_rgb_matches_by_color_only() {
    let list = [Rgba8::opaque(1, 2, 3), Rgba8::opaque(4, 5, 6)];
    assert!(contains_rgb(&list, Rgba8::new(4, 5, 6, 0)));
    assert!(!contains_rgb(&list, Rgba8::opaque(7, 8, 9)));
    assert!(!contains_rgb(&[], Rgba8::WHITE));
}
