use super::*;

#[test]
fn channels_pack_in_rgba_byte_order() {
    let c = Color::from_rgba(1, 2, 3, 4);
    assert_eq!(c.to_le_bytes(), [1, 2, 3, 4]);
    assert_eq!(
        (c.red(), c.green(), c.blue(), c.alpha()),
        (1, 2, 3, 4)
    );
    assert_eq!(Color::from([9, 8, 7, 6]), Color::from_rgba(9, 8, 7, 6));
}

#[test]
fn lerp_endpoints_and_midpoint() {
    let a = Color::from_rgba(0, 100, 200, 255);
    let b = Color::from_rgba(100, 200, 0, 255);
    assert_eq!(Color::lerp(a, b, 0.0), a);
    assert_eq!(Color::lerp(a, b, 1.0), b);
    assert_eq!(Color::lerp(a, b, 0.5), Color::from_rgba(50, 150, 100, 255));
    assert_eq!(Color::lerp(a, b, 7.0), b);
    assert_eq!(Color::lerp(a, b, f32::NAN), a);
}

#[test]
fn over_respects_alpha_extremes() {
    let red = Color::from_rgba(255, 0, 0, 255);
    let blue = Color::from_rgba(0, 0, 255, 255);
    assert_eq!(Color::over(red, blue), red);
    assert_eq!(Color::over(Color::TRANSPARENT, blue), blue);
    assert_eq!(
        Color::over(Color::TRANSPARENT, Color::TRANSPARENT),
        Color::TRANSPARENT
    );
}

#[test]
fn over_half_alpha_blends_channels() {
    let top = Color::from_rgba(255, 0, 0, 128);
    let bottom = Color::from_rgba(0, 0, 255, 255);
    let out = Color::over(top, bottom);
    assert_eq!(out.alpha(), 255);
    assert!((127..=129).contains(&out.red()));
    assert!((126..=128).contains(&out.blue()));
}

#[test]
fn average4_rounds_to_nearest() {
    let c = Color::average4(
        Color::from_rgba(0, 0, 0, 0),
        Color::from_rgba(1, 4, 255, 255),
        Color::from_rgba(1, 4, 255, 255),
        Color::from_rgba(1, 4, 255, 255),
    );
    assert_eq!(c, Color::from_rgba(1, 3, 191, 191));
}
