use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::per_second(30).is_ok());
}

#[test]
fn fps_rounds_seconds_to_frames() {
    let fps = Fps::per_second(30).unwrap();
    assert_eq!(fps.secs_to_frames_round(2.0), 60);
    assert_eq!(fps.secs_to_frames_round(0.3), 9);
    assert_eq!(fps.secs_to_frames_round(-1.0), 0);
    assert!((fps.frames_to_secs(15) - 0.5).abs() < 1e-12);
}

#[test]
fn fps_deserializes_int_or_rational() {
    let a: Fps = serde_json::from_str("24").unwrap();
    assert_eq!(a, Fps { num: 24, den: 1 });
    let b: Fps = serde_json::from_str(r#"{"num":30000,"den":1001}"#).unwrap();
    assert_eq!(b.den, 1001);
    assert!(serde_json::from_str::<Fps>("0").is_err());
}

#[test]
fn canvas_validation() {
    assert!(Canvas::FULL_HD.validate().is_ok());
    assert!(Canvas { width: 0, height: 2 }.validate().is_err());
    assert!(Canvas { width: 63, height: 64 }.validate().is_err());
    assert!(Canvas { width: 70_000, height: 64 }.validate().is_err());
    assert_eq!(Canvas { width: 4, height: 2 }.rgba_len(), 32);
}

#[test]
fn rgba8_premul_and_alpha_scale() {
    assert_eq!(Rgba8::CHROMA_GREEN.to_premul(), [0, 255, 0, 255]);
    let half = Rgba8::new(200, 100, 0, 255).with_alpha_scaled(0.5);
    assert_eq!(half.a, 128);
    assert_eq!(half.to_premul()[0], ((200u16 * 128 + 127) / 255) as u8);
}
