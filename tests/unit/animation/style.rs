use super::*;

fn params(text_len: usize) -> StyleParams {
    StyleParams::new(
        Canvas {
            width: 1920,
            height: 1080,
        },
        text_len,
    )
}

#[test]
fn fade_opacity_endpoints() {
    let p = params(5);
    assert_eq!(resolve_style(StyleTag::Fade, 0.0, &p).opacity, 0.0);
    assert_eq!(resolve_style(StyleTag::Fade, 1.0, &p).opacity, 1.0);
}

#[test]
fn fade_speed_changes_how_fast_opacity_saturates() {
    let mut p = params(5);
    p.fade_speed = Some(FadeSpeed::Fast);
    assert_eq!(resolve_style(StyleTag::Fade, 0.5, &p).opacity, 1.0);

    p.fade_speed = Some(FadeSpeed::Slow);
    let slow_end = resolve_style(StyleTag::Fade, 1.0, &p).opacity;
    assert!(slow_end < 1.0 && slow_end > 0.8);
    assert_eq!(resolve_style(StyleTag::Fade, 0.0, &p).opacity, 0.0);
}

#[test]
fn fade_speed_is_a_secondary_axis_for_positional_styles() {
    let mut p = params(5);
    p.fade_speed = Some(FadeSpeed::Fast);
    let t = resolve_style(StyleTag::Left, 0.25, &p);
    assert!((t.opacity - 0.5).abs() < 1e-12);
    let unfaded = resolve_style(StyleTag::Left, 0.25, &params(5));
    assert_eq!(t.offset, unfaded.offset);
    assert_eq!(unfaded.opacity, 1.0);
}

#[test]
fn zoom_scale_endpoints() {
    let p = params(5);
    let start = resolve_style(StyleTag::Zoom, 0.0, &p).scale;
    assert!((start - DEFAULT_ZOOM_MIN_SCALE).abs() < 1e-12);
    assert_eq!(resolve_style(StyleTag::Zoom, 1.0, &p).scale, 1.0);

    let mut custom = params(5);
    custom.zoom_min_scale = 0.5;
    assert_eq!(resolve_style(StyleTag::Zoom, 0.0, &custom).scale, 0.5);
}

#[test]
fn edge_entries_start_offscreen_center_and_land_centered() {
    let p = params(5);
    assert_eq!(resolve_style(StyleTag::Left, 0.0, &p).offset.x, -960.0);
    assert_eq!(resolve_style(StyleTag::Right, 0.0, &p).offset.x, 960.0);
    assert_eq!(resolve_style(StyleTag::Top, 0.0, &p).offset.y, -540.0);
    assert_eq!(resolve_style(StyleTag::Bottom, 0.0, &p).offset.y, 540.0);
    for s in [StyleTag::Left, StyleTag::Right, StyleTag::Top, StyleTag::Bottom] {
        let end = resolve_style(s, 1.0, &p);
        assert!(end.offset.hypot() < 1e-9, "{s} should end centered");
    }
}

#[test]
fn rotate_bounce_and_wave() {
    let p = params(5);
    let r = resolve_style(StyleTag::Rotate, 1.0, &p).rotation;
    assert!((r - std::f64::consts::TAU).abs() < 1e-12);

    assert!(resolve_style(StyleTag::Bounce, 0.0, &p).offset.y.abs() < 1e-9);
    assert!(resolve_style(StyleTag::Bounce, 1.0, &p).offset.y.abs() < 1e-9);
    let mid = resolve_style(StyleTag::Bounce, 0.1, &p).offset.y;
    assert!(mid.abs() > 1.0 && mid.abs() <= 80.0);

    for i in 0..=20 {
        let y = resolve_style(StyleTag::Wave, f64::from(i) / 20.0, &p).offset.y;
        assert!(y.abs() <= 50.0 + 1e-9);
        assert_eq!(resolve_style(StyleTag::Wave, f64::from(i) / 20.0, &p).offset.x, 0.0);
    }
}

#[test]
fn typewriter_reveals_monotonically() {
    let p = params(12);
    let mut prev = 0;
    for i in 0..=100 {
        let n = resolve_style(StyleTag::Typewriter, f64::from(i) / 100.0, &p)
            .visible_chars
            .unwrap();
        assert!(n >= prev);
        prev = n;
    }
    assert_eq!(
        resolve_style(StyleTag::Typewriter, 0.0, &p).visible_chars,
        Some(0)
    );
    assert_eq!(
        resolve_style(StyleTag::Typewriter, 1.0, &p).visible_chars,
        Some(12)
    );
}

#[test]
fn flicker_ignores_positional_easing() {
    let p = params(5);
    for pr in [0.0, 0.3, 1.0] {
        assert_eq!(resolve_style(StyleTag::FontFlicker, pr, &p), StyleTransform::IDENTITY);
    }
}

#[test]
fn affine_centers_content() {
    let canvas = Canvas {
        width: 200,
        height: 100,
    };
    let a = StyleTransform::IDENTITY.affine(canvas);
    let p = a * kurbo::Point::ZERO;
    assert_eq!((p.x, p.y), (100.0, 50.0));
}

#[test]
fn names_round_trip_through_from_str() {
    for s in StyleTag::ALL {
        assert_eq!(s.as_str().parse::<StyleTag>().unwrap(), s);
    }
    assert_eq!("flicker".parse::<StyleTag>().unwrap(), StyleTag::FontFlicker);
    assert!("spin".parse::<StyleTag>().is_err());
    assert_eq!("FAST".parse::<FadeSpeed>().unwrap(), FadeSpeed::Fast);
    let json = serde_json::to_string(&StyleTag::FontFlicker).unwrap();
    assert_eq!(json, "\"font-flicker\"");
}
