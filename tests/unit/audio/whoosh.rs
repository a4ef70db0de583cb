use super::*;

#[test]
fn sweep_direction_follows_style() {
    assert!(!whoosh_for_style(StyleTag::Left).rising());
    assert!(!whoosh_for_style(StyleTag::Right).rising());
    assert!(whoosh_for_style(StyleTag::Top).rising());
    assert!(whoosh_for_style(StyleTag::Bottom).rising());
    assert!(whoosh_for_style(StyleTag::Zoom).rising());
    assert!(!whoosh_for_style(StyleTag::Fade).rising());
    assert!(!whoosh_for_style(StyleTag::Wave).rising());
}

#[test]
fn zoom_sweep_is_widest() {
    let zoom = whoosh_for_style(StyleTag::Zoom);
    let top = whoosh_for_style(StyleTag::Top);
    assert!(zoom.end_hz / zoom.start_hz > top.end_hz / top.start_hz);
}

#[test]
fn every_sweep_lasts_300_to_600_ms() {
    for style in StyleTag::ALL {
        let d = whoosh_for_style(style).duration_secs;
        assert!((0.3..=0.6).contains(&d), "{style}: {d}");
    }
}

#[test]
fn exponential_sweep_hits_endpoints_and_geometric_midpoint() {
    assert!((exp_sweep(100.0, 400.0, 0.0) - 100.0).abs() < 1e-9);
    assert!((exp_sweep(100.0, 400.0, 1.0) - 400.0).abs() < 1e-9);
    assert!((exp_sweep(100.0, 400.0, 0.5) - 200.0).abs() < 1e-9);
}

#[test]
fn rendered_whoosh_is_bounded_and_fades_out() {
    let shape = whoosh_for_style(StyleTag::Left);
    let samples = render_whoosh(&shape, 0.8, 8_000);
    assert_eq!(samples.len(), (0.45f64 * 8_000.0).ceil() as usize);
    assert!(samples.iter().all(|s| s.abs() <= 1.0));
    assert!(samples.iter().any(|s| s.abs() > 0.05));
    assert!(samples.last().unwrap().abs() < 0.01);
}
