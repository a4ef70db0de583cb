use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in [Ease::Linear, Ease::OutCubic] {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
    assert_eq!(ease_out_cubic(0.0), 0.0);
    assert_eq!(ease_out_cubic(1.0), 1.0);
}

#[test]
fn out_cubic_matches_closed_form() {
    for p in [0.1, 0.25, 0.5, 0.9] {
        let expected = 1.0 - (1.0 - p) * (1.0 - p) * (1.0 - p);
        assert!((ease_out_cubic(p) - expected).abs() < 1e-12);
    }
}

#[test]
fn out_cubic_is_monotonic_on_unit_interval() {
    let mut prev = ease_out_cubic(0.0);
    for i in 1..=1000 {
        let cur = ease_out_cubic(f64::from(i) / 1000.0);
        assert!(cur >= prev);
        prev = cur;
    }
}

#[test]
fn out_of_range_input_is_clamped() {
    assert_eq!(ease_out_cubic(-0.5), 0.0);
    assert_eq!(ease_out_cubic(1.5), 1.0);
    assert_eq!(ease_out_cubic(f64::NAN), 0.0);
}
