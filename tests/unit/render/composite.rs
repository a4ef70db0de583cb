use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    assert_eq!(over(dst, [200, 200, 200, 200], 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 0], 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255], 1.0), [255, 0, 0, 255]);
}

#[test]
fn over_half_opacity_mixes() {
    let out = over([0, 255, 0, 255], [255, 255, 255, 255], 0.5);
    assert_eq!(out[3], 255);
    assert!((126..=130).contains(&out[0]));
    assert_eq!(out[1], 255);
}

#[test]
fn over_in_place_checks_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
    over_in_place(&mut dst, &[9, 9, 9, 255, 0, 0, 0, 0], 1.0).unwrap();
    assert_eq!(dst, vec![9, 9, 9, 255, 0, 0, 0, 0]);
}

#[test]
fn tinted_plane_is_clipped_to_surface() {
    let mut dst = vec![0u8; 4 * 4 * 4];
    fill(&mut dst, [0, 255, 0, 255]);
    let plane = AlphaPlane {
        x: -1,
        y: 2,
        width: 3,
        height: 3,
        data: vec![255; 9],
    };
    tinted_plane_over(&mut dst, 4, 4, &plane, [0, 0, 0, 255], 1.0).unwrap();

    let px = |x: usize, y: usize| &dst[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
    assert_eq!(px(0, 2), &[0, 0, 0, 255]);
    assert_eq!(px(1, 3), &[0, 0, 0, 255]);
    assert_eq!(px(2, 2), &[0, 255, 0, 255]);
    assert_eq!(px(0, 1), &[0, 255, 0, 255]);
}

#[test]
fn tinted_plane_scales_color_by_coverage() {
    let mut dst = vec![0u8; 4];
    let plane = AlphaPlane {
        x: 0,
        y: 0,
        width: 1,
        height: 1,
        data: vec![51],
    };
    tinted_plane_over(&mut dst, 1, 1, &plane, [0, 0, 0, 153], 1.0).unwrap();
    assert_eq!(dst[3], 31);
}
