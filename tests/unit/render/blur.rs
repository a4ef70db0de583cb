use super::*;

#[test]
fn radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4];
    assert_eq!(blur_alpha8(&src, 2, 2, 0, 1.0).unwrap(), src);
}

#[test]
fn radius_covers_three_sigma() {
    assert_eq!(radius_for_sigma(9.0), 27);
    assert_eq!(radius_for_sigma(0.0), 0);
    assert_eq!(radius_for_sigma(f32::NAN), 0);
}

#[test]
fn kernel_sums_to_one_q16() {
    let k = gaussian_kernel_q16(5, 2.0).unwrap();
    assert_eq!(k.len(), 11);
    assert_eq!(k.iter().sum::<u32>(), 65536);
    assert!(k[5] > k[4] && k[4] > k[0]);
}

#[test]
fn interior_of_constant_plane_is_unchanged() {
    let (w, h) = (9u32, 9u32);
    let src = vec![200u8; (w * h) as usize];
    let out = blur_alpha8(&src, w, h, 2, 1.0).unwrap();
    assert_eq!(out[(4 * w + 4) as usize], 200);
    // Edges fade because outside samples are transparent.
    assert!(out[0] < 200);
}

#[test]
fn single_pixel_spreads_and_keeps_energy() {
    let (w, h) = (9u32, 9u32);
    let mut src = vec![0u8; (w * h) as usize];
    src[(4 * w + 4) as usize] = 255;

    let out = blur_alpha8(&src, w, h, 3, 1.2).unwrap();
    assert!(out.iter().filter(|&&a| a != 0).count() > 1);
    let sum: i32 = out.iter().map(|&a| i32::from(a)).sum();
    assert!((sum - 255).abs() <= 12, "sum {sum}");
}

#[test]
fn size_mismatch_is_rejected() {
    assert!(blur_alpha8(&[0u8; 3], 2, 2, 1, 1.0).is_err());
    assert!(gaussian_kernel_q16(2, 0.0).is_err());
}
