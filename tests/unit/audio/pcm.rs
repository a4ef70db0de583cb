use super::*;

#[test]
fn mono_is_duplicated_into_stereo() {
    let pcm = AudioPcm::stereo_from_mono(&[0.5, -0.25], 48_000);
    assert_eq!(pcm.channels, 2);
    assert_eq!(pcm.interleaved_f32, vec![0.5, 0.5, -0.25, -0.25]);
    assert_eq!(pcm.frames(), 2);
    assert_eq!(pcm.peak(), 0.5);
}

#[test]
fn delay_prepends_silence_per_channel() {
    let mut pcm = AudioPcm::stereo_from_mono(&[1.0; 10], 100);
    pcm.delay(0.05);
    assert_eq!(pcm.frames(), 15);
    assert!(pcm.interleaved_f32[..10].iter().all(|s| *s == 0.0));
    assert_eq!(pcm.interleaved_f32[10], 1.0);
}

#[test]
fn duration_follows_frames() {
    let mut pcm = AudioPcm::stereo_from_mono(&[0.1; 200], 100);
    assert!((pcm.duration_secs() - 2.0).abs() < 1e-9);
    pcm.fit_to_secs(0.5);
    assert!((pcm.duration_secs() - 0.5).abs() < 1e-9);
}

#[test]
fn gain_scales_samples() {
    let mut pcm = AudioPcm::stereo_from_mono(&[1.0, -1.0], 10);
    pcm.apply_gain(0.25);
    assert_eq!(pcm.peak(), 0.25);
}

#[test]
fn fit_to_secs_pads_or_cuts() {
    let mut pcm = AudioPcm::stereo_from_mono(&[0.5; 10], 100);
    pcm.fit_to_secs(0.2);
    assert_eq!(pcm.frames(), 20);
    assert_eq!(pcm.interleaved_f32[18], 0.5);
    assert_eq!(pcm.interleaved_f32[39], 0.0);
    pcm.fit_to_secs(0.05);
    assert_eq!(pcm.frames(), 5);
}
