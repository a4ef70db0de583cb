use super::*;

#[test]
fn fixed_step_yields_duration_times_fps_frames() {
    let fps = Fps::per_second(30).unwrap();
    let ticks: Vec<Tick> = Timeline::new(2.0, fps, Pacing::FixedStep)
        .unwrap()
        .collect();
    assert_eq!(ticks.len(), 60);
    assert_eq!(ticks[0].progress, 0.0);
    assert_eq!(ticks[59].progress, 1.0);
    assert_eq!(ticks[59].index, FrameIndex(59));
    for w in ticks.windows(2) {
        assert!(w[1].progress > w[0].progress);
        assert!((0.0..=1.0).contains(&w[1].progress));
    }
}

#[test]
fn fixed_step_is_not_restartable() {
    let fps = Fps::per_second(10).unwrap();
    let mut t = Timeline::new(0.3, fps, Pacing::FixedStep).unwrap();
    assert_eq!(t.by_ref().count(), 3);
    assert!(t.next().is_none());
    assert!(t.next().is_none());
}

#[test]
fn tiny_duration_still_produces_one_complete_frame() {
    let fps = Fps::per_second(30).unwrap();
    let ticks: Vec<Tick> = Timeline::new(0.001, fps, Pacing::FixedStep)
        .unwrap()
        .collect();
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].progress, 1.0);
}

#[test]
fn invalid_durations_are_rejected() {
    let fps = Fps::per_second(30).unwrap();
    assert!(Timeline::new(0.0, fps, Pacing::FixedStep).is_err());
    assert!(Timeline::new(-1.0, fps, Pacing::FixedStep).is_err());
    assert!(Timeline::new(f64::NAN, fps, Pacing::WallClock).is_err());
}

#[test]
fn wall_clock_terminates_once_at_full_progress() {
    let fps = Fps::per_second(50).unwrap();
    let t = Timeline::new(0.1, fps, Pacing::WallClock).unwrap();
    let max = t.total_frames();
    let ticks: Vec<Tick> = t.collect();
    assert!(!ticks.is_empty());
    assert!(ticks.len() as u64 <= max);
    assert_eq!(ticks.last().unwrap().progress, 1.0);
    assert_eq!(
        ticks.iter().filter(|t| t.progress >= 1.0).count(),
        1,
        "exactly one terminal tick"
    );
    for w in ticks.windows(2) {
        assert!(w[1].progress >= w[0].progress);
    }
}
