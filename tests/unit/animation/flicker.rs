use std::collections::HashSet;

use super::*;

fn fonts(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Font {i}")).collect()
}

#[test]
fn no_repeat_within_one_pool_cycle() {
    let mut pool = FlickerFonts::new(fonts(7), 42).unwrap();
    for _cycle in 0..5 {
        let mut seen = HashSet::new();
        for _ in 0..pool.len() {
            let f = pool.next_font().to_owned();
            assert!(seen.insert(f), "font repeated before the pool was exhausted");
        }
        assert_eq!(seen.len(), 7);
    }
}

#[test]
fn no_back_to_back_repeat_across_refills() {
    let mut pool = FlickerFonts::new(fonts(3), 7).unwrap();
    let mut prev = pool.next_font().to_owned();
    for _ in 0..300 {
        let cur = pool.next_font().to_owned();
        assert_ne!(cur, prev);
        prev = cur;
    }
}

#[test]
fn single_font_pool_repeats_itself() {
    let mut pool = FlickerFonts::new(vec!["Only".to_owned()], 1).unwrap();
    assert_eq!(pool.next_font(), "Only");
    assert_eq!(pool.next_font(), "Only");
}

#[test]
fn empty_and_duplicate_fonts() {
    assert!(FlickerFonts::new(vec![" ".to_owned()], 1).is_err());
    let pool = FlickerFonts::new(vec!["A".into(), "A".into(), "B".into()], 1).unwrap();
    assert_eq!(pool.len(), 2);
}

#[test]
fn same_seed_same_sequence() {
    let mut a = FlickerFonts::new(fonts(5), 9).unwrap();
    let mut b = FlickerFonts::new(fonts(5), 9).unwrap();
    for _ in 0..20 {
        assert_eq!(a.next_font(), b.next_font());
    }
}

#[test]
fn schedule_swaps_once_per_tick() {
    let fps = Fps::per_second(30).unwrap();
    let pool = FlickerFonts::new(fonts(4), 3).unwrap();
    let mut sched = FlickerSchedule::new(pool, 100).unwrap();

    // 100ms at 30fps covers frames 0..=2 (0, 33.3, 66.6 ms).
    let f0 = sched.font_for_frame(0, fps).to_owned();
    assert_eq!(sched.font_for_frame(1, fps), f0);
    assert_eq!(sched.font_for_frame(2, fps), f0);
    let f3 = sched.font_for_frame(3, fps).to_owned();
    assert_ne!(f3, f0);
    assert!(FlickerSchedule::new(FlickerFonts::new(fonts(2), 0).unwrap(), 0).is_err());
}
