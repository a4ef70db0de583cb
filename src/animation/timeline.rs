use std::iter::FusedIterator;
use std::time::{Duration, Instant};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// How progress values are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// `progress = i / (N - 1)` over exactly `N = round(duration * fps)` frames, as fast as the
    /// consumer pulls.
    #[default]
    FixedStep,
    /// `progress = elapsed / duration` measured on the wall clock, one tick per frame period.
    WallClock,
}

/// One step of the timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Frame index in production order.
    pub index: FrameIndex,
    /// Normalized progress in `[0, 1]`.
    pub progress: f64,
    /// Time of this frame in seconds from the start.
    pub elapsed_secs: f64,
}

/// Lazy, finite, non-restartable sequence of progress values.
///
/// The last tick always carries `progress == 1.0` and the sequence ends right after it; loop
/// termination never depends on floating-point equality.
#[derive(Debug)]
pub struct Timeline {
    pacing: Pacing,
    fps: Fps,
    duration_secs: f64,
    total_frames: u64,
    next: u64,
    started: Option<Instant>,
    finished: bool,
}

impl Timeline {
    /// Timeline for `duration_secs` at `fps`.
    pub fn new(duration_secs: f64, fps: Fps, pacing: Pacing) -> KinetypeResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(KinetypeError::validation(
                "duration must be finite and > 0 seconds",
            ));
        }
        let total_frames = fps.secs_to_frames_round(duration_secs).max(1);
        Ok(Self {
            pacing,
            fps,
            duration_secs,
            total_frames,
            next: 0,
            started: None,
            finished: false,
        })
    }

    /// Frames a fixed-step timeline yields (upper bound for wall-clock pacing).
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Configured pacing.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    fn fixed_step(&mut self) -> Option<Tick> {
        if self.next >= self.total_frames {
            self.finished = true;
            return None;
        }
        let i = self.next;
        self.next += 1;
        let progress = if i + 1 >= self.total_frames {
            1.0
        } else {
            i as f64 / (self.total_frames - 1) as f64
        };
        if i + 1 >= self.total_frames {
            self.finished = true;
        }
        Some(Tick {
            index: FrameIndex(i),
            progress,
            elapsed_secs: progress * self.duration_secs,
        })
    }

    fn wall_clock(&mut self) -> Option<Tick> {
        let start = *self.started.get_or_insert_with(Instant::now);
        let i = self.next;
        let deadline = start + Duration::from_secs_f64(self.fps.frames_to_secs(i));
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }

        let elapsed = start.elapsed().as_secs_f64();
        let mut progress = (elapsed / self.duration_secs).min(1.0);
        // Never produce more frames than the declared duration holds.
        if i + 1 >= self.total_frames {
            progress = 1.0;
        }
        self.next += 1;
        if progress >= 1.0 {
            self.finished = true;
        }
        Some(Tick {
            index: FrameIndex(i),
            progress,
            elapsed_secs: elapsed.min(self.duration_secs),
        })
    }
}

impl Iterator for Timeline {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.finished {
            return None;
        }
        match self.pacing {
            Pacing::FixedStep => self.fixed_step(),
            Pacing::WallClock => self.wall_clock(),
        }
    }
}

impl FusedIterator for Timeline {}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
