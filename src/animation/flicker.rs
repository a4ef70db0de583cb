use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::foundation::core::Fps;
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Default time between font swaps.
pub const DEFAULT_FLICKER_INTERVAL_MS: u32 = 100;

/// Font pool sampled without replacement.
///
/// Every font is drawn once before any font repeats; the pool refills when exhausted. Across a
/// refill the previous pick is never drawn first, so the same font is never shown twice in a row
/// when more than one font exists.
#[derive(Debug)]
pub struct FlickerFonts {
    fonts: Vec<String>,
    remaining: Vec<usize>,
    last: Option<usize>,
    rng: StdRng,
}

impl FlickerFonts {
    /// Build a pool over `fonts` (duplicates removed, order kept).
    pub fn new(fonts: Vec<String>, seed: u64) -> KinetypeResult<Self> {
        let mut unique = Vec::<String>::with_capacity(fonts.len());
        for f in fonts {
            let f = f.trim().to_owned();
            if !f.is_empty() && !unique.contains(&f) {
                unique.push(f);
            }
        }
        if unique.is_empty() {
            return Err(KinetypeError::validation(
                "font flicker needs at least one font family",
            ));
        }
        Ok(Self {
            fonts: unique,
            remaining: Vec::new(),
            last: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Number of distinct fonts in one pool cycle.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Always false; a pool holds at least one font.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Draw the next font.
    pub fn next_font(&mut self) -> &str {
        if self.remaining.is_empty() {
            self.remaining = (0..self.fonts.len()).collect();
        }

        let mut pick = self.rng.gen_range(0..self.remaining.len());
        if self.remaining.len() == self.fonts.len()
            && self.fonts.len() > 1
            && Some(self.remaining[pick]) == self.last
        {
            pick = (pick + 1) % self.remaining.len();
        }

        let idx = self.remaining.swap_remove(pick);
        self.last = Some(idx);
        &self.fonts[idx]
    }
}

/// Maps frames to flicker ticks and swaps the font once per new tick.
#[derive(Debug)]
pub struct FlickerSchedule {
    pool: FlickerFonts,
    interval_ms: u32,
    current_tick: Option<u64>,
    current: String,
}

impl FlickerSchedule {
    /// Schedule swapping fonts from `pool` every `interval_ms`.
    pub fn new(pool: FlickerFonts, interval_ms: u32) -> KinetypeResult<Self> {
        if interval_ms == 0 {
            return Err(KinetypeError::validation(
                "flicker interval must be > 0 ms",
            ));
        }
        Ok(Self {
            pool,
            interval_ms,
            current_tick: None,
            current: String::new(),
        })
    }

    /// Tick index covering `elapsed_secs`.
    pub fn tick_at(&self, elapsed_secs: f64) -> u64 {
        let ms = (elapsed_secs.max(0.0) * 1000.0).floor() as u64;
        ms / u64::from(self.interval_ms)
    }

    /// Tick index of frame `frame`, in exact integer milliseconds.
    pub fn tick_for_frame(&self, frame: u64, fps: Fps) -> u64 {
        let ms = u128::from(frame) * 1000 * u128::from(fps.den) / u128::from(fps.num);
        (ms / u128::from(self.interval_ms)) as u64
    }

    /// Font for the frame at `frame` (timeline order).
    pub fn font_for_frame(&mut self, frame: u64, fps: Fps) -> &str {
        let tick = self.tick_for_frame(frame, fps);
        self.font_for_tick(tick)
    }

    /// Font for flicker tick `tick`, drawing a new one when the tick changed.
    pub fn font_for_tick(&mut self, tick: u64) -> &str {
        if self.current_tick != Some(tick) {
            self.current_tick = Some(tick);
            self.current = self.pool.next_font().to_owned();
        }
        &self.current
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/flicker.rs"]
mod tests;
