//! Tick scheduling - turns elapsed wall-clock time into fixed-size updates.
//!
//! Foreground time arrives every rendered frame; background time arrives in
//! coarse chunks while nothing is drawn. Both feed one accumulator that is
//! drained in `fixed_step` increments, so the agents see the same sequence
//! of `update(dt)` calls for the same total elapsed time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Length of one simulation step in seconds
    pub fixed_step: f32,
    /// Largest `dt` a single update accepts
    pub max_dt: f32,
    /// Background time is consumed in whole chunks of this size
    pub background_interval: f32,
    /// Cap on simulated catch-up per `advance` call
    pub max_catch_up_secs: f32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            fixed_step: 0.05,
            max_dt: 0.1,
            background_interval: 0.5,
            max_catch_up_secs: 3600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickRegime {
    /// Per-frame clock while the room is on screen
    Foreground,
    /// Coarse timer while the presentation layer is asleep
    Background,
}

/// Fixed-step accumulator shared by both regimes
#[derive(Debug, Clone)]
pub struct TickDriver {
    config: ScheduleConfig,
    accumulator: f32,
    /// Background time not yet worth a whole interval
    background_pending: f32,
}

impl TickDriver {
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            background_pending: 0.0,
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn step_size(&self) -> f32 {
        self.config.fixed_step
    }

    /// Time banked but not yet simulated
    pub fn backlog(&self) -> f32 {
        self.accumulator + self.background_pending
    }

    /// Bank `elapsed` seconds and return how many fixed steps are now due.
    pub fn advance(&mut self, elapsed: f32, regime: TickRegime) -> u32 {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        let elapsed = elapsed.min(self.config.max_catch_up_secs);

        match regime {
            TickRegime::Foreground => self.accumulator += elapsed,
            TickRegime::Background => {
                self.background_pending += elapsed;
                let interval = self.config.background_interval;
                if interval > 0.0 {
                    let chunks = (self.background_pending / interval).floor();
                    let consumed = chunks * interval;
                    self.background_pending -= consumed;
                    self.accumulator += consumed;
                } else {
                    self.accumulator += std::mem::take(&mut self.background_pending);
                }
            }
        }

        let step = self.config.fixed_step;
        if step <= 0.0 {
            self.accumulator = 0.0;
            return 0;
        }
        let steps = (self.accumulator / step).floor();
        self.accumulator -= steps * step;
        steps as u32
    }

    /// Clamp a caller-supplied `dt` into `[0, max_dt]`.
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if dt.is_finite() {
            dt.clamp(0.0, self.config.max_dt)
        } else {
            0.0
        }
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(ScheduleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dyadic() -> ScheduleConfig {
        ScheduleConfig {
            fixed_step: 0.0625,
            ..Default::default()
        }
    }

    #[test]
    fn test_foreground_accumulates_frames() {
        let mut driver = TickDriver::new(dyadic());
        let frame = 1.0 / 64.0;
        let steps: u32 = (0..64).map(|_| driver.advance(frame, TickRegime::Foreground)).sum();
        assert_eq!(steps, 16);
        assert_eq!(driver.backlog(), 0.0);
    }

    #[test]
    fn test_background_waits_for_whole_intervals() {
        let mut driver = TickDriver::new(dyadic());
        assert_eq!(driver.advance(0.25, TickRegime::Background), 0);
        assert_eq!(driver.advance(0.25, TickRegime::Background), 8);
        assert_eq!(driver.advance(0.375, TickRegime::Background), 0);
        assert_eq!(driver.backlog(), 0.375);
    }

    #[test]
    fn test_regimes_agree_on_total_steps() {
        let mut fg = TickDriver::new(dyadic());
        let mut bg = TickDriver::new(dyadic());
        let fg_steps: u32 = (0..640).map(|_| fg.advance(1.0 / 64.0, TickRegime::Foreground)).sum();
        let bg_steps: u32 = (0..40).map(|_| bg.advance(0.25, TickRegime::Background)).sum();
        assert_eq!(fg_steps, 160);
        assert_eq!(fg_steps, bg_steps);
    }

    #[test]
    fn test_bad_input_is_ignored_and_catch_up_capped() {
        let mut driver = TickDriver::default();
        assert_eq!(driver.advance(f32::NAN, TickRegime::Foreground), 0);
        assert_eq!(driver.advance(-3.0, TickRegime::Foreground), 0);

        let steps = driver.advance(1.0e9, TickRegime::Foreground);
        let expected = (3600.0 / 0.05_f32).floor() as u32;
        assert!(steps.abs_diff(expected) <= 1);
    }

    #[test]
    fn test_clamp_dt() {
        let driver = TickDriver::default();
        assert_eq!(driver.clamp_dt(5.0), 0.1);
        assert_eq!(driver.clamp_dt(-1.0), 0.0);
        assert_eq!(driver.clamp_dt(f32::INFINITY), 0.0);
        assert_eq!(driver.clamp_dt(0.02), 0.02);
    }
}
