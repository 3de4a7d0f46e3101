use crate::model::config::TimerMode;

/// Result of feeding one tick into a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Still counting; seconds left after this tick.
    Running(u32),
    /// The clock is paused and did not move.
    Suspended,
    /// The clock hit zero on this tick.
    Expired,
}

/// One-second-granularity countdown driven by explicit ticks.
///
/// In per-question mode an expiry rearms the clock at `duration`; in
/// whole-quiz mode it stays at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    mode: TimerMode,
    duration: u32,
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(mode: TimerMode, duration: u32) -> Self {
        Self {
            mode,
            duration,
            remaining: duration,
        }
    }

    #[must_use]
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    /// Consume one tick. `suspended` only has an effect in per-question mode.
    pub fn tick(&mut self, suspended: bool) -> CountdownTick {
        match self.mode {
            TimerMode::PerQuestion if suspended => CountdownTick::Suspended,
            TimerMode::PerQuestion => {
                if self.remaining <= 1 {
                    self.reset();
                    CountdownTick::Expired
                } else {
                    self.remaining -= 1;
                    CountdownTick::Running(self.remaining)
                }
            }
            TimerMode::WholeQuiz => {
                if self.remaining == 0 {
                    return CountdownTick::Expired;
                }
                self.remaining -= 1;
                if self.remaining == 0 {
                    CountdownTick::Expired
                } else {
                    CountdownTick::Running(self.remaining)
                }
            }
        }
    }
}
