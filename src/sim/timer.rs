//! Cooldown and interval counters

use serde::{Deserialize, Serialize};

use crate::consts::TIMER_EPSILON;

/// Countdown that re-arms to its interval when triggered.
///
/// Callers check `is_ready` and decide whether to `trigger`, so an attack
/// with no valid target can hold a ready cooldown indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    remaining: f32,
    interval: f32,
}

impl Cooldown {
    /// Starts armed: the first trigger happens one interval from now
    pub fn new(interval: f32) -> Self {
        Self {
            remaining: interval,
            interval,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining -= dt;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= TIMER_EPSILON
    }

    pub fn trigger(&mut self) {
        self.remaining = self.interval;
    }

    /// Change the interval, keeping the time already served
    pub fn set_interval(&mut self, interval: f32) {
        self.interval = interval;
        self.remaining = self.remaining.min(interval);
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Periodic timer that fires once per elapsed interval and carries the
/// remainder over, so `n` seconds of ticks fire `floor(n / interval)` times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalTimer {
    elapsed: f32,
    interval: f32,
}

impl IntervalTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            elapsed: 0.0,
            interval,
        }
    }

    /// Advance by `dt`; true when the interval boundary was crossed
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed + TIMER_EPSILON >= self.interval {
            self.elapsed -= self.interval;
            // a single tick longer than the interval still fires once
            if self.elapsed >= self.interval {
                self.elapsed = 0.0;
            }
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }
}
