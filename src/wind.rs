//! Horizontal wind: per-season base breeze, noise, and a decaying gust.

use serde::{Deserialize, Serialize};

use crate::noise::{breeze_noise, WIND_SEED};

/// Fraction of the noisy base breeze that reaches the particles.
pub const BREEZE_DAMPING: f64 = 0.6;
/// Per-tick multiplier applied to the residual gust.
pub const GUST_DECAY: f64 = 0.95;
/// Gusts weaker than this (px/s) snap to exactly zero.
pub const GUST_EPSILON: f64 = 1.0;

/// Wind strengths for a season, in pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindProfile {
    /// Steady breeze the noise modulates around
    pub base: f64,
    /// Impulse applied when the user pokes the scene
    pub gust: f64,
}

/// Wind state shared by every particle in a frame.
///
/// Holds only the residual gust; the breeze itself is a pure function of
/// time, see [`breeze_noise`].
#[derive(Debug, Clone, Default)]
pub struct WindField {
    gust: f64,
}

impl WindField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current residual gust magnitude (never negative).
    pub fn gust(&self) -> f64 {
        self.gust
    }

    /// Whether the gust has fully died down.
    pub fn is_calm(&self) -> bool {
        self.gust == 0.0
    }

    /// Start a gust. A weaker gust never cuts a stronger one short.
    pub fn trigger(&mut self, magnitude: f64) {
        // NaN fails this comparison too
        if !(magnitude > 0.0) {
            return;
        }
        self.gust = self.gust.max(magnitude);
    }

    /// Wind for the frame at `t_ms`, then decay the gust by one tick.
    pub fn sample(&mut self, t_ms: f64, base: f64) -> f64 {
        let noise = breeze_noise(t_ms, WIND_SEED);
        let mut wind_x = (base + noise * base) * BREEZE_DAMPING;

        if self.gust > 0.0 {
            wind_x += self.gust;
            self.gust *= GUST_DECAY;
            if self.gust < GUST_EPSILON {
                self.gust = 0.0;
            }
        }

        wind_x
    }
}
