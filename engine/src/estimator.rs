//! Wait-time estimation.
//!
//! A deliberately simple model: `minutes = position × average service
//! duration`. The average derives from the gaps between the office's
//! most recent completion timestamps - under the auto-completing
//! `call_next` model, the gap between two consecutive completions *is*
//! the time the later token spent at the counter. With no history (cold
//! start, new office) the office's configured default applies.
//!
//! Estimates are advisory only. Nothing here blocks or fails: a store
//! hiccup while fetching history degrades to the default, never to an
//! error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estimator tunables.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// How many recent completions to average over.
    pub history_window: u32,
    /// Lower clamp for the derived per-token average, in minutes.
    pub min_service_minutes: u32,
    /// Upper clamp for the derived per-token average, in minutes.
    pub max_service_minutes: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            min_service_minutes: 2,
            max_service_minutes: 120,
        }
    }
}

/// Advisory wait-time estimator.
#[derive(Clone, Copy, Debug)]
pub struct WaitEstimator {
    config: EstimatorConfig,
}

impl WaitEstimator {
    /// Create an estimator with the given tunables.
    #[must_use]
    pub const fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// How many completions to request from the store.
    #[must_use]
    pub const fn history_window(&self) -> u32 {
        self.config.history_window
    }

    /// Derive the per-token average service duration from completion
    /// timestamps (newest first, as returned by the store).
    ///
    /// Gaps are measured between consecutive completions; non-positive
    /// gaps (clock skew) are discarded. Fewer than two usable points
    /// means no history - the default wins.
    #[must_use]
    pub fn average_minutes(&self, completions: &[DateTime<Utc>], default_minutes: u32) -> u32 {
        let gaps: Vec<i64> = completions
            .windows(2)
            .map(|pair| (pair[0] - pair[1]).num_seconds())
            .filter(|&secs| secs > 0)
            .collect();

        if gaps.is_empty() {
            return default_minutes;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mean_minutes = (gaps.iter().sum::<i64>() as f64 / gaps.len() as f64 / 60.0)
            .round()
            .max(0.0) as u32;

        mean_minutes.clamp(
            self.config.min_service_minutes,
            self.config.max_service_minutes,
        )
    }

    /// Estimated wait for a token at the given 1-based queue position.
    ///
    /// The position itself is the depth: a token at position 1 still
    /// waits for the counter to clear, so one full service duration is
    /// the floor.
    #[must_use]
    pub const fn estimate(&self, position: u32, average_minutes: u32) -> u32 {
        position.saturating_mul(average_minutes)
    }
}
