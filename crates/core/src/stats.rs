// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daily consumption counters and midnight arithmetic

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-driver counters, zeroed at local midnight
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Total quantity distributed since the last reset
    pub consumed: f64,
    /// Number of applied decrements since the last reset
    pub distributions: u64,
}

impl DailyStats {
    pub fn record(&mut self, amount: f64) {
        self.consumed += amount;
        self.distributions += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Time until the next local midnight, used to arm the daily reset.
///
/// Returns zero if the computed deadline is not in the future (only
/// reachable at the calendar's representable edge).
pub fn until_next_midnight(now: NaiveDateTime) -> Duration {
    let tomorrow = now.date().succ_opt().unwrap_or(now.date());
    let next_midnight = tomorrow.and_time(NaiveTime::MIN);
    (next_midnight - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
