// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tank-level gauges derived from remaining program quantities

use crate::program::ResourceType;
use crate::registry::ProgramRegistry;
use serde::{Deserialize, Serialize};

/// Assumed reservoir capacity in quantity units, per resource. Not derived
/// from reservoir hardware; the gauges are a simulation.
pub const TANK_CAPACITY: f64 = 100.0;

/// Percentage-full gauges for the feed and water reservoirs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TankLevels {
    pub feed_pct: f64,
    pub water_pct: f64,
}

impl TankLevels {
    /// Recompute both gauges from the registry snapshot.
    ///
    /// An empty registry yields zero on both gauges, and totals beyond the
    /// assumed capacity clamp to 100.
    pub fn recompute(registry: &ProgramRegistry) -> Self {
        Self {
            feed_pct: percent_full(registry.total_remaining(ResourceType::Feed)),
            water_pct: percent_full(registry.total_remaining(ResourceType::Water)),
        }
    }
}

fn percent_full(total: f64) -> f64 {
    (total * 100.0 / TANK_CAPACITY).clamp(0.0, 100.0)
}

#[cfg(test)]
#[path = "gauge_tests.rs"]
mod tests;
