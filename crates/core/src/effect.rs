// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events for driver orchestration

use crate::driver::StopReason;
use crate::program::{ProgramId, ResourceType, StockId};
use std::time::Duration;

/// Effects are side effects that the driver state machine requests
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Emit an event for observers
    Emit(Event),
    /// Arm a timer (repeating timers re-fire until cancelled)
    SetTimer {
        id: String,
        duration: Duration,
        repeating: bool,
    },
    /// Cancel a timer
    CancelTimer { id: String },
    /// Persist a zeroed quantity for an exhausted program (best-effort)
    PersistExhausted { program_id: ProgramId },
}

/// Events emitted by the scheduler core
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DriverStarted {
        resource: ResourceType,
    },
    DriverStopped {
        resource: ResourceType,
        reason: StopReason,
    },
    QuantityDecremented {
        program_id: ProgramId,
        resource: ResourceType,
        amount: f64,
        remaining: f64,
    },
    ProgramExhausted {
        program_id: ProgramId,
    },
    TickFailed {
        resource: ResourceType,
        error: String,
    },
    StockSyncFailed {
        stock_id: StockId,
        error: String,
    },
    SnapshotRefreshed {
        programs: usize,
    },
    RefreshFailed {
        error: String,
    },
    GaugesRecomputed {
        feed_pct: f64,
        water_pct: f64,
    },
    DailyCountersReset,
}

impl Event {
    /// Get the event name for log fields and notification rules
    /// Format: "category:action"
    pub fn name(&self) -> &'static str {
        match self {
            Event::DriverStarted { .. } => "driver:started",
            Event::DriverStopped { .. } => "driver:stopped",
            Event::QuantityDecremented { .. } => "tick:applied",
            Event::ProgramExhausted { .. } => "program:exhausted",
            Event::TickFailed { .. } => "tick:failed",
            Event::StockSyncFailed { .. } => "stock:sync-failed",
            Event::SnapshotRefreshed { .. } => "snapshot:refreshed",
            Event::RefreshFailed { .. } => "snapshot:refresh-failed",
            Event::GaugesRecomputed { .. } => "gauges:recomputed",
            Event::DailyCountersReset => "stats:reset",
        }
    }
}
