// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consumption driver state machine
//!
//! One driver per resource type simulates consumption by requesting a
//! fixed-step decrement of the active program on every tick. The machine
//! here is pure: timer arming, remote calls, and registry mutation are
//! effects executed by the engine. Tick outcomes (`Applied`/`Failed`)
//! arrive as events after the remote call completes; outcomes delivered
//! after `Stop` are discarded by the no-op transition rules, so a slow
//! in-flight call can never reanimate a stopped driver.

use crate::effect::{Effect, Event};
use crate::program::{ProgramId, ResourceType};
use crate::stats::DailyStats;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Quantity removed from the active program on each applied tick
pub const DECREMENT_STEP: f64 = 0.5;

/// Cadence of the exhaustion scan for drivers with `reconcile` set
pub const RECONCILE_INTERVAL: Duration = Duration::from_secs(60);

const FEED_TICK_INTERVAL: Duration = Duration::from_secs(2);
const WATER_TICK_INTERVAL: Duration = Duration::from_secs(3);

/// What a driver does when a remote decrement fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log and keep ticking; the tick produced no effect
    Continue,
    /// Stop the driver
    Stop,
}

/// Configuration for one consumption driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub resource: ResourceType,
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    pub step: f64,
    pub on_failure: FailurePolicy,
    /// Arm the periodic exhaustion scan that stops the driver once no
    /// runnable program of its type remains
    pub reconcile: bool,
}

impl DriverConfig {
    /// The feed driver: 2s cadence, keeps running through decrement
    /// failures, self-stops via the reconcile scan when exhausted.
    pub fn feed() -> Self {
        Self {
            resource: ResourceType::Feed,
            tick_interval: FEED_TICK_INTERVAL,
            step: DECREMENT_STEP,
            on_failure: FailurePolicy::Continue,
            reconcile: true,
        }
    }

    /// The water driver: 3s cadence, stops on the first decrement failure.
    pub fn water() -> Self {
        Self {
            resource: ResourceType::Water,
            tick_interval: WATER_TICK_INTERVAL,
            step: DECREMENT_STEP,
            on_failure: FailurePolicy::Stop,
            reconcile: false,
        }
    }
}

/// The current state of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverState::Stopped => write!(f, "stopped"),
            DriverState::Running => write!(f, "running"),
        }
    }
}

/// Why a driver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Explicit stop request
    Requested,
    /// Reconcile scan found no runnable program left
    Exhausted,
    /// A decrement failed under `FailurePolicy::Stop`
    DecrementFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Requested => write!(f, "requested"),
            StopReason::Exhausted => write!(f, "exhausted"),
            StopReason::DecrementFailed => write!(f, "decrement failed"),
        }
    }
}

/// Events that can transition a driver's state
#[derive(Debug, Clone)]
pub enum DriverEvent {
    /// Start ticking. Guarded: starting with zero programs of the
    /// driver's resource type is a no-op (cannot activate an empty
    /// schedule).
    Start { program_count: usize },
    /// Stop ticking; idempotent
    Stop { reason: StopReason },
    /// A remote decrement confirmed; `remaining` is the local cache value
    /// after applying the step
    Applied {
        program_id: ProgramId,
        amount: f64,
        remaining: f64,
    },
    /// A remote decrement failed this tick
    Failed { error: String },
    /// Midnight reset of the daily counters
    ResetCounters,
}

/// A per-resource consumption driver
#[derive(Debug, Clone)]
pub struct Driver {
    pub config: DriverConfig,
    pub state: DriverState,
    pub daily: DailyStats,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            state: DriverState::Stopped,
            daily: DailyStats::default(),
        }
    }

    /// Timer ID for the tick timer
    pub fn timer_id(&self) -> String {
        format!("driver:{}", self.config.resource)
    }

    /// Timer ID for the exhaustion scan
    pub fn reconcile_timer_id(&self) -> String {
        format!("reconcile:{}", self.config.resource)
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Pure state transition returning the new driver and effects
    pub fn transition(&self, event: DriverEvent) -> (Self, Vec<Effect>) {
        match (&self.state, event) {
            // Start a stopped driver; empty schedules cannot be activated
            (DriverState::Stopped, DriverEvent::Start { program_count }) => {
                if program_count == 0 {
                    return (self.clone(), vec![]);
                }
                let new_state = Driver {
                    state: DriverState::Running,
                    ..self.clone()
                };
                let mut effects = vec![Effect::SetTimer {
                    id: self.timer_id(),
                    duration: self.config.tick_interval,
                    repeating: true,
                }];
                if self.config.reconcile {
                    effects.push(Effect::SetTimer {
                        id: self.reconcile_timer_id(),
                        duration: RECONCILE_INTERVAL,
                        repeating: true,
                    });
                }
                effects.push(Effect::Emit(Event::DriverStarted {
                    resource: self.config.resource,
                }));
                (new_state, effects)
            }

            // Stop a running driver
            (DriverState::Running, DriverEvent::Stop { reason }) => {
                let new_state = Driver {
                    state: DriverState::Stopped,
                    ..self.clone()
                };
                let mut effects = vec![Effect::CancelTimer {
                    id: self.timer_id(),
                }];
                if self.config.reconcile {
                    effects.push(Effect::CancelTimer {
                        id: self.reconcile_timer_id(),
                    });
                }
                effects.push(Effect::Emit(Event::DriverStopped {
                    resource: self.config.resource,
                    reason,
                }));
                (new_state, effects)
            }

            // A confirmed decrement while running
            (
                DriverState::Running,
                DriverEvent::Applied {
                    program_id,
                    amount,
                    remaining,
                },
            ) => {
                let mut new_state = self.clone();
                new_state.daily.record(amount);
                let mut effects = vec![Effect::Emit(Event::QuantityDecremented {
                    program_id: program_id.clone(),
                    resource: self.config.resource,
                    amount,
                    remaining,
                })];
                if remaining <= 0.0 {
                    effects.push(Effect::PersistExhausted {
                        program_id: program_id.clone(),
                    });
                    effects.push(Effect::Emit(Event::ProgramExhausted { program_id }));
                }
                (new_state, effects)
            }

            // A failed decrement while running; policy decides the fate
            (DriverState::Running, DriverEvent::Failed { error }) => {
                let failed = Effect::Emit(Event::TickFailed {
                    resource: self.config.resource,
                    error,
                });
                match self.config.on_failure {
                    FailurePolicy::Continue => (self.clone(), vec![failed]),
                    FailurePolicy::Stop => {
                        let (stopped, mut effects) = self.transition(DriverEvent::Stop {
                            reason: StopReason::DecrementFailed,
                        });
                        effects.insert(0, failed);
                        (stopped, effects)
                    }
                }
            }

            // Counters reset regardless of state
            (_, DriverEvent::ResetCounters) => {
                let mut new_state = self.clone();
                new_state.daily.reset();
                (new_state, vec![])
            }

            // Invalid transitions are no-ops. This covers double-stop
            // idempotence and tick outcomes landing after a stop.
            _ => (self.clone(), vec![]),
        }
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
