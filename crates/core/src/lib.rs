// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! trough-core: Domain core for the trough feeding scheduler
//!
//! This crate provides:
//! - Pure state machines for the per-resource consumption drivers
//! - Time-window evaluation for daily recurring feeding programs
//! - The in-memory program registry, tank gauges, and daily counters
//! - Effect-based orchestration (no I/O happens in this crate)

pub mod clock;

pub mod driver;
pub mod effect;
pub mod gauge;
pub mod program;
pub mod registry;
pub mod stats;
pub mod window;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use driver::{Driver, DriverConfig, DriverEvent, DriverState, FailurePolicy, StopReason};
pub use effect::{Effect, Event};
pub use gauge::{TankLevels, TANK_CAPACITY};
pub use program::{Program, ProgramId, ProgramPatch, ResourceType, Stock, StockId};
pub use registry::ProgramRegistry;
pub use stats::{until_next_midnight, DailyStats};
pub use window::{select_active_program, ClockTime, ParseTimeError, TimeWindow};
