// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the dashboard backend and operator notification

pub mod backend;
pub mod notify;
pub mod traced;

pub use backend::{
    DecrementError, FeedingBackend, FetchError, HttpBackend, StockBackend, StockSyncError,
};
pub use notify::{LogNotifier, NoOpNotifier, Notification, NotifyAdapter, NotifyUrgency};
pub use traced::TracedBackend;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use backend::{BackendCall, FakeBackend};
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifier;
