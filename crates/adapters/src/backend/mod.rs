// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend adapters for the feeding and stock persistence layer
//!
//! The dashboard's REST API owns the data; these traits are the only
//! surface the scheduler core sees. Every operation is keyed by an opaque
//! string identifier and every failure maps onto one of the three error
//! families the engine knows how to absorb.

mod http;

pub use http::HttpBackend;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeBackend};

use async_trait::async_trait;
use thiserror::Error;
use trough_core::{Program, ProgramId, ProgramPatch, Stock, StockId};

/// Errors from fetching snapshots; the caller keeps its stale cache
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Errors from a remote decrement or update; terminal for the tick only
#[derive(Debug, Error)]
pub enum DecrementError {
    #[error("decrement rejected: {0}")]
    Rejected(String),
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Errors from a linked stock decrement after the feeding decrement
/// already succeeded; logged, never compensated
#[derive(Debug, Error)]
pub enum StockSyncError {
    #[error("stock decrement failed: {0}")]
    Failed(String),
    #[error("backend unreachable: {0}")]
    Transport(String),
}

/// Adapter for the feeding-program persistence operations
#[async_trait]
pub trait FeedingBackend: Clone + Send + Sync + 'static {
    /// Fetch the full program snapshot
    async fn list_programs(&self) -> Result<Vec<Program>, FetchError>;

    /// Atomic server-side decrement; the returned program carries the
    /// authoritative remaining quantity
    async fn decrement_quantity(
        &self,
        id: &ProgramId,
        amount: f64,
    ) -> Result<Program, DecrementError>;

    /// Partial update, used to persist a zeroed-out quantity
    async fn update_program(
        &self,
        id: &ProgramId,
        patch: &ProgramPatch,
    ) -> Result<Program, DecrementError>;
}

/// Adapter for the stock persistence operations
#[async_trait]
pub trait StockBackend: Clone + Send + Sync + 'static {
    /// Co-decrement a stock entry linked to a program
    async fn decrement_stock(&self, id: &StockId, amount: f64) -> Result<(), StockSyncError>;

    /// Fetch all stock entries
    async fn list_stocks(&self) -> Result<Vec<Stock>, FetchError>;
}
