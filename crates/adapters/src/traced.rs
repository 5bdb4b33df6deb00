// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced backend wrapper for consistent observability

use crate::backend::{
    DecrementError, FeedingBackend, FetchError, StockBackend, StockSyncError,
};
use async_trait::async_trait;
use trough_core::{Program, ProgramId, ProgramPatch, Stock, StockId};

/// Wrapper that adds tracing to any backend
#[derive(Clone)]
pub struct TracedBackend<B> {
    inner: B,
}

impl<B> TracedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: FeedingBackend> FeedingBackend for TracedBackend<B> {
    async fn list_programs(&self) -> Result<Vec<Program>, FetchError> {
        let span = tracing::info_span!("backend.list_programs");
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.list_programs().await;
        let elapsed = start.elapsed();

        match &result {
            Ok(programs) => tracing::debug!(
                count = programs.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "fetched"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "fetch failed"
            ),
        }

        result
    }

    async fn decrement_quantity(
        &self,
        id: &ProgramId,
        amount: f64,
    ) -> Result<Program, DecrementError> {
        let span = tracing::info_span!("backend.decrement", program = %id);
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.decrement_quantity(id, amount).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(program) => tracing::debug!(
                amount,
                remaining = program.quantity_remaining,
                elapsed_ms = elapsed.as_millis() as u64,
                "decremented"
            ),
            Err(e) => tracing::warn!(
                amount,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "decrement failed"
            ),
        }

        result
    }

    async fn update_program(
        &self,
        id: &ProgramId,
        patch: &ProgramPatch,
    ) -> Result<Program, DecrementError> {
        let span = tracing::info_span!("backend.update", program = %id);
        let _guard = span.enter();

        let result = self.inner.update_program(id, patch).await;
        match &result {
            Ok(_) => tracing::debug!("updated"),
            Err(e) => tracing::warn!(error = %e, "update failed"),
        }

        result
    }
}

#[async_trait]
impl<B: StockBackend> StockBackend for TracedBackend<B> {
    async fn decrement_stock(&self, id: &StockId, amount: f64) -> Result<(), StockSyncError> {
        let span = tracing::info_span!("backend.decrement_stock", stock = %id);
        let _guard = span.enter();

        let result = self.inner.decrement_stock(id, amount).await;
        match &result {
            Ok(()) => tracing::debug!(amount, "stock decremented"),
            Err(e) => tracing::warn!(amount, error = %e, "stock decrement failed"),
        }

        result
    }

    async fn list_stocks(&self) -> Result<Vec<Stock>, FetchError> {
        let result = self.inner.list_stocks().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "stock fetch failed");
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
