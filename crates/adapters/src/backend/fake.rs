// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake backend with call recording for testing

use super::{DecrementError, FeedingBackend, FetchError, StockBackend, StockSyncError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use trough_core::{Program, ProgramId, ProgramPatch, Stock, StockId};

/// Recorded call to a backend operation
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    ListPrograms,
    DecrementQuantity {
        program_id: String,
        amount: f64,
    },
    UpdateProgram {
        program_id: String,
        quantity_remaining: Option<f64>,
    },
    DecrementStock {
        stock_id: String,
        amount: f64,
    },
    ListStocks,
}

type DecrementHook = Arc<dyn Fn() + Send + Sync>;

/// Shared state for the fake backend
#[derive(Default)]
struct FakeState {
    programs: Vec<Program>,
    stocks: Vec<Stock>,
    calls: Vec<BackendCall>,
    // Configurable failure modes
    fail_list: bool,
    fail_decrements: bool,
    fail_updates: bool,
    fail_stock: bool,
    // Invoked while a decrement call is "in flight"
    decrement_hook: Option<DecrementHook>,
}

/// In-memory backend that behaves like the remote store
///
/// The fake owns the authoritative program set: a decrement mutates its
/// copy server-side and returns the updated program, exactly like the
/// real API.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed the authoritative program set
    pub fn set_programs(&self, programs: Vec<Program>) {
        self.lock().programs = programs;
    }

    /// Seed the stock entries
    pub fn set_stocks(&self, stocks: Vec<Stock>) {
        self.lock().stocks = stocks;
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// Clear recorded calls
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current server-side view of a program
    pub fn program(&self, id: &str) -> Option<Program> {
        self.lock()
            .programs
            .iter()
            .find(|p| p.id.as_ref().is_some_and(|pid| pid.0 == id))
            .cloned()
    }

    pub fn fail_list(&self, fail: bool) {
        self.lock().fail_list = fail;
    }

    pub fn fail_decrements(&self, fail: bool) {
        self.lock().fail_decrements = fail;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.lock().fail_updates = fail;
    }

    pub fn fail_stock(&self, fail: bool) {
        self.lock().fail_stock = fail;
    }

    /// Run a closure in the middle of every decrement call, before the
    /// response is produced. Used to interleave stops with in-flight
    /// ticks.
    pub fn set_decrement_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.lock().decrement_hook = Some(Arc::new(hook));
    }
}

#[async_trait]
impl FeedingBackend for FakeBackend {
    async fn list_programs(&self) -> Result<Vec<Program>, FetchError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::ListPrograms);
        if state.fail_list {
            return Err(FetchError::Transport("fake: list failed".to_string()));
        }
        Ok(state.programs.clone())
    }

    async fn decrement_quantity(
        &self,
        id: &ProgramId,
        amount: f64,
    ) -> Result<Program, DecrementError> {
        let hook = {
            let mut state = self.lock();
            state.calls.push(BackendCall::DecrementQuantity {
                program_id: id.0.clone(),
                amount,
            });
            state.decrement_hook.clone()
        };
        if let Some(hook) = hook {
            hook();
        }

        let mut state = self.lock();
        if state.fail_decrements {
            return Err(DecrementError::Transport(
                "fake: decrement failed".to_string(),
            ));
        }
        let program = state
            .programs
            .iter_mut()
            .find(|p| p.id.as_ref() == Some(id))
            .ok_or_else(|| DecrementError::Rejected(format!("unknown program: {id}")))?;
        program.quantity_remaining = (program.quantity_remaining - amount).max(0.0);
        Ok(program.clone())
    }

    async fn update_program(
        &self,
        id: &ProgramId,
        patch: &ProgramPatch,
    ) -> Result<Program, DecrementError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::UpdateProgram {
            program_id: id.0.clone(),
            quantity_remaining: patch.quantity_remaining,
        });
        if state.fail_updates {
            return Err(DecrementError::Transport("fake: update failed".to_string()));
        }
        let program = state
            .programs
            .iter_mut()
            .find(|p| p.id.as_ref() == Some(id))
            .ok_or_else(|| DecrementError::Rejected(format!("unknown program: {id}")))?;
        if let Some(quantity) = patch.quantity_remaining {
            program.quantity_remaining = quantity;
        }
        Ok(program.clone())
    }
}

#[async_trait]
impl StockBackend for FakeBackend {
    async fn decrement_stock(&self, id: &StockId, amount: f64) -> Result<(), StockSyncError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::DecrementStock {
            stock_id: id.0.clone(),
            amount,
        });
        if state.fail_stock {
            return Err(StockSyncError::Failed("fake: stock failed".to_string()));
        }
        if let Some(stock) = state.stocks.iter_mut().find(|s| &s.id == id) {
            stock.quantity = (stock.quantity - amount).max(0.0);
        }
        Ok(())
    }

    async fn list_stocks(&self) -> Result<Vec<Stock>, FetchError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::ListStocks);
        if state.fail_list {
            return Err(FetchError::Transport("fake: list failed".to_string()));
        }
        Ok(state.stocks.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
