// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory view of the feeding programs for the current session
//!
//! The backend is the authority; the registry is a cache refreshed from the
//! feeding-list operation. A failed refresh keeps the previous snapshot in
//! place (stale but available). Decrements are applied locally after the
//! remote update confirms, and a later refresh reconciles any drift.

use crate::program::{Program, ProgramId, ResourceType};
use crate::window::select_active_program;

/// Snapshot of all known programs, in backend load order
#[derive(Debug, Clone, Default)]
pub struct ProgramRegistry {
    programs: Vec<Program>,
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a freshly fetched program list.
    ///
    /// Callers only invoke this on a successful fetch; failure semantics
    /// (keep the stale snapshot) live at the call site.
    pub fn replace_all(&mut self, programs: Vec<Program>) {
        for program in &programs {
            if let Some(window) = &program.window {
                if window.is_wraparound() {
                    tracing::warn!(
                        program = %program.id.as_ref().map(|id| id.0.as_str()).unwrap_or("<unsaved>"),
                        window = %window,
                        "overnight window never matches; program will stay inactive"
                    );
                }
            }
        }
        self.programs = programs;
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Number of programs of the given resource type
    pub fn count(&self, resource: ResourceType) -> usize {
        self.programs
            .iter()
            .filter(|p| p.resource == resource)
            .count()
    }

    /// Sum of remaining quantities for gauge computation
    pub fn total_remaining(&self, resource: ResourceType) -> f64 {
        self.programs
            .iter()
            .filter(|p| p.resource == resource)
            .map(|p| p.quantity_remaining)
            .sum()
    }

    /// Whether any program of the type still has quantity to distribute
    pub fn has_runnable(&self, resource: ResourceType) -> bool {
        self.programs
            .iter()
            .any(|p| p.resource == resource && p.is_runnable())
    }

    /// The program an active driver should decrement right now
    pub fn active_program(&self, resource: ResourceType, now_minutes: u16) -> Option<&Program> {
        select_active_program(&self.programs, resource, now_minutes)
    }

    /// Apply a confirmed remote decrement to the local cache.
    ///
    /// Clamps at zero and returns the new remaining quantity. Returns
    /// `None` (a no-op) when the id is not cached: the snapshot was stale
    /// and the next refresh reconciles.
    pub fn apply_decrement(&mut self, id: &ProgramId, amount: f64) -> Option<f64> {
        let program = self
            .programs
            .iter_mut()
            .find(|p| p.id.as_ref() == Some(id))?;
        program.quantity_remaining = (program.quantity_remaining - amount).max(0.0);
        Some(program.quantity_remaining)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
