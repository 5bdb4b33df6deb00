// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Program and stock data model
//!
//! A `Program` is one scheduled feeding or watering slot: a quantity budget
//! plus a daily recurring time window. Programs are created and edited by
//! the dashboard CRUD layer; this core reads snapshots and decrements
//! quantities. The backend is the authority, local state is a cache.

use crate::window::TimeWindow;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unique identifier for a feeding program, assigned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramId(pub String);

impl ProgramId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProgramId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProgramId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a stock entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockId(pub String);

impl StockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The resource a program distributes
///
/// The source system multiplexed feed and water onto one generic type
/// field with a sentinel value; here the distinction is explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Feed,
    Water,
}

impl ResourceType {
    /// Stable lowercase label, used in timer ids and log fields
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Feed => "feed",
            ResourceType::Water => "water",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One scheduled feeding or watering slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Backend-assigned id; absent for transient/unsaved programs
    #[serde(default)]
    pub id: Option<ProgramId>,
    pub resource: ResourceType,
    /// Remaining quantity budget; never negative
    #[serde(deserialize_with = "non_negative_quantity")]
    pub quantity_remaining: f64,
    /// Daily recurring window; `None` when the stored times were
    /// unparsable, which makes the program permanently inactive
    #[serde(default)]
    pub window: Option<TimeWindow>,
    /// Stock entry to co-decrement on each successful tick
    #[serde(default)]
    pub stock_link: Option<StockId>,
    /// Scheduler-managed, as opposed to manually distributed
    #[serde(default = "default_automatic")]
    pub automatic: bool,
}

fn default_automatic() -> bool {
    true
}

impl Program {
    pub fn new(
        id: impl Into<String>,
        resource: ResourceType,
        quantity_remaining: f64,
        window: TimeWindow,
    ) -> Self {
        Self {
            id: Some(ProgramId::new(id)),
            resource,
            quantity_remaining,
            window: Some(window),
            stock_link: None,
            automatic: true,
        }
    }

    pub fn with_stock_link(mut self, stock_id: impl Into<String>) -> Self {
        self.stock_link = Some(StockId::new(stock_id));
        self
    }

    pub fn manual(mut self) -> Self {
        self.automatic = false;
        self
    }

    /// A program with no remaining quantity is never selected
    pub fn is_runnable(&self) -> bool {
        self.quantity_remaining > 0.0
    }

    /// Whether the window contains the given minutes-of-day instant
    pub fn is_within_window(&self, now_minutes: u16) -> bool {
        self.window.as_ref().is_some_and(|w| w.contains(now_minutes))
    }
}

/// Rejects negative and non-finite quantities at the transport boundary.
/// The source coerced string/number quantities at runtime; the typed wire
/// layer makes that branch unrepresentable.
fn non_negative_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("quantity must be finite"));
    }
    if value < 0.0 {
        return Err(serde::de::Error::custom("quantity must be non-negative"));
    }
    Ok(value)
}

/// Partial update for a program; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_remaining: Option<f64>,
}

impl ProgramPatch {
    /// Patch persisting an exhausted program's zero quantity
    pub fn zero_quantity() -> Self {
        Self {
            quantity_remaining: Some(0.0),
        }
    }
}

/// A stock entry that a program can co-decrement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub label: String,
    #[serde(deserialize_with = "non_negative_quantity")]
    pub quantity: f64,
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
