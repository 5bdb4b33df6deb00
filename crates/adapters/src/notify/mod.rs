// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator notification adapter
//!
//! Background tick failures never escalate; they are reported here and
//! otherwise swallowed. The presentation side (dashboard toasts, pager,
//! whatever) lives behind this trait.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification failed: {0}")]
    Failed(String),
}

/// Notification urgency level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyUrgency {
    Normal,
    Important,
}

/// A notification to surface to the operator
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub urgency: NotifyUrgency,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            urgency: NotifyUrgency::Normal,
        }
    }

    pub fn important(mut self) -> Self {
        self.urgency = NotifyUrgency::Important;
        self
    }
}

/// Adapter trait for notification delivery
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Send a notification
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Notifier that drops everything
#[derive(Clone, Debug, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl NotifyAdapter for NoOpNotifier {
    async fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Notifier that writes to the process log
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotifyAdapter for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        match notification.urgency {
            NotifyUrgency::Normal => {
                tracing::info!(title = %notification.title, "{}", notification.message)
            }
            NotifyUrgency::Important => {
                tracing::warn!(title = %notification.title, "{}", notification.message)
            }
        }
        Ok(())
    }
}
