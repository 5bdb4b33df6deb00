// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST backend over the dashboard API
//!
//! `ureq` is blocking, so every call runs on the blocking pool. Wire
//! payloads are decoded into typed DTOs here: quantities are validated
//! numerically and malformed window times degrade to a permanently
//! inactive program instead of poisoning the whole snapshot.

use super::{DecrementError, FeedingBackend, FetchError, StockBackend, StockSyncError};
use async_trait::async_trait;
use serde::Deserialize;
use trough_core::{Program, ProgramId, ProgramPatch, ResourceType, Stock, StockId, TimeWindow};

/// HTTP implementation of the feeding and stock backends
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// One program as the dashboard API serializes it
#[derive(Debug, Deserialize)]
struct ProgramDto {
    id: Option<String>,
    resource: ResourceType,
    quantity_remaining: f64,
    start_time: String,
    end_time: String,
    #[serde(default)]
    stock_id: Option<String>,
    #[serde(default = "default_automatic")]
    automatic: bool,
}

fn default_automatic() -> bool {
    true
}

impl ProgramDto {
    fn into_program(self) -> Result<Program, String> {
        if !self.quantity_remaining.is_finite() || self.quantity_remaining < 0.0 {
            return Err(format!(
                "invalid quantity {} for program {}",
                self.quantity_remaining,
                self.id.as_deref().unwrap_or("<unsaved>")
            ));
        }
        // Unparsable times leave the program permanently inactive rather
        // than failing the snapshot.
        let window = TimeWindow::parse(&self.start_time, &self.end_time).ok();
        if window.is_none() {
            tracing::warn!(
                program = self.id.as_deref().unwrap_or("<unsaved>"),
                start = %self.start_time,
                end = %self.end_time,
                "unparsable window times; program will stay inactive"
            );
        }
        Ok(Program {
            id: self.id.map(ProgramId::from),
            resource: self.resource,
            quantity_remaining: self.quantity_remaining,
            window,
            stock_link: self.stock_id.map(StockId::new),
            automatic: self.automatic,
        })
    }
}

fn get_body(url: &str) -> Result<String, ureq::Error> {
    let mut response = ureq::get(url).call()?;
    response.body_mut().read_to_string()
}

fn post_json(url: &str, body: &str) -> Result<String, ureq::Error> {
    let mut response = ureq::post(url)
        .header("content-type", "application/json")
        .send(body)?;
    response.body_mut().read_to_string()
}

fn patch_json(url: &str, body: &str) -> Result<String, ureq::Error> {
    let mut response = ureq::patch(url)
        .header("content-type", "application/json")
        .send(body)?;
    response.body_mut().read_to_string()
}

fn decrement_payload(amount: f64) -> String {
    serde_json::json!({ "amount": amount }).to_string()
}

fn as_decrement_error(e: ureq::Error) -> DecrementError {
    match e {
        ureq::Error::StatusCode(code) => DecrementError::Rejected(format!("status {code}")),
        other => DecrementError::Transport(other.to_string()),
    }
}

fn parse_program(body: &str) -> Result<Program, String> {
    let dto: ProgramDto = serde_json::from_str(body).map_err(|e| e.to_string())?;
    dto.into_program()
}

#[async_trait]
impl FeedingBackend for HttpBackend {
    async fn list_programs(&self) -> Result<Vec<Program>, FetchError> {
        let url = self.url("/feeding");
        let body = tokio::task::spawn_blocking(move || get_body(&url))
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let dtos: Vec<ProgramDto> =
            serde_json::from_str(&body).map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
        dtos.into_iter()
            .map(|dto| dto.into_program().map_err(FetchError::InvalidResponse))
            .collect()
    }

    async fn decrement_quantity(
        &self,
        id: &ProgramId,
        amount: f64,
    ) -> Result<Program, DecrementError> {
        let url = self.url(&format!("/feeding/{id}/decrement"));
        let body = tokio::task::spawn_blocking(move || post_json(&url, &decrement_payload(amount)))
            .await
            .map_err(|e| DecrementError::Transport(e.to_string()))?
            .map_err(as_decrement_error)?;

        parse_program(&body).map_err(DecrementError::InvalidResponse)
    }

    async fn update_program(
        &self,
        id: &ProgramId,
        patch: &ProgramPatch,
    ) -> Result<Program, DecrementError> {
        let url = self.url(&format!("/feeding/{id}"));
        let payload =
            serde_json::to_string(patch).map_err(|e| DecrementError::InvalidResponse(e.to_string()))?;
        let body = tokio::task::spawn_blocking(move || patch_json(&url, &payload))
            .await
            .map_err(|e| DecrementError::Transport(e.to_string()))?
            .map_err(as_decrement_error)?;

        parse_program(&body).map_err(DecrementError::InvalidResponse)
    }
}

#[async_trait]
impl StockBackend for HttpBackend {
    async fn decrement_stock(&self, id: &StockId, amount: f64) -> Result<(), StockSyncError> {
        let url = self.url(&format!("/stocks/{id}/decrement"));
        tokio::task::spawn_blocking(move || post_json(&url, &decrement_payload(amount)))
            .await
            .map_err(|e| StockSyncError::Transport(e.to_string()))?
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => StockSyncError::Failed(format!("status {code}")),
                other => StockSyncError::Transport(other.to_string()),
            })?;
        Ok(())
    }

    async fn list_stocks(&self) -> Result<Vec<Stock>, FetchError> {
        let url = self.url("/stocks");
        let body = tokio::task::spawn_blocking(move || get_body(&url))
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}
