// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The feeding service: registry, drivers, timers, and tick execution
//!
//! One service owns both drivers and the single registry mutex they
//! share. Timer fires select the active program and spawn the remote
//! decrement; the spawned task reports a [`TickOutcome`] over the channel
//! returned by [`FeedingService::new`], and the owning loop feeds it back
//! through [`FeedingService::apply_outcome`]. Remote calls are not
//! serialized against the tick cadence: a slow response can overlap the
//! next tick, and an outcome arriving after a stop is discarded.

use crate::scheduler::{ScheduledKind, Scheduler};
use chrono::{NaiveDateTime, Timelike};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use trough_adapters::{FeedingBackend, FetchError, Notification, NotifyAdapter, StockBackend};
use trough_core::{
    until_next_midnight, Clock, DailyStats, Driver, DriverConfig, DriverEvent, DriverState, Effect,
    Event, ProgramId, ProgramPatch, ProgramRegistry, ResourceType, StockId, StopReason, TankLevels,
};

const MIDNIGHT_TIMER_ID: &str = "stats:midnight";
const DAILY_TIMER_ID: &str = "stats:daily";
const REFRESH_TIMER_ID: &str = "snapshot:refresh";

const DAY: Duration = Duration::from_secs(24 * 3600);

/// Driver configuration for one service instance
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub feed: DriverConfig,
    pub water: DriverConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            feed: DriverConfig::feed(),
            water: DriverConfig::water(),
        }
    }
}

/// Outcome of one tick's remote round-trip
#[derive(Debug)]
pub enum TickOutcome {
    /// The decrement confirmed; the stock co-decrement may still have
    /// failed independently
    Applied {
        resource: ResourceType,
        program_id: ProgramId,
        amount: f64,
        /// Remaining quantity as reported by the backend
        authoritative_remaining: f64,
        stock_error: Option<(StockId, String)>,
    },
    /// The decrement failed; the tick produced no effect
    Failed {
        resource: ResourceType,
        error: String,
    },
}

/// Scheduler service owning the registry, drivers, and timers
pub struct FeedingService<B, N, C: Clock> {
    backend: B,
    notify: N,
    clock: C,
    registry: Arc<Mutex<ProgramRegistry>>,
    drivers: HashMap<ResourceType, Driver>,
    gauges: TankLevels,
    scheduler: Scheduler,
    outcome_tx: mpsc::UnboundedSender<TickOutcome>,
}

impl<B, N, C> FeedingService<B, N, C>
where
    B: FeedingBackend + StockBackend,
    N: NotifyAdapter,
    C: Clock,
{
    /// Create a service and the receiver its tick outcomes arrive on
    pub fn new(
        backend: B,
        notify: N,
        clock: C,
        config: ServiceConfig,
    ) -> (Self, mpsc::UnboundedReceiver<TickOutcome>) {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let mut drivers = HashMap::new();
        drivers.insert(ResourceType::Feed, Driver::new(config.feed));
        drivers.insert(ResourceType::Water, Driver::new(config.water));

        let service = Self {
            backend,
            notify,
            clock,
            registry: Arc::new(Mutex::new(ProgramRegistry::new())),
            drivers,
            gauges: TankLevels::default(),
            scheduler: Scheduler::new(),
            outcome_tx,
        };
        (service, outcome_rx)
    }

    fn lock_registry(&self) -> MutexGuard<'_, ProgramRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current tank gauges
    pub fn gauges(&self) -> TankLevels {
        self.gauges
    }

    /// Daily counters for one driver
    pub fn daily_stats(&self, resource: ResourceType) -> DailyStats {
        self.drivers
            .get(&resource)
            .map(|d| d.daily)
            .unwrap_or_default()
    }

    /// Current driver state
    pub fn driver_state(&self, resource: ResourceType) -> DriverState {
        self.drivers
            .get(&resource)
            .map(|d| d.state)
            .unwrap_or(DriverState::Stopped)
    }

    pub fn is_running(&self, resource: ResourceType) -> bool {
        self.driver_state(resource) == DriverState::Running
    }

    /// Snapshot of the cached programs (test and status surface)
    pub fn programs(&self) -> Vec<trough_core::Program> {
        self.lock_registry().programs().to_vec()
    }

    /// Refresh the registry snapshot from the backend.
    ///
    /// On failure the previous snapshot stays in place and the error is
    /// returned for the caller to log; cached state is never cleared.
    pub async fn refresh(&mut self) -> Result<usize, FetchError> {
        match self.backend.list_programs().await {
            Ok(programs) => {
                let count = programs.len();
                let levels = {
                    let mut registry = self.lock_registry();
                    registry.replace_all(programs);
                    TankLevels::recompute(&registry)
                };
                self.gauges = levels;
                self.emit(Event::SnapshotRefreshed { programs: count }).await;
                self.emit(Event::GaugesRecomputed {
                    feed_pct: levels.feed_pct,
                    water_pct: levels.water_pct,
                })
                .await;
                Ok(count)
            }
            Err(e) => {
                self.emit(Event::RefreshFailed {
                    error: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    /// Start the driver for a resource; a no-op when already running or
    /// when no program of the resource type exists
    pub async fn start(&mut self, resource: ResourceType) {
        let program_count = self.lock_registry().count(resource);
        let was_running = self.is_running(resource);
        self.step_driver(resource, DriverEvent::Start { program_count })
            .await;
        if !was_running && !self.is_running(resource) {
            tracing::warn!(%resource, program_count, "driver not started");
        }
    }

    /// Stop the driver for a resource; idempotent
    pub async fn stop(&mut self, resource: ResourceType) {
        self.step_driver(
            resource,
            DriverEvent::Stop {
                reason: StopReason::Requested,
            },
        )
        .await;
    }

    /// Reset counters now and arm the midnight timer. The immediate reset
    /// covers a process started mid-day after the previous reset was
    /// missed.
    pub async fn arm_daily_reset(&mut self) {
        self.reset_counters().await;
        let delta = until_next_midnight(self.clock.local_now());
        self.scheduler.schedule(
            MIDNIGHT_TIMER_ID,
            self.clock.now() + delta,
            ScheduledKind::MidnightReset { initial: true },
        );
    }

    /// Arm the periodic registry refresh
    pub fn arm_snapshot_refresh(&mut self, interval: Duration) {
        self.scheduler.schedule_repeating(
            REFRESH_TIMER_ID,
            self.clock.now() + interval,
            interval,
            ScheduledKind::SnapshotRefresh,
        );
    }

    /// Fire all timers due at the current clock reading
    pub async fn poll_timers(&mut self) {
        let due = self.scheduler.poll(self.clock.now());
        for item in due {
            self.handle_timer(item.kind).await;
        }
    }

    async fn handle_timer(&mut self, kind: ScheduledKind) {
        match kind {
            ScheduledKind::DriverTick { resource } => self.tick(resource),
            ScheduledKind::ReconcileScan { resource } => self.reconcile(resource).await,
            ScheduledKind::MidnightReset { initial } => self.midnight_reset(initial).await,
            ScheduledKind::SnapshotRefresh => {
                // Failures are already emitted; stale cache stays usable
                let _ = self.refresh().await;
            }
        }
    }

    /// One consumption tick: pick the active program and launch the
    /// remote decrement. The outcome comes back over the channel.
    fn tick(&mut self, resource: ResourceType) {
        let Some(driver) = self.drivers.get(&resource) else {
            return;
        };
        if !driver.is_running() {
            return;
        }
        let step = driver.config.step;

        let now_minutes = minutes_of_day(self.clock.local_now());
        let selected = {
            let registry = self.lock_registry();
            registry
                .active_program(resource, now_minutes)
                .and_then(|p| p.id.clone().map(|id| (id, p.stock_link.clone())))
        };
        // No active program is the normal idle state; keep ticking
        let Some((program_id, stock_link)) = selected else {
            tracing::debug!(%resource, "no active program this tick");
            return;
        };

        let backend = self.backend.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = match backend.decrement_quantity(&program_id, step).await {
                Ok(updated) => {
                    // Stock is only touched after the feeding decrement
                    // succeeded; its failure does not roll anything back
                    let stock_error = match &stock_link {
                        Some(stock_id) => backend
                            .decrement_stock(stock_id, step)
                            .await
                            .err()
                            .map(|e| (stock_id.clone(), e.to_string())),
                        None => None,
                    };
                    TickOutcome::Applied {
                        resource,
                        program_id,
                        amount: step,
                        authoritative_remaining: updated.quantity_remaining,
                        stock_error,
                    }
                }
                Err(e) => TickOutcome::Failed {
                    resource,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(outcome);
        });
    }

    /// Apply a tick outcome delivered from the channel
    pub async fn apply_outcome(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Applied {
                resource,
                program_id,
                amount,
                authoritative_remaining,
                stock_error,
            } => {
                // An outcome landing after stop() must not touch state
                if !self.is_running(resource) {
                    tracing::debug!(%resource, "discarding outcome for stopped driver");
                    return;
                }

                let remaining = self
                    .lock_registry()
                    .apply_decrement(&program_id, amount)
                    .unwrap_or(authoritative_remaining);

                self.step_driver(
                    resource,
                    DriverEvent::Applied {
                        program_id,
                        amount,
                        remaining,
                    },
                )
                .await;

                let levels = {
                    let registry = self.lock_registry();
                    TankLevels::recompute(&registry)
                };
                self.gauges = levels;

                if let Some((stock_id, error)) = stock_error {
                    self.emit(Event::StockSyncFailed { stock_id, error }).await;
                }
            }
            TickOutcome::Failed { resource, error } => {
                // The machine discards this when already stopped and
                // applies the failure policy otherwise
                self.step_driver(resource, DriverEvent::Failed { error })
                    .await;
            }
        }
    }

    /// Stop a reconciling driver once nothing of its type remains
    async fn reconcile(&mut self, resource: ResourceType) {
        if !self.is_running(resource) {
            return;
        }
        if self.lock_registry().has_runnable(resource) {
            return;
        }
        tracing::info!(%resource, "no runnable programs left; stopping driver");
        self.step_driver(
            resource,
            DriverEvent::Stop {
                reason: StopReason::Exhausted,
            },
        )
        .await;
    }

    async fn midnight_reset(&mut self, initial: bool) {
        self.reset_counters().await;
        self.emit(Event::DailyCountersReset).await;
        if initial {
            self.scheduler.schedule_repeating(
                DAILY_TIMER_ID,
                self.clock.now() + DAY,
                DAY,
                ScheduledKind::MidnightReset { initial: false },
            );
        }
    }

    async fn reset_counters(&mut self) {
        for resource in [ResourceType::Feed, ResourceType::Water] {
            self.step_driver(resource, DriverEvent::ResetCounters).await;
        }
    }

    async fn step_driver(&mut self, resource: ResourceType, event: DriverEvent) {
        let Some(driver) = self.drivers.get(&resource) else {
            return;
        };
        let (new_driver, effects) = driver.transition(event);
        self.drivers.insert(resource, new_driver);
        self.execute_effects(resource, effects).await;
    }

    async fn execute_effects(&mut self, resource: ResourceType, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SetTimer {
                    id,
                    duration,
                    repeating,
                } => {
                    let kind = kind_for_timer(&id, resource);
                    let fire_at = self.clock.now() + duration;
                    if repeating {
                        self.scheduler.schedule_repeating(id, fire_at, duration, kind);
                    } else {
                        self.scheduler.schedule(id, fire_at, kind);
                    }
                }
                Effect::CancelTimer { id } => self.scheduler.cancel(&id),
                Effect::PersistExhausted { program_id } => self.persist_exhausted(program_id),
                Effect::Emit(event) => self.emit(event).await,
            }
        }
    }

    /// Persist a zeroed quantity so the program stays inactive across
    /// sessions. Best-effort: a failure is logged and nothing retries.
    fn persist_exhausted(&self, program_id: ProgramId) {
        let backend = self.backend.clone();
        tokio::spawn(async move {
            if let Err(e) = backend
                .update_program(&program_id, &ProgramPatch::zero_quantity())
                .await
            {
                tracing::warn!(program = %program_id, error = %e, "failed to persist exhausted program");
            }
        });
    }

    async fn emit(&self, event: Event) {
        tracing::info!(event = event.name(), ?event, "event");
        if let Some(notification) = notification_for(&event) {
            if let Err(e) = self.notify.notify(notification).await {
                tracing::warn!(error = %e, "failed to send notification");
            }
        }
    }
}

fn minutes_of_day(local: NaiveDateTime) -> u16 {
    (local.hour() * 60 + local.minute()) as u16
}

fn kind_for_timer(id: &str, resource: ResourceType) -> ScheduledKind {
    if id.starts_with("reconcile:") {
        ScheduledKind::ReconcileScan { resource }
    } else {
        ScheduledKind::DriverTick { resource }
    }
}

/// Which events the operator hears about
fn notification_for(event: &Event) -> Option<Notification> {
    match event {
        Event::TickFailed { resource, error } => Some(Notification::new(
            format!("{resource} distribution failed"),
            error.clone(),
        )),
        Event::StockSyncFailed { stock_id, error } => Some(
            Notification::new(format!("stock {stock_id} out of sync"), error.clone()).important(),
        ),
        Event::RefreshFailed { error } => Some(Notification::new(
            "program refresh failed",
            error.clone(),
        )),
        Event::DriverStopped {
            resource,
            reason: StopReason::DecrementFailed,
        } => Some(
            Notification::new(
                format!("{resource} driver stopped"),
                "stopped after a failed decrement",
            )
            .important(),
        ),
        _ => None,
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
