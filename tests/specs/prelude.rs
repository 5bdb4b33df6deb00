//! Shared helpers for the behavioral specs

use tokio::sync::mpsc::UnboundedReceiver;
use trough_adapters::{FakeBackend, FakeNotifier};
use trough_core::{FakeClock, Program, ResourceType, TimeWindow};
use trough_engine::{FeedingService, ServiceConfig, TickOutcome};

pub type SpecService = FeedingService<FakeBackend, FakeNotifier, FakeClock>;

pub struct Harness {
    pub service: SpecService,
    pub outcomes: UnboundedReceiver<TickOutcome>,
    pub backend: FakeBackend,
    pub notifier: FakeNotifier,
    pub clock: FakeClock,
}

/// A fully provisioned service with the given programs already fetched
pub async fn harness(programs: Vec<Program>) -> Harness {
    let backend = FakeBackend::new();
    backend.set_programs(programs);
    let notifier = FakeNotifier::new();
    let clock = FakeClock::new();
    clock.set_local(noon());

    let (mut service, outcomes) = FeedingService::new(
        backend.clone(),
        notifier.clone(),
        clock.clone(),
        ServiceConfig::default(),
    );
    service.refresh().await.unwrap();

    Harness {
        service,
        outcomes,
        backend,
        notifier,
        clock,
    }
}

pub fn noon() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2025, 7, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn program(id: &str, resource: ResourceType, quantity: f64, window: (&str, &str)) -> Program {
    Program::new(
        id,
        resource,
        quantity,
        TimeWindow::parse(window.0, window.1).unwrap(),
    )
}

impl Harness {
    /// Advance one tick interval for the resource and apply the outcome
    pub async fn run_tick(&mut self, resource: ResourceType) {
        let interval = match resource {
            ResourceType::Feed => std::time::Duration::from_secs(2),
            ResourceType::Water => std::time::Duration::from_secs(3),
        };
        self.clock.advance(interval);
        self.service.poll_timers().await;
        let outcome = self.outcomes.recv().await.unwrap();
        self.service.apply_outcome(outcome).await;
    }

    /// Let spawned best-effort tasks finish
    pub async fn settle(&self) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }
}
