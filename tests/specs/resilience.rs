//! Failure handling scenarios: network errors, partial failures, stale caches

use crate::prelude::*;
use std::time::Duration;
use trough_adapters::{BackendCall, StockBackend};
use trough_core::{ResourceType, Stock, StockId};

#[tokio::test]
async fn feed_distribution_rides_through_an_outage() {
    let mut h = harness(vec![program("f", ResourceType::Feed, 5.0, ("00:00", "23:59"))]).await;

    h.service.start(ResourceType::Feed).await;
    h.run_tick(ResourceType::Feed).await;
    assert_eq!(h.backend.program("f").unwrap().quantity_remaining, 4.5);

    // Backend goes dark for two ticks
    h.backend.fail_decrements(true);
    h.run_tick(ResourceType::Feed).await;
    h.run_tick(ResourceType::Feed).await;
    assert!(h.service.is_running(ResourceType::Feed));
    assert_eq!(h.service.programs()[0].quantity_remaining, 4.5);

    // Service recovers without operator intervention
    h.backend.fail_decrements(false);
    h.run_tick(ResourceType::Feed).await;
    assert_eq!(h.backend.program("f").unwrap().quantity_remaining, 4.0);
    assert_eq!(h.service.daily_stats(ResourceType::Feed).distributions, 2);
}

#[tokio::test]
async fn water_outage_stops_the_driver_until_restarted() {
    let mut h = harness(vec![program("w", ResourceType::Water, 5.0, ("00:00", "23:59"))]).await;

    h.service.start(ResourceType::Water).await;
    h.backend.fail_decrements(true);
    h.run_tick(ResourceType::Water).await;

    assert!(!h.service.is_running(ResourceType::Water));

    // An explicit restart brings it back once the backend recovers
    h.backend.fail_decrements(false);
    h.service.start(ResourceType::Water).await;
    h.run_tick(ResourceType::Water).await;
    assert_eq!(h.backend.program("w").unwrap().quantity_remaining, 4.5);
}

#[tokio::test]
async fn linked_stock_failure_is_tolerated_without_rollback() {
    let mut h = harness(vec![program("f", ResourceType::Feed, 5.0, ("00:00", "23:59"))
        .with_stock_link("granary")])
    .await;
    h.backend.set_stocks(vec![Stock {
        id: StockId::new("granary"),
        label: "granary".to_string(),
        quantity: 50.0,
    }]);
    h.backend.fail_stock(true);

    h.service.start(ResourceType::Feed).await;
    h.run_tick(ResourceType::Feed).await;

    // The feeding decrement stands even though the stock write failed
    assert_eq!(h.backend.program("f").unwrap().quantity_remaining, 4.5);
    assert!(h.service.is_running(ResourceType::Feed));
    assert!(h
        .notifier
        .sent()
        .iter()
        .any(|n| n.title.contains("granary")));

    // Once the stock endpoint recovers, both move together again
    h.backend.fail_stock(false);
    h.run_tick(ResourceType::Feed).await;
    let stocks = h.backend.list_stocks().await.unwrap();
    assert_eq!(stocks[0].quantity, 49.5);
}

#[tokio::test]
async fn refresh_outage_leaves_the_last_snapshot_usable() {
    let mut h = harness(vec![
        program("f", ResourceType::Feed, 30.0, ("00:00", "23:59")),
        program("w", ResourceType::Water, 40.0, ("00:00", "23:59")),
    ])
    .await;

    h.backend.fail_list(true);
    assert!(h.service.refresh().await.is_err());

    // Stale but available: drivers still start and tick on the old view
    assert_eq!(h.service.programs().len(), 2);
    assert_eq!(h.service.gauges().feed_pct, 30.0);
    h.service.start(ResourceType::Feed).await;
    h.run_tick(ResourceType::Feed).await;
    assert_eq!(h.service.programs()[0].quantity_remaining, 29.5);
}

#[tokio::test]
async fn a_stop_during_an_inflight_call_wins() {
    let mut h = harness(vec![program("f", ResourceType::Feed, 5.0, ("00:00", "23:59"))]).await;

    h.service.start(ResourceType::Feed).await;
    h.clock.advance(Duration::from_secs(2));
    h.service.poll_timers().await;

    // The remote decrement is in flight; the operator toggles the driver
    // off before the response lands
    let outcome = h.outcomes.recv().await.unwrap();
    h.service.stop(ResourceType::Feed).await;
    h.service.apply_outcome(outcome).await;

    // Local state is untouched; the backend's view reconciles on the
    // next refresh
    assert_eq!(h.service.programs()[0].quantity_remaining, 5.0);
    assert_eq!(h.service.daily_stats(ResourceType::Feed).distributions, 0);

    h.service.refresh().await.unwrap();
    assert_eq!(h.service.programs()[0].quantity_remaining, 4.5);
}

#[tokio::test]
async fn exhaustion_persist_failure_is_best_effort() {
    let mut h = harness(vec![program("f", ResourceType::Feed, 0.5, ("00:00", "23:59"))]).await;
    h.backend.fail_updates(true);

    h.service.start(ResourceType::Feed).await;
    h.run_tick(ResourceType::Feed).await;
    h.settle().await;

    // The update was attempted and failed; nothing retries or crashes
    assert!(h
        .backend
        .calls()
        .iter()
        .any(|c| matches!(c, BackendCall::UpdateProgram { .. })));
    assert_eq!(h.service.programs()[0].quantity_remaining, 0.0);
}
