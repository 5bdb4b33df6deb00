//! Program scheduling and consumption scenarios

use crate::prelude::*;
use std::time::Duration;
use trough_adapters::BackendCall;
use trough_core::{DailyStats, ResourceType};

#[tokio::test]
async fn a_small_program_drains_to_zero_and_is_persisted() {
    let mut h = harness(vec![program(
        "morning-feed",
        ResourceType::Feed,
        1.0,
        ("00:00", "23:59"),
    )])
    .await;

    h.service.start(ResourceType::Feed).await;

    // Two ticks at 0.5 units drain one unit
    h.run_tick(ResourceType::Feed).await;
    h.run_tick(ResourceType::Feed).await;
    h.settle().await;

    assert_eq!(h.service.programs()[0].quantity_remaining, 0.0);
    assert_eq!(h.backend.program("morning-feed").unwrap().quantity_remaining, 0.0);
    assert!(h.backend.calls().contains(&BackendCall::UpdateProgram {
        program_id: "morning-feed".to_string(),
        quantity_remaining: Some(0.0),
    }));

    // The 60s scan notices nothing is left and stops the driver
    h.clock.advance(Duration::from_secs(60));
    h.service.poll_timers().await;
    assert!(!h.service.is_running(ResourceType::Feed));
}

#[tokio::test]
async fn overlapping_programs_drain_in_registry_order() {
    let mut h = harness(vec![
        program("first", ResourceType::Feed, 1.0, ("00:00", "23:59")),
        program("second", ResourceType::Feed, 1.0, ("00:00", "23:59")),
    ])
    .await;

    h.service.start(ResourceType::Feed).await;

    // Drain the first program completely
    h.run_tick(ResourceType::Feed).await;
    h.run_tick(ResourceType::Feed).await;
    assert_eq!(h.backend.program("first").unwrap().quantity_remaining, 0.0);
    assert_eq!(h.backend.program("second").unwrap().quantity_remaining, 1.0);

    // Only then does the second become the active one
    h.run_tick(ResourceType::Feed).await;
    assert_eq!(h.backend.program("second").unwrap().quantity_remaining, 0.5);
}

#[tokio::test]
async fn feed_and_water_drivers_run_independently() {
    let mut h = harness(vec![
        program("f", ResourceType::Feed, 10.0, ("00:00", "23:59")),
        program("w", ResourceType::Water, 10.0, ("00:00", "23:59")),
    ])
    .await;

    h.service.start(ResourceType::Feed).await;
    h.service.start(ResourceType::Water).await;

    // Six seconds: three feed ticks, two water ticks
    for _ in 0..6 {
        h.clock.advance(Duration::from_secs(1));
        h.service.poll_timers().await;
    }
    h.settle().await;
    while let Ok(outcome) = h.outcomes.try_recv() {
        h.service.apply_outcome(outcome).await;
    }

    assert_eq!(h.service.daily_stats(ResourceType::Feed).distributions, 3);
    assert_eq!(h.service.daily_stats(ResourceType::Water).distributions, 2);

    // Stopping one leaves the other ticking
    h.service.stop(ResourceType::Water).await;
    assert!(h.service.is_running(ResourceType::Feed));
    assert!(!h.service.is_running(ResourceType::Water));
}

#[tokio::test]
async fn an_empty_schedule_cannot_be_activated() {
    let mut h = harness(vec![program("w", ResourceType::Water, 5.0, ("00:00", "23:59"))]).await;

    h.service.start(ResourceType::Feed).await;

    assert!(!h.service.is_running(ResourceType::Feed));

    // After programs appear on the backend, a refresh unlocks the start
    h.backend.set_programs(vec![
        program("w", ResourceType::Water, 5.0, ("00:00", "23:59")),
        program("f", ResourceType::Feed, 5.0, ("00:00", "23:59")),
    ]);
    h.service.refresh().await.unwrap();
    h.service.start(ResourceType::Feed).await;
    assert!(h.service.is_running(ResourceType::Feed));
}

#[tokio::test]
async fn programs_outside_their_window_wait_for_it() {
    let mut h = harness(vec![program(
        "evening",
        ResourceType::Feed,
        5.0,
        ("18:00", "20:00"),
    )])
    .await;

    h.service.start(ResourceType::Feed).await;

    // Noon: the window has not opened, ticks pass without effect
    h.clock.advance(Duration::from_secs(2));
    h.service.poll_timers().await;
    h.settle().await;
    assert!(h.outcomes.try_recv().is_err());
    assert!(h.service.is_running(ResourceType::Feed));

    // Move inside the window; the same driver picks the program up
    h.clock.set_local(noon().date().and_hms_opt(18, 30, 0).unwrap());
    h.run_tick(ResourceType::Feed).await;
    assert_eq!(h.backend.program("evening").unwrap().quantity_remaining, 4.5);
}

#[tokio::test]
async fn daily_counters_reset_at_midnight() {
    let mut h = harness(vec![program(
        "f",
        ResourceType::Feed,
        100.0,
        ("00:00", "23:59"),
    )])
    .await;
    h.clock
        .set_local(noon().date().and_hms_opt(23, 59, 50).unwrap());

    h.service.arm_daily_reset().await;
    h.service.start(ResourceType::Feed).await;
    h.run_tick(ResourceType::Feed).await;
    assert_eq!(h.service.daily_stats(ResourceType::Feed).consumed, 0.5);

    // Midnight is eight seconds away
    h.clock.advance(Duration::from_secs(8));
    h.service.poll_timers().await;

    assert_eq!(
        h.service.daily_stats(ResourceType::Feed),
        DailyStats::default()
    );
    assert_eq!(
        h.service.daily_stats(ResourceType::Water),
        DailyStats::default()
    );
}
