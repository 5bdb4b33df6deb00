// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use trough_core::{ResourceType, TimeWindow};

fn program(id: &str, quantity: f64) -> Program {
    Program::new(
        id,
        ResourceType::Feed,
        quantity,
        TimeWindow::parse("00:00", "23:59").unwrap(),
    )
}

#[tokio::test]
async fn decrement_is_server_side_and_authoritative() {
    let backend = FakeBackend::new();
    backend.set_programs(vec![program("p-1", 2.0)]);

    let updated = backend
        .decrement_quantity(&ProgramId::new("p-1"), 0.5)
        .await
        .unwrap();

    assert_eq!(updated.quantity_remaining, 1.5);
    assert_eq!(backend.program("p-1").unwrap().quantity_remaining, 1.5);
}

#[tokio::test]
async fn decrement_clamps_at_zero() {
    let backend = FakeBackend::new();
    backend.set_programs(vec![program("p-1", 0.3)]);

    let updated = backend
        .decrement_quantity(&ProgramId::new("p-1"), 0.5)
        .await
        .unwrap();

    assert_eq!(updated.quantity_remaining, 0.0);
}

#[tokio::test]
async fn unknown_program_is_rejected() {
    let backend = FakeBackend::new();

    let result = backend.decrement_quantity(&ProgramId::new("nope"), 0.5).await;
    assert!(matches!(result, Err(DecrementError::Rejected(_))));
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let backend = FakeBackend::new();
    backend.set_programs(vec![program("p-1", 2.0)]);

    backend.list_programs().await.unwrap();
    backend
        .decrement_quantity(&ProgramId::new("p-1"), 0.5)
        .await
        .unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::ListPrograms,
            BackendCall::DecrementQuantity {
                program_id: "p-1".to_string(),
                amount: 0.5,
            },
        ]
    );
}

#[tokio::test]
async fn failure_toggles_are_respected() {
    let backend = FakeBackend::new();
    backend.set_programs(vec![program("p-1", 2.0)]);

    backend.fail_decrements(true);
    assert!(backend
        .decrement_quantity(&ProgramId::new("p-1"), 0.5)
        .await
        .is_err());

    backend.fail_decrements(false);
    assert!(backend
        .decrement_quantity(&ProgramId::new("p-1"), 0.5)
        .await
        .is_ok());

    backend.fail_list(true);
    assert!(backend.list_programs().await.is_err());
}

#[tokio::test]
async fn decrement_hook_runs_while_call_is_in_flight() {
    let backend = FakeBackend::new();
    backend.set_programs(vec![program("p-1", 2.0)]);

    let fired = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = fired.clone();
    backend.set_decrement_hook(move || flag.store(true, std::sync::atomic::Ordering::SeqCst));

    backend
        .decrement_quantity(&ProgramId::new("p-1"), 0.5)
        .await
        .unwrap();

    assert!(fired.load(std::sync::atomic::Ordering::SeqCst));
}

#[tokio::test]
async fn stock_decrement_updates_the_entry() {
    let backend = FakeBackend::new();
    backend.set_stocks(vec![Stock {
        id: StockId::new("s-1"),
        label: "corn".to_string(),
        quantity: 10.0,
    }]);

    backend
        .decrement_stock(&StockId::new("s-1"), 0.5)
        .await
        .unwrap();

    let stocks = backend.list_stocks().await.unwrap();
    assert_eq!(stocks[0].quantity, 9.5);
}
