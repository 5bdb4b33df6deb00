// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::window::TimeWindow;

fn sample_program() -> Program {
    Program::new(
        "p-1",
        ResourceType::Feed,
        4.5,
        TimeWindow::parse("06:00", "08:30").unwrap(),
    )
}

#[test]
fn program_builder_defaults() {
    let program = sample_program();

    assert_eq!(program.id.as_ref().unwrap().0, "p-1");
    assert!(program.automatic);
    assert!(program.stock_link.is_none());
    assert!(program.is_runnable());
}

#[test]
fn program_with_stock_link() {
    let program = sample_program().with_stock_link("s-9");
    assert_eq!(program.stock_link.as_ref().unwrap().0, "s-9");
}

#[test]
fn manual_program_is_not_automatic() {
    let program = sample_program().manual();
    assert!(!program.automatic);
}

#[test]
fn exhausted_program_is_not_runnable() {
    let mut program = sample_program();
    program.quantity_remaining = 0.0;
    assert!(!program.is_runnable());
}

#[test]
fn window_check_is_false_without_a_window() {
    let mut program = sample_program();
    program.window = None;
    assert!(!program.is_within_window(7 * 60));
}

#[test]
fn deserializes_wire_program() {
    let program: Program = serde_json::from_str(
        r#"{
            "id": "p-1",
            "resource": "water",
            "quantity_remaining": 2.5,
            "window": { "start": "06:00", "end": "08:30" },
            "stock_link": "s-2"
        }"#,
    )
    .unwrap();

    assert_eq!(program.resource, ResourceType::Water);
    assert_eq!(program.quantity_remaining, 2.5);
    assert!(program.automatic);
    assert_eq!(program.stock_link.unwrap().0, "s-2");
}

#[test]
fn rejects_negative_quantity_at_the_boundary() {
    let result: Result<Program, _> = serde_json::from_str(
        r#"{
            "id": "p-1",
            "resource": "feed",
            "quantity_remaining": -1.0,
            "window": null
        }"#,
    );

    assert!(result.is_err());
}

#[test]
fn rejects_string_quantity_at_the_boundary() {
    // The source coerced "5" to 5 at runtime; the typed layer refuses it.
    let result: Result<Program, _> = serde_json::from_str(
        r#"{
            "id": "p-1",
            "resource": "feed",
            "quantity_remaining": "5",
            "window": null
        }"#,
    );

    assert!(result.is_err());
}

#[test]
fn zero_quantity_patch_serializes_only_quantity() {
    let patch = ProgramPatch::zero_quantity();
    let json = serde_json::to_value(&patch).unwrap();
    assert_eq!(json, serde_json::json!({ "quantity_remaining": 0.0 }));
}

#[test]
fn stock_rejects_negative_quantity() {
    let result: Result<Stock, _> =
        serde_json::from_str(r#"{ "id": "s-1", "label": "corn", "quantity": -3.0 }"#);
    assert!(result.is_err());
}

#[test]
fn resource_labels_are_stable() {
    assert_eq!(ResourceType::Feed.label(), "feed");
    assert_eq!(ResourceType::Water.label(), "water");
    assert_eq!(ResourceType::Feed.to_string(), "feed");
}
