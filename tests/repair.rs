//! Self-repair contract tests
//!
//! The repair callback stands in for a generative model call.

use std::sync::atomic::{AtomicUsize, Ordering};

use forgelabels_core::logging::{LogLevel, MemoryLogger};
use forgelabels_core::{validate_and_repair, Edit, EditSchema, NullLogger, RepairError, SerdeSchema};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct EditBrief {
    element: String,
    goal: String,
}

fn brief_schema() -> SerdeSchema<EditBrief> {
    SerdeSchema::new("edit_brief")
}

fn brief() -> Value {
    json!({"element": "title", "goal": "make it pop"})
}

#[tokio::test]
async fn invariant_valid_candidate_is_returned_without_repair() {
    let calls = AtomicUsize::new(0);
    let repair = |_: EditBrief, _: String| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<Value, anyhow::Error>(json!(null)) }
    };

    let edit = validate_and_repair(
        &brief(),
        json!({"op": "recolor", "id": "title", "color": "accent"}),
        &brief_schema(),
        &EditSchema,
        repair,
        &NullLogger,
    )
    .await
    .unwrap();

    assert_eq!(edit.element_id(), "title");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invariant_invalid_candidate_is_repaired_once() {
    let calls = AtomicUsize::new(0);
    let repair = |input: EditBrief, error: String| {
        calls.fetch_add(1, Ordering::SeqCst);
        assert!(error.contains("teleport"));
        async move {
            Ok::<Value, anyhow::Error>(json!({"op": "reorder", "id": input.element, "z": 10}))
        }
    };
    let logger = MemoryLogger::new();

    let edit = validate_and_repair(
        &brief(),
        json!({"op": "teleport", "id": "title"}),
        &brief_schema(),
        &EditSchema,
        repair,
        &logger,
    )
    .await
    .unwrap();

    assert_eq!(edit, Edit::Reorder { element_id: "title".into(), z: 10 });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(logger.count_at(LogLevel::Warn), 1);
}

#[tokio::test]
async fn invariant_double_failure_names_both_violations() {
    let calls = AtomicUsize::new(0);
    let repair = |_: EditBrief, _: String| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<Value, anyhow::Error>(json!({"op": "reorder", "id": "title"})) }
    };

    let err = validate_and_repair(
        &brief(),
        json!({"op": "teleport", "id": "title"}),
        &brief_schema(),
        &EditSchema,
        repair,
        &NullLogger,
    )
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    match &err {
        RepairError::RepairExhausted { original, repaired } => {
            assert!(original.message.contains("teleport"));
            assert!(repaired.message.contains('z'));
        }
        other => panic!("expected RepairExhausted, got {other:?}"),
    }
    let text = err.to_string();
    assert!(text.contains("original output invalid"));
    assert!(text.contains("repaired output invalid"));
}

#[tokio::test]
async fn invariant_invalid_input_fails_before_anything_else() {
    let calls = AtomicUsize::new(0);
    let repair = |_: EditBrief, _: String| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<Value, anyhow::Error>(json!(null)) }
    };

    let err = validate_and_repair(
        &json!({"element": "title"}),
        json!({"op": "teleport"}),
        &brief_schema(),
        &EditSchema,
        repair,
        &NullLogger,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RepairError::InvalidInput { ref schema, .. } if schema == "edit_brief"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invariant_failing_repair_call_is_surfaced() {
    let repair = |_: EditBrief, _: String| async move {
        Err::<Value, anyhow::Error>(anyhow::anyhow!("model timed out"))
    };

    let err = validate_and_repair(
        &brief(),
        json!({"op": "move", "id": "title"}),
        &brief_schema(),
        &EditSchema,
        repair,
        &NullLogger,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RepairError::RepairCallFailed { .. }));
    assert!(err.to_string().contains("model timed out"));
}

#[tokio::test]
async fn invariant_repair_works_for_any_serde_output() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Tagline {
        text: String,
    }

    let repair = |input: EditBrief, _: String| async move {
        Ok::<Value, anyhow::Error>(json!({"text": format!("{} for {}", input.goal, input.element)}))
    };

    let tagline = validate_and_repair(
        &brief(),
        json!({"txt": "oops"}),
        &brief_schema(),
        &SerdeSchema::<Tagline>::new("tagline"),
        repair,
        &NullLogger,
    )
    .await
    .unwrap();

    assert_eq!(tagline, Tagline { text: "make it pop for title".to_string() });
}
