//! Integration tests for the patient journey
//!
//! These tests drive the public API the way the REST layer does:
//! - Workflow ordering survives append/remove/move sequences and reloads
//! - Patient progression skips inactive steps but never moves a parked patient
//! - The intake wizard records one inquiry with every collected field
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test journey_integration -- --nocapture
//! ```

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tempfile::TempDir;

use medjourney::error::{ErrorKind, JourneyError};
use medjourney::intake::{IntakeStage, IntakeWizard, WizardState};
use medjourney::progress::{JourneyBoard, PatientId, PatientProgressTracker};
use medjourney::store::{JsonFileStore, MemoryStore};
use medjourney::workflow::{MoveDirection, Phase, StepRegistry, WorkflowStep};

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn assert_dense(steps: &[WorkflowStep]) {
    let numbers: Vec<u32> = steps.iter().map(|s| s.step_number).collect();
    let expected: Vec<u32> = (1..=steps.len() as u32).collect();
    assert_eq!(numbers, expected, "step numbers must be 1..N in order");
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

/// Registry with steps A (Initial), B (Planning), C (Travel)
async fn abc_registry(store: Arc<MemoryStore>) -> (StepRegistry, [WorkflowStep; 3]) {
    let mut registry = StepRegistry::new(store);
    let a = registry.append("A", "first", Phase::Initial).await.unwrap();
    let b = registry.append("B", "second", Phase::Planning).await.unwrap();
    let c = registry.append("C", "third", Phase::Travel).await.unwrap();
    (registry, [a, b, c])
}

// ─── Workflow ordering ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_numbering_stays_dense_through_mixed_edits() {
    let store = Arc::new(MemoryStore::new());
    let mut registry = StepRegistry::new(store);

    let mut ids = Vec::new();
    for i in 0..6 {
        let step = registry
            .append(format!("Step {}", i), "", Phase::Planning)
            .await
            .unwrap();
        ids.push(step.id);
        assert_dense(&registry.list_all());
    }

    registry.move_step(ids[5], MoveDirection::Up).await.unwrap();
    assert_dense(&registry.list_all());
    registry.remove(ids[2]).await.unwrap();
    assert_dense(&registry.list_all());
    registry.move_step(ids[0], MoveDirection::Down).await.unwrap();
    assert_dense(&registry.list_all());
    registry.remove(ids[0]).await.unwrap();
    assert_dense(&registry.list_all());
    registry.append_default().await.unwrap();
    assert_dense(&registry.list_all());

    assert_eq!(registry.len(), 5);
}

#[tokio::test]
async fn test_boundary_moves_change_nothing() {
    let (mut registry, [a, _, c]) = abc_registry(Arc::new(MemoryStore::new())).await;
    let before = registry.list_all();

    registry.move_step(a.id, MoveDirection::Up).await.unwrap();
    registry.move_step(c.id, MoveDirection::Down).await.unwrap();

    assert_eq!(registry.list_all(), before);
}

#[tokio::test]
async fn test_remove_shifts_only_later_steps() {
    let store = Arc::new(MemoryStore::new());
    let mut registry = StepRegistry::new(store);
    for title in ["one", "two", "three", "four", "five"] {
        registry.append(title, "", Phase::Initial).await.unwrap();
    }
    let before = registry.list_all();

    registry.remove(before[2].id).await.unwrap();
    let after = registry.list_all();

    for old in &before {
        let Some(new) = after.iter().find(|s| s.id == old.id) else {
            continue;
        };
        if old.step_number < 3 {
            assert_eq!(new.step_number, old.step_number);
        } else {
            assert_eq!(new.step_number, old.step_number - 1);
        }
    }
}

#[tokio::test]
async fn test_json_store_keeps_order_across_reload() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(JsonFileStore::new(temp_dir.path()));

    let mut registry = StepRegistry::new(store.clone());
    assert_eq!(registry.seed_defaults().await.unwrap(), 5);
    let steps = registry.list_all();
    registry
        .move_step(steps[4].id, MoveDirection::Up)
        .await
        .unwrap();
    registry.remove(steps[0].id).await.unwrap();
    registry.toggle_active(steps[1].id).await.unwrap();
    let expected = registry.list_all();

    let reloaded = StepRegistry::load(store).await.unwrap();
    assert_eq!(reloaded.list_all(), expected);
    assert_dense(&reloaded.list_all());
    assert!(!reloaded.get(steps[1].id).unwrap().is_active);
}

// ─── Patient progression ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_advance_then_retreat_returns_to_start() {
    let store = Arc::new(MemoryStore::new());
    let (registry, [a, b, _]) = abc_registry(store.clone()).await;
    let mut tracker = PatientProgressTracker::new(store);
    let patient = PatientId::new("p-1");

    tracker.assign(&registry, patient.clone(), a.id).await.unwrap();
    let advanced = tracker.advance(&registry, &patient).await.unwrap();
    assert_eq!(advanced.current_step_id, b.id);
    let back = tracker.retreat(&registry, &patient).await.unwrap();
    assert_eq!(back.current_step_id, a.id);
}

#[tokio::test]
async fn test_end_to_end_deactivated_step_scenario() {
    let store = Arc::new(MemoryStore::new());
    let (mut registry, [a, b, c]) = abc_registry(store.clone()).await;
    let mut tracker = PatientProgressTracker::new(store);
    let patient = PatientId::new("P");

    tracker.assign(&registry, patient.clone(), a.id).await.unwrap();
    let at_b = tracker.advance(&registry, &patient).await.unwrap();
    assert_eq!(at_b.current_step_id, b.id);

    // Deactivating the current step leaves the patient where they are
    registry.toggle_active(b.id).await.unwrap();
    let parked = tracker.progress(&patient).await.unwrap();
    assert_eq!(parked.current_step_id, b.id);
    assert_eq!(
        tracker.current_phase(&registry, &patient).await.unwrap(),
        Phase::Planning
    );

    let at_c = tracker.advance(&registry, &patient).await.unwrap();
    assert_eq!(at_c.current_step_id, c.id);

    let back = tracker.retreat(&registry, &patient).await.unwrap();
    assert_eq!(back.current_step_id, a.id);
    assert_eq!(
        tracker.current_phase(&registry, &patient).await.unwrap(),
        Phase::Initial
    );

    // From A, the inactive B is skipped going forward too
    let forward = tracker.advance(&registry, &patient).await.unwrap();
    assert_eq!(forward.current_step_id, c.id);
}

#[tokio::test]
async fn test_boundaries_report_invalid_transition() {
    let store = Arc::new(MemoryStore::new());
    let (registry, [a, _, c]) = abc_registry(store.clone()).await;
    let mut tracker = PatientProgressTracker::new(store);
    let first = PatientId::new("first");
    let last = PatientId::new("last");

    tracker.assign(&registry, first.clone(), a.id).await.unwrap();
    tracker.assign(&registry, last.clone(), c.id).await.unwrap();

    let err = tracker.retreat(&registry, &first).await.unwrap_err();
    assert!(matches!(err, JourneyError::NoPreviousStep));
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let err = tracker.advance(&registry, &last).await.unwrap_err();
    assert!(matches!(err, JourneyError::NoNextStep));

    let err = tracker
        .advance(&registry, &PatientId::new("nobody"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_progress_reloads_and_lands_on_board() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(JsonFileStore::new(temp_dir.path()));
    let mut registry = StepRegistry::new(store.clone());
    registry.seed_defaults().await.unwrap();
    let steps = registry.list_all();

    let mut tracker = PatientProgressTracker::new(store.clone());
    tracker
        .admit(&registry, PatientId::new("p-1"))
        .await
        .unwrap();
    tracker
        .admit(&registry, PatientId::new("p-2"))
        .await
        .unwrap();
    tracker
        .advance(&registry, &PatientId::new("p-2"))
        .await
        .unwrap();

    let reloaded = PatientProgressTracker::load(store).await.unwrap();
    let board = JourneyBoard::build(registry.steps(), &reloaded.list());

    assert_eq!(board.total_patients, 2);
    assert_eq!(board.columns.len(), steps.len());
    assert_eq!(board.column(steps[0].id).unwrap().patients.len(), 1);
    assert_eq!(board.column(steps[1].id).unwrap().patients.len(), 1);
    assert!(board.unplaced.is_empty());
}

// ─── Intake wizard ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_intake_flow_records_one_inquiry() {
    let sink = MemoryStore::new();
    let mut wizard = IntakeWizard::new();

    let state = wizard
        .submit_stage(
            IntakeStage::Medical,
            object(json!({
                "condition": "back pain",
                "treatment": "spinal fusion",
                "urgency": "medium"
            })),
            &sink,
        )
        .await
        .unwrap();
    assert_eq!(state, WizardState::Stage { stage: IntakeStage::Personal });

    let state = wizard
        .submit_stage(
            IntakeStage::Personal,
            object(json!({
                "fullName": "Jane Doe",
                "email": "jane@x.com",
                "phone": "+1234567890",
                "country": "Kenya",
                "age": 34,
                "gender": "female"
            })),
            &sink,
        )
        .await
        .unwrap();
    assert_eq!(state, WizardState::Stage { stage: IntakeStage::Preferences });

    let state = wizard
        .submit_stage(
            IntakeStage::Preferences,
            object(json!({"budget": "10000-20000"})),
            &sink,
        )
        .await
        .unwrap();
    assert_eq!(state, WizardState::Stage { stage: IntakeStage::Review });

    let state = wizard
        .submit_stage(IntakeStage::Review, Map::new(), &sink)
        .await
        .unwrap();
    assert!(matches!(state, WizardState::Submitted { .. }));

    let inquiries = sink.inquiries().await;
    assert_eq!(inquiries.len(), 1);
    let (_, record) = &inquiries[0];
    assert_eq!(record.text("condition"), Some("back pain"));
    assert_eq!(record.text("treatment"), Some("spinal fusion"));
    assert_eq!(record.text("urgency"), Some("medium"));
    assert_eq!(record.text("fullName"), Some("Jane Doe"));
    assert_eq!(record.text("email"), Some("jane@x.com"));
    assert_eq!(record.text("phone"), Some("+1234567890"));
    assert_eq!(record.text("country"), Some("Kenya"));
    assert_eq!(record.get("age"), Some(&json!(34)));
    assert_eq!(record.text("gender"), Some("female"));
    assert_eq!(record.text("budget"), Some("10000-20000"));
}

#[tokio::test]
async fn test_empty_condition_is_rejected_on_stage_one() {
    let sink = MemoryStore::new();
    let mut wizard = IntakeWizard::new();

    let err = wizard
        .submit_stage(
            IntakeStage::Medical,
            object(json!({"condition": "", "treatment": "knee replacement", "urgency": "low"})),
            &sink,
        )
        .await
        .unwrap_err();

    let fields = err.field_errors().expect("validation error carries fields");
    assert!(fields.contains("condition"));
    assert!(!fields.contains("treatment"));
    assert_eq!(wizard.stage(), Some(IntakeStage::Medical));
    assert_eq!(
        wizard.prefill(IntakeStage::Medical).get("treatment"),
        Some(&json!("knee replacement"))
    );
}

#[tokio::test]
async fn test_failed_submit_keeps_data_for_retry() {
    let sink = MemoryStore::new();
    let mut wizard = IntakeWizard::new();
    wizard
        .submit_stage(
            IntakeStage::Medical,
            object(json!({"condition": "cataract", "treatment": "lens surgery", "urgency": "high"})),
            &sink,
        )
        .await
        .unwrap();
    wizard
        .submit_stage(
            IntakeStage::Personal,
            object(json!({
                "fullName": "Amir Haddad",
                "email": "amir@example.org",
                "phone": "+971500000000",
                "country": "UAE",
                "age": "61",
                "gender": "male"
            })),
            &sink,
        )
        .await
        .unwrap();
    wizard
        .submit_stage(
            IntakeStage::Preferences,
            object(json!({"budget": "5000-10000", "destination": "Turkey"})),
            &sink,
        )
        .await
        .unwrap();

    sink.set_fail_writes(true);
    let err = wizard
        .submit_stage(IntakeStage::Review, Map::new(), &sink)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailed);
    assert_eq!(wizard.stage(), Some(IntakeStage::Review));
    assert_eq!(wizard.data().get("destination"), Some(&json!("Turkey")));

    sink.set_fail_writes(false);
    let state = wizard
        .submit_stage(IntakeStage::Review, Map::new(), &sink)
        .await
        .unwrap();
    assert!(state.is_terminal());
    assert_eq!(sink.inquiries().await.len(), 1);
}
