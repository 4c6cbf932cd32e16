//! End-to-end runs of the submission controller against scripted transports.

mod common;

use common::{fill_valid, json, memory_controller, ok, ScriptedTransport, VALID_FIELDS};
use galeria_client::{
    ButtonLabel, FileStorage, PhotoPreview, Rejection, SubmissionState, SubmitControl,
    SubmitOutcome, UiEffect,
};
use galeria_core::{Clock, GaleriaError, ManualClock, Severity};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

// =============================================================================
// Rejections before the network
// =============================================================================

#[tokio::test]
async fn test_underage_never_reaches_network() {
    let transport = ScriptedTransport::new(vec![ok(201)]);
    let clock = ManualClock::new();
    let ctrl = memory_controller(transport.clone(), &clock);
    fill_valid(&ctrl);
    ctrl.on_input("idade", "17").unwrap();

    let outcome = ctrl.submit().await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Rejected(Rejection::AgeOutOfRange { age: 17 })
    ));
    assert_eq!(transport.calls(), 0);

    let ctx = ctrl.context();
    let note = ctx.notifications.latest().unwrap();
    assert_eq!(note.severity, Severity::Error);
    assert!(note.message.contains("18"));
    assert_eq!(ctx.form.value("nome"), Some("Ana Silva"));
    assert_eq!(ctx.form.value("idade"), Some("17"));
    assert!(ctx.form.photo().is_some());
}

#[tokio::test]
async fn test_overage_message() {
    let transport = ScriptedTransport::new(vec![]);
    let clock = ManualClock::new();
    let ctrl = memory_controller(transport.clone(), &clock);
    fill_valid(&ctrl);
    ctrl.on_input("idade", "70").unwrap();

    assert!(matches!(
        ctrl.submit().await,
        SubmitOutcome::Rejected(Rejection::AgeOutOfRange { age: 70 })
    ));
    let ctx = ctrl.context();
    assert!(ctx.notifications.latest().unwrap().message.contains("65"));
}

#[tokio::test]
async fn test_unticked_terms_block_submission() {
    let transport = ScriptedTransport::new(vec![ok(201)]);
    let clock = ManualClock::new();
    let ctrl = memory_controller(transport.clone(), &clock);
    fill_valid(&ctrl);
    ctrl.on_check("termos", false).unwrap();

    let outcome = ctrl.submit().await;

    let SubmitOutcome::Rejected(Rejection::InvalidFields(report)) = outcome else {
        panic!("expected a field rejection");
    };
    assert_eq!(report.errors().map(|(name, _)| name).collect::<Vec<_>>(), vec!["termos"]);
    assert_eq!(transport.calls(), 0);
    assert_eq!(ctrl.context().form.error_for("termos"), Some("This field is required."));
    assert_eq!(ctrl.snapshot().state, SubmissionState::Idle);
}

// =============================================================================
// Success
// =============================================================================

#[tokio::test]
async fn test_successful_submission_resets_everything() {
    let transport = ScriptedTransport::new(vec![ok(201)]);
    let clock = ManualClock::new();
    let ctrl = memory_controller(transport.clone(), &clock);
    transport.observe(ctrl.subscribe());

    fill_valid(&ctrl);
    clock.advance(Duration::from_millis(500));
    assert_eq!(ctrl.tick(), VALID_FIELDS.len());
    // Typed after the last flush; still pending when the submit succeeds.
    ctrl.on_input("cidade", "Porto").unwrap();

    let outcome = ctrl.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Succeeded { status: 201 }));

    // While the request was in flight the control was locked.
    let seen = transport.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].state, SubmissionState::Submitting);
    assert!(!seen[0].control.enabled);
    assert_eq!(seen[0].control.label, ButtonLabel::Loading);

    // The request carried every field, the photo and the timestamp.
    let request = &transport.requests()[0];
    assert_eq!(request.payload.field("cidade"), Some("Porto"));
    assert_eq!(request.payload.field("termos"), Some("on"));
    assert_eq!(request.payload.photo.as_ref().unwrap().0, "foto");
    assert_eq!(request.payload.timestamp, clock.now_utc());

    // Back to idle with the control restored.
    let snapshot = ctrl.snapshot();
    assert_eq!(snapshot.state, SubmissionState::Idle);
    assert_eq!(snapshot.control, SubmitControl::READY);

    assert_eq!(
        ctrl.take_effects(),
        vec![UiEffect::PhotoPlaceholderRestored, UiEffect::ScrollToForm]
    );

    clock.advance(Duration::from_millis(500));
    assert_eq!(ctrl.tick(), 0);

    let ctx = ctrl.context();
    for (name, _) in VALID_FIELDS {
        assert_eq!(ctx.form.value(name), Some(""), "{name} was not reset");
        assert_eq!(ctx.autosave.load(name).unwrap(), None, "{name} draft survived");
    }
    assert_eq!(ctx.form.preview(), &PhotoPreview::Placeholder);
    assert!(ctx.form.photo().is_none());

    let note = ctx.notifications.latest().unwrap();
    assert_eq!(note.severity, Severity::Success);
    assert_eq!(note.message, "Application sent successfully! We will be in touch soon.");
}

#[tokio::test]
async fn test_success_after_transport_retries() {
    let mut script = ScriptedTransport::failing(2);
    script.push(ok(200));
    let transport = ScriptedTransport::new(script);
    let clock = ManualClock::new();
    let ctrl = memory_controller(transport.clone(), &clock);
    fill_valid(&ctrl);

    assert!(ctrl.submit().await.is_success());
    assert_eq!(transport.calls(), 3);
    assert_eq!(clock.total_slept(), Duration::from_millis(3000));

    // Every attempt of one submission carries the same attempt id.
    let ids: Vec<_> = transport.requests().iter().map(|r| r.attempt_id).collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_server_rejection_shows_detail() {
    let transport = ScriptedTransport::new(vec![json(
        422,
        serde_json::json!({ "error": "validation", "detalhe": "email duplicado" }),
    )]);
    let clock = ManualClock::new();
    let ctrl = memory_controller(transport.clone(), &clock);
    fill_valid(&ctrl);

    let outcome = ctrl.submit().await;

    let SubmitOutcome::Failed(GaleriaError::Application { status, detail }) = outcome else {
        panic!("expected an application error");
    };
    assert_eq!(status, 422);
    assert_eq!(detail, "email duplicado");
    assert_eq!(transport.calls(), 1);

    let ctx = ctrl.context();
    assert_eq!(
        ctx.notifications.latest().unwrap().message,
        "Error sending application: email duplicado"
    );
    // Nothing is lost on failure.
    assert_eq!(ctx.form.value("nome"), Some("Ana Silva"));
    assert!(ctx.form.photo().is_some());
    drop(ctx);
    assert_eq!(ctrl.snapshot().control, SubmitControl::READY);
    assert!(ctrl.take_effects().is_empty());
}

#[tokio::test]
async fn test_server_rejection_without_detail() {
    let transport = ScriptedTransport::new(vec![Ok(galeria_client::TransportResponse::new(
        502,
        "<html>Bad Gateway</html>",
    ))]);
    let clock = ManualClock::new();
    let ctrl = memory_controller(transport.clone(), &clock);
    fill_valid(&ctrl);

    ctrl.submit().await;

    assert_eq!(
        ctrl.context().notifications.latest().unwrap().message,
        "Error sending application: Unknown error"
    );
}

#[tokio::test]
async fn test_connection_failure_after_retries() {
    let transport = ScriptedTransport::new(ScriptedTransport::failing(3));
    let clock = ManualClock::new();
    let ctrl = memory_controller(transport.clone(), &clock);
    fill_valid(&ctrl);

    let outcome = ctrl.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(GaleriaError::Transport(_))));
    assert_eq!(transport.calls(), 3);

    let ctx = ctrl.context();
    let note = ctx.notifications.latest().unwrap();
    assert_eq!(note.severity, Severity::Error);
    assert_eq!(note.message, "Connection error: connection failed: connection refused");
    drop(ctx);
    assert_eq!(ctrl.snapshot().state, SubmissionState::Idle);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_only_one_attempt_in_flight() {
    let gate = Arc::new(Notify::new());
    let transport = ScriptedTransport::held(vec![ok(201)], gate.clone());
    let clock = ManualClock::new();
    let ctrl = memory_controller(transport.clone(), &clock);
    fill_valid(&ctrl);

    let (first, second) = tokio::join!(ctrl.submit(), async {
        // Let the first submission reach the transport.
        while transport.calls() == 0 {
            tokio::task::yield_now().await;
        }
        let outcome = ctrl.submit().await;
        gate.notify_one();
        outcome
    });

    assert!(first.is_success());
    assert!(matches!(second, SubmitOutcome::Busy));
    assert_eq!(transport.calls(), 1);
    assert_eq!(ctrl.snapshot().state, SubmissionState::Idle);
}

// =============================================================================
// Drafts across restarts
// =============================================================================

#[tokio::test]
async fn test_drafts_restored_by_new_controller() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drafts.json");
    let clock = ManualClock::new();

    {
        let ctrl = common::controller(
            ScriptedTransport::new(vec![]),
            &clock,
            Box::new(FileStorage::open(&path).unwrap()),
        );
        ctrl.on_input("nome", "Ana Silva").unwrap();
        ctrl.on_input("cidade", "Faro").unwrap();
        ctrl.on_check("termos", true).unwrap();
        clock.advance(Duration::from_millis(600));
        assert_eq!(ctrl.tick(), 2);
    }

    let ctrl = common::controller(
        ScriptedTransport::new(vec![]),
        &clock,
        Box::new(FileStorage::open(&path).unwrap()),
    );
    let ctx = ctrl.context();
    assert_eq!(ctx.form.value("nome"), Some("Ana Silva"));
    assert_eq!(ctx.form.value("cidade"), Some("Faro"));
    assert_eq!(ctx.form.value("termos"), Some(""));
}
