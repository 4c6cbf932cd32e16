//! Retry schedule of the submission fetch, driven by a manual clock.

mod common;

use common::{json, ok, request, ScriptedTransport};
use galeria_client::{fetch_with_retry, RetryPolicy, TransportError};
use galeria_core::ManualClock;
use std::time::Duration;

#[tokio::test]
async fn test_two_failures_then_success() {
    let mut script = ScriptedTransport::failing(2);
    script.push(ok(201));
    let transport = ScriptedTransport::new(script);
    let clock = ManualClock::new();

    let response = fetch_with_retry(&transport, &clock, &request(), &RetryPolicy::default())
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(transport.calls(), 3);
    assert_eq!(
        clock.slept(),
        vec![Duration::from_millis(1000), Duration::from_millis(2000)]
    );
    assert!(clock.total_slept() >= Duration::from_millis(3000));
}

#[tokio::test]
async fn test_exhaustion_after_exactly_max_attempts() {
    let transport = ScriptedTransport::new(ScriptedTransport::failing(5));
    let clock = ManualClock::new();

    let err = fetch_with_retry(&transport, &clock, &request(), &RetryPolicy::default())
        .await
        .unwrap_err();

    assert_eq!(err, TransportError::Connect("connection refused".into()));
    assert_eq!(transport.calls(), 3);
    // No wait after the final attempt.
    assert_eq!(clock.slept().len(), 2);
}

#[tokio::test]
async fn test_http_errors_are_not_retried() {
    for status in [400, 422, 500, 503] {
        let transport = ScriptedTransport::new(vec![json(status, serde_json::json!({"error": "x"})), ok(201)]);
        let clock = ManualClock::new();

        let response = fetch_with_retry(&transport, &clock, &request(), &RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(response.status, status);
        assert_eq!(transport.calls(), 1, "status {status}");
        assert!(clock.slept().is_empty());
    }
}

#[tokio::test]
async fn test_opt_in_server_error_retry() {
    let transport = ScriptedTransport::new(vec![ok(503), ok(502), ok(503)]);
    let clock = ManualClock::new();
    let policy = RetryPolicy::default().retrying_server_errors();

    let response = fetch_with_retry(&transport, &clock, &request(), &policy)
        .await
        .unwrap();

    // The last answer is handed back rather than turned into an error.
    assert_eq!(response.status, 503);
    assert_eq!(transport.calls(), 3);
    assert_eq!(clock.total_slept(), Duration::from_millis(3000));
}

#[tokio::test]
async fn test_single_attempt_policy() {
    let transport = ScriptedTransport::new(ScriptedTransport::failing(2));
    let clock = ManualClock::new();
    let policy = RetryPolicy::default().with_max_attempts(1);

    assert!(fetch_with_retry(&transport, &clock, &request(), &policy).await.is_err());
    assert_eq!(transport.calls(), 1);
    assert!(clock.slept().is_empty());
}
