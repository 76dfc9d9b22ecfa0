//! Behavior-driven tests for the price lookup journey
//!
//! These tests verify what a user sees after submitting a lookup: the stored
//! result or error, the local validation short-circuit, supersession of
//! in-flight requests and the follow-up history refresh.

mod support;

use std::time::Duration;

use pricewatch_core::{
    ClassifiedError, ErrorCategory, InvalidReason, RequestLifecycleState, ScriptedHttpClient,
    ScriptedReply,
};
use serde_json::json;
use tokio::time::Instant;

use support::{history_ok, orchestrators, price_ok, two_entries, HISTORY, PRICE};

// =============================================================================
// Lookup: Successful Responses
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_server_returns_price_user_sees_result_and_history_refresh_is_scheduled() {
    // Given: A server that knows the bitcoin price
    let client = ScriptedHttpClient::new()
        .route(PRICE, price_ok("bitcoin", 50000.0, 2.5))
        .route(HISTORY, history_ok(two_entries()));
    let (lookup, history) = orchestrators(&client);

    // When: The user submits a lookup
    let outcome = lookup.submit("bitcoin", "a@b.com").await;

    // Then: The result is stored without an error
    let result = outcome.value().expect("lookup should succeed");
    assert_eq!(result.asset, "bitcoin");
    assert_eq!(result.price, 50000.0);
    assert_eq!(result.change_24h, 2.5);

    let snapshot = lookup.snapshot();
    assert_eq!(snapshot.lifecycle, RequestLifecycleState::Settled);
    assert_eq!(snapshot.result.as_ref(), Some(result));
    assert!(snapshot.error.is_none());

    // And: Exactly one history refresh is scheduled, not yet issued
    assert_eq!(lookup.scheduled_refreshes(), 1);
    assert_eq!(client.request_count(HISTORY), 0);
    assert!(history.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn history_refresh_runs_after_the_delay_and_not_before() {
    // Given: A successful lookup
    let client = ScriptedHttpClient::new()
        .route(PRICE, price_ok("bitcoin", 50000.0, 2.5))
        .route(HISTORY, history_ok(two_entries()));
    let (lookup, history) = orchestrators(&client);
    let started = Instant::now();
    lookup.submit("bitcoin", "a@b.com").await;

    // When: Less than the refresh delay has elapsed
    tokio::time::sleep(Duration::from_millis(1_400)).await;

    // Then: History has not been requested yet
    assert_eq!(client.request_count(HISTORY), 0);

    // When: The scheduled refresh completes
    lookup.wait_for_scheduled_refresh().await;

    // Then: History was fetched once, after 1.5s, and replaced wholesale
    assert!(started.elapsed() >= Duration::from_millis(1_500));
    assert_eq!(client.request_count(HISTORY), 1);
    assert_eq!(history.entries().len(), 2);
    assert_eq!(lookup.scheduled_refreshes(), 1);
}

#[tokio::test(start_paused = true)]
async fn server_warning_is_shown_alongside_a_successful_result() {
    // Given: The server succeeded but could not send the email yet
    let client = ScriptedHttpClient::new().route(
        PRICE,
        ScriptedReply::json(
            200,
            json!({
                "success": true,
                "data": { "cryptocurrency": "solana", "price": 101.0, "change24h": -3.0 },
                "warning": "Email delivery delayed"
            }),
        ),
    );
    let (lookup, _history) = orchestrators(&client);

    // When: The user submits a lookup
    let outcome = lookup.submit("solana", "a@b.com").await;

    // Then: The result stands and the warning is carried next to it
    assert!(outcome.is_success());
    assert_eq!(outcome.warning(), Some("Email delivery delayed"));
    let snapshot = lookup.snapshot();
    assert!(snapshot.result.is_some());
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.warning.as_deref(), Some("Email delivery delayed"));
}

#[tokio::test(start_paused = true)]
async fn request_body_uses_trimmed_wire_fields() {
    // Given: Input with stray whitespace and capitals
    let client = ScriptedHttpClient::new().route(PRICE, price_ok("ethereum", 3000.0, 0.0));
    let (lookup, _history) = orchestrators(&client);

    // When: The user submits it
    lookup.submit(" Ethereum ", "  me@example.com ").await;

    // Then: The server receives normalized values
    let sent = client.requests();
    let body: serde_json::Value =
        serde_json::from_str(sent[0].body.as_deref().expect("body")).expect("json body");
    assert_eq!(body, json!({ "cryptocurrency": "ethereum", "email": "me@example.com" }));
}

// =============================================================================
// Lookup: Local Validation
// =============================================================================

#[tokio::test]
async fn empty_address_is_rejected_before_any_network_call() {
    // Given: A user who left the address blank
    let client = ScriptedHttpClient::new().route(PRICE, price_ok("bitcoin", 1.0, 0.0));
    let (lookup, _history) = orchestrators(&client);

    // When: They submit
    let outcome = lookup.submit("bitcoin", "").await;

    // Then: InputInvalid(Empty) is surfaced and nothing was sent
    let error = outcome.error().expect("must fail");
    assert_eq!(error.category(), ErrorCategory::InputInvalid);
    assert_eq!(error.message(), InvalidReason::Empty.message());
    assert!(client.requests().is_empty());

    // And: The lifecycle never entered InFlight
    let snapshot = lookup.snapshot();
    assert_eq!(snapshot.lifecycle, RequestLifecycleState::Idle);
    assert_eq!(snapshot.input_error.as_ref(), Some(error));
    assert_eq!(lookup.scheduled_refreshes(), 0);
}

#[tokio::test]
async fn oversized_address_is_too_long_even_when_well_formed() {
    // Given: A syntactically valid 260 character address
    let domain = vec!["d".repeat(60); 4].join(".");
    let address = format!("{}@{domain}", "u".repeat(16));
    let client = ScriptedHttpClient::new();
    let (lookup, _history) = orchestrators(&client);

    // When: It is submitted
    let outcome = lookup.submit("bitcoin", &address).await;

    // Then: The length rule rejects it
    assert_eq!(
        outcome.error().map(ClassifiedError::message),
        Some(InvalidReason::TooLong.message())
    );
    assert!(client.requests().is_empty());
}

// =============================================================================
// Lookup: Failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn timeout_clears_previous_result_and_leaves_history_alone() {
    // Given: A first lookup succeeded and history was loaded
    let client = ScriptedHttpClient::new()
        .route(PRICE, price_ok("bitcoin", 50000.0, 2.5))
        .route(
            PRICE,
            price_ok("bitcoin", 1.0, 0.0).after(Duration::from_secs(45)),
        )
        .route(HISTORY, history_ok(two_entries()));
    let (lookup, history) = orchestrators(&client);
    lookup.submit("bitcoin", "a@b.com").await;
    lookup.wait_for_scheduled_refresh().await;
    let history_before = history.entries();

    // When: The next lookup takes longer than 30 seconds
    let outcome = lookup.submit("bitcoin", "a@b.com").await;

    // Then: A timeout is reported and the old result is gone
    let error = outcome.error().expect("must time out");
    assert_eq!(error.category(), ErrorCategory::Timeout);
    assert_eq!(error.message(), "Request timeout. Please try again.");
    let snapshot = lookup.snapshot();
    assert!(snapshot.result.is_none());
    assert_eq!(snapshot.error.as_ref(), Some(error));
    assert_eq!(snapshot.lifecycle, RequestLifecycleState::Settled);

    // And: History is untouched and no extra refresh was scheduled
    assert_eq!(history.entries(), history_before);
    assert_eq!(lookup.scheduled_refreshes(), 1);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_lookup_uses_the_mapped_message_not_the_server_text() {
    // Given: The server is rate limiting
    let client = ScriptedHttpClient::new().route(
        PRICE,
        ScriptedReply::json(429, json!({ "error": "too many requests" })),
    );
    let (lookup, _history) = orchestrators(&client);

    // When: The user submits
    let outcome = lookup.submit("bitcoin", "a@b.com").await;

    // Then: The fixed rate-limit message is shown
    let error = outcome.error().expect("must fail");
    assert_eq!(error.category(), ErrorCategory::RateLimit);
    assert_eq!(error.message(), "Rate limit exceeded. Please try again later.");
    assert_eq!(lookup.scheduled_refreshes(), 0);
}

#[tokio::test(start_paused = true)]
async fn success_after_failure_clears_the_error() {
    // Given: A failed lookup
    let client = ScriptedHttpClient::new()
        .route(PRICE, ScriptedReply::json(503, json!({ "error": "down" })))
        .route(PRICE, price_ok("bitcoin", 42.0, 1.0));
    let (lookup, _history) = orchestrators(&client);
    lookup.submit("bitcoin", "a@b.com").await;
    assert_eq!(
        lookup.snapshot().error.map(|error| error.category()),
        Some(ErrorCategory::Unavailable)
    );

    // When: The retry succeeds
    lookup.submit("bitcoin", "a@b.com").await;

    // Then: Only the result remains
    let snapshot = lookup.snapshot();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.result.map(|result| result.price), Some(42.0));
}

// =============================================================================
// Lookup: Supersession
// =============================================================================

#[tokio::test(start_paused = true)]
async fn newer_submit_wins_over_a_slow_earlier_one() {
    // Given: The first lookup is slow, the second fast
    let client = ScriptedHttpClient::new()
        .route(
            PRICE,
            price_ok("bitcoin", 1.0, 0.0).after(Duration::from_secs(5)),
        )
        .route(PRICE, price_ok("ethereum", 2.0, 0.0));
    let (lookup, _history) = orchestrators(&client);

    let first = lookup.clone();
    let slow = tokio::spawn(async move { first.submit("bitcoin", "a@b.com").await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(lookup.snapshot().lifecycle, RequestLifecycleState::InFlight);

    // When: A second lookup is submitted while the first is in flight
    let second = lookup.submit("ethereum", "a@b.com").await;
    let first_outcome = slow.await.expect("task completes");

    // Then: The first call reports a suppressed cancellation
    let cancelled = first_outcome.error().expect("superseded call fails");
    assert_eq!(cancelled.category(), ErrorCategory::Cancelled);
    assert!(cancelled.is_suppressed());

    // And: Only the second outcome is stored
    assert_eq!(second.value().map(|result| result.price), Some(2.0));
    let snapshot = lookup.snapshot();
    assert_eq!(snapshot.result.map(|result| result.asset), Some(String::from("ethereum")));
    assert!(snapshot.error.is_none());
    assert_eq!(client.request_count(PRICE), 2);
    assert_eq!(lookup.scheduled_refreshes(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_failure_of_superseded_call_does_not_surface() {
    // Given: The first lookup would eventually fail
    let client = ScriptedHttpClient::new()
        .route(
            PRICE,
            ScriptedReply::json(500, json!({ "error": "boom" })).after(Duration::from_secs(3)),
        )
        .route(PRICE, price_ok("bitcoin", 7.0, 0.0));
    let (lookup, _history) = orchestrators(&client);

    let first = lookup.clone();
    let slow = tokio::spawn(async move { first.submit("bitcoin", "a@b.com").await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    // When: A second lookup succeeds and the clock runs past the first reply
    lookup.submit("bitcoin", "a@b.com").await;
    slow.await.expect("task completes");
    tokio::time::sleep(Duration::from_secs(5)).await;

    // Then: No error is ever stored
    let snapshot = lookup.snapshot();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.result.map(|result| result.price), Some(7.0));
}
