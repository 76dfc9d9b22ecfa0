//! Maps raw request outcomes onto [`ErrorCategory`] and display messages.

use serde_json::Value;

use crate::executor::{RawOutcome, TransportFailure};
use crate::outcome::{ClassifiedError, ErrorCategory, OperationOutcome};

pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";
pub const PROTOCOL_MESSAGE: &str = "Invalid response from server";
pub const AUTH_MESSAGE: &str = "Invalid API key. Please check your configuration.";
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable. Please try again.";

/// Default application-failure text for the price lookup.
pub const LOOKUP_FALLBACK: &str = "Request failed";
/// Default application-failure text for the history listing.
pub const HISTORY_FALLBACK: &str = "Failed to load history";

/// Classifies `outcome`. On success the value is the body's `data` field
/// (`Value::Null` when absent) together with any `warning`.
///
/// `fallback` is shown for a `success: false` reply that carries no `error`.
pub fn classify(outcome: RawOutcome, fallback: &str) -> OperationOutcome<Value> {
    match outcome {
        RawOutcome::TransportFailure(TransportFailure::Timeout) => {
            OperationOutcome::failure(ErrorCategory::Timeout, TIMEOUT_MESSAGE)
        }
        RawOutcome::TransportFailure(TransportFailure::Aborted) => {
            OperationOutcome::Failure(ClassifiedError::cancelled())
        }
        RawOutcome::TransportFailure(TransportFailure::NetworkError) => {
            OperationOutcome::failure(ErrorCategory::Network, NETWORK_MESSAGE)
        }
        RawOutcome::DecodeFailure { .. } => {
            OperationOutcome::failure(ErrorCategory::Protocol, PROTOCOL_MESSAGE)
        }
        RawOutcome::Ok { status, body } if is_success_status(status) => {
            classify_success_status(body, fallback)
        }
        RawOutcome::Ok { status, body } => classify_error_status(status, &body),
    }
}

const fn is_success_status(status: u16) -> bool {
    status >= 200 && status < 300
}

fn classify_success_status(mut body: Value, fallback: &str) -> OperationOutcome<Value> {
    let flagged = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !flagged {
        let message = error_text(&body).unwrap_or(fallback).to_owned();
        return OperationOutcome::failure(ErrorCategory::Application, message);
    }

    let warning = body
        .get("warning")
        .and_then(Value::as_str)
        .filter(|warning| !warning.is_empty())
        .map(str::to_owned);
    let data = body
        .as_object_mut()
        .and_then(|object| object.remove("data"))
        .unwrap_or(Value::Null);

    OperationOutcome::Success {
        value: data,
        warning,
    }
}

fn classify_error_status(status: u16, body: &Value) -> OperationOutcome<Value> {
    let server_message = || {
        error_text(body)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Request failed with status {status}"))
    };

    match status {
        400 => OperationOutcome::failure(
            ErrorCategory::Validation,
            format!("Validation Error: {}", server_message()),
        ),
        403 => OperationOutcome::failure(ErrorCategory::Auth, AUTH_MESSAGE),
        429 => OperationOutcome::failure(ErrorCategory::RateLimit, RATE_LIMIT_MESSAGE),
        503 => OperationOutcome::failure(ErrorCategory::Unavailable, UNAVAILABLE_MESSAGE),
        _ => OperationOutcome::failure(ErrorCategory::Generic, server_message()),
    }
}

fn error_text(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
}
