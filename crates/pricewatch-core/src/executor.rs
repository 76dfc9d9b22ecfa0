//! Bounded, cancellable request execution.
//!
//! Each logical action owns one [`RequestExecutor`]. Issuing a ticket cancels
//! the previous ticket of the same executor, so at most one call per action is
//! ever live and the newest call wins. Tickets are also stamped with a
//! monotonically increasing sequence number that callers use to discard late
//! outcomes.

use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::API_KEY_HEADER;
use crate::http_client::{HttpAuth, HttpClient, HttpErrorKind, HttpMethod, HttpRequest};
use crate::ClientConfig;

/// Logical action a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Lookup,
    History,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::History => "history",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to send: method, path relative to the base url, optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFailure {
    Timeout,
    NetworkError,
    Aborted,
}

/// Normalized result of one call, before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutcome {
    Ok { status: u16, body: Value },
    TransportFailure(TransportFailure),
    DecodeFailure { status: u16 },
}

/// Handle for one issued call.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    action: Action,
    sequence: u64,
    cancel: CancellationToken,
}

impl RequestTicket {
    pub const fn action(&self) -> Action {
        self.action
    }

    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Cancels the call; it settles as `TransportFailure(Aborted)`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct Slot {
    sequence: u64,
    cancel: Option<CancellationToken>,
}

/// Issues bounded calls for a single action, enforcing last-request-wins.
pub struct RequestExecutor {
    action: Action,
    client: Arc<dyn HttpClient>,
    config: Arc<ClientConfig>,
    slot: Mutex<Slot>,
}

impl RequestExecutor {
    pub fn new(action: Action, client: Arc<dyn HttpClient>, config: Arc<ClientConfig>) -> Self {
        Self {
            action,
            client,
            config,
            slot: Mutex::new(Slot::default()),
        }
    }

    pub const fn action(&self) -> Action {
        self.action
    }

    /// Cancels any outstanding call for this action and stamps a new ticket.
    pub fn issue(&self) -> RequestTicket {
        let mut slot = self.slot.lock().expect("executor slot lock is not poisoned");
        if let Some(previous) = slot.cancel.take() {
            if !previous.is_cancelled() {
                tracing::debug!(action = %self.action, superseded = slot.sequence, "cancelling superseded request");
            }
            previous.cancel();
        }

        slot.sequence += 1;
        let cancel = CancellationToken::new();
        slot.cancel = Some(cancel.clone());

        RequestTicket {
            action: self.action,
            sequence: slot.sequence,
            cancel,
        }
    }

    /// Whether `ticket` is still the most recently issued one.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        let slot = self.slot.lock().expect("executor slot lock is not poisoned");
        slot.sequence == ticket.sequence
    }

    /// Cancels the outstanding call, if one is live. Returns whether anything
    /// was cancelled.
    pub fn cancel_outstanding(&self) -> bool {
        let slot = self.slot.lock().expect("executor slot lock is not poisoned");
        match &slot.cancel {
            Some(cancel) if !cancel.is_cancelled() => {
                tracing::debug!(action = %self.action, sequence = slot.sequence, "cancelling outstanding request");
                cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Runs the call for `ticket`, bounded by the configured timeout.
    pub async fn execute(&self, ticket: &RequestTicket, spec: RequestSpec) -> RawOutcome {
        let outcome = self.run(ticket, spec).await;
        self.release(ticket);
        outcome
    }

    fn release(&self, ticket: &RequestTicket) {
        let mut slot = self.slot.lock().expect("executor slot lock is not poisoned");
        if slot.sequence == ticket.sequence {
            slot.cancel = None;
        }
    }

    async fn run(&self, ticket: &RequestTicket, spec: RequestSpec) -> RawOutcome {
        if ticket.is_cancelled() {
            return RawOutcome::TransportFailure(TransportFailure::Aborted);
        }

        let request = self.build_request(spec);
        let timeout = self.config.request_timeout();
        tracing::debug!(
            action = %self.action,
            sequence = ticket.sequence,
            method = request.method.as_str(),
            url = %request.url,
            "issuing request"
        );

        let response = tokio::select! {
            biased;
            _ = ticket.cancel.cancelled() => {
                tracing::debug!(action = %self.action, sequence = ticket.sequence, "request aborted");
                return RawOutcome::TransportFailure(TransportFailure::Aborted);
            }
            result = tokio::time::timeout(timeout, self.client.execute(request)) => result,
        };

        let response = match response {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                tracing::warn!(action = %self.action, sequence = ticket.sequence, error = %error, "transport failure");
                let reason = match error.kind() {
                    HttpErrorKind::Timeout => TransportFailure::Timeout,
                    HttpErrorKind::Connect | HttpErrorKind::Other => TransportFailure::NetworkError,
                };
                return RawOutcome::TransportFailure(reason);
            }
            Err(_) => {
                tracing::warn!(
                    action = %self.action,
                    sequence = ticket.sequence,
                    timeout_ms = timeout.as_millis() as u64,
                    "request timed out"
                );
                return RawOutcome::TransportFailure(TransportFailure::Timeout);
            }
        };

        let status = response.status;
        match serde_json::from_str::<Value>(&response.body) {
            Ok(body) => {
                tracing::debug!(action = %self.action, sequence = ticket.sequence, status, "response received");
                RawOutcome::Ok { status, body }
            }
            Err(error) => {
                tracing::warn!(action = %self.action, sequence = ticket.sequence, status, error = %error, "undecodable response body");
                RawOutcome::DecodeFailure { status }
            }
        }
    }

    fn build_request(&self, spec: RequestSpec) -> HttpRequest {
        let mut request = HttpRequest::new(spec.method, self.config.endpoint(&spec.path))
            .with_header("Accept", "application/json")
            .with_timeout(self.config.request_timeout());

        if let Some(body) = spec.body {
            request = request
                .with_header("Content-Type", "application/json")
                .with_body(body.to_string());
        }

        let auth = match self.config.api_key() {
            Some(key) => HttpAuth::Header {
                name: String::from(API_KEY_HEADER),
                value: key.to_owned(),
            },
            None => HttpAuth::None,
        };
        request.with_auth(&auth)
    }
}
