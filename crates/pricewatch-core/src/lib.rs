//! # Pricewatch Core
//!
//! Client-side orchestration for the crypto price service: look up the price
//! of an asset (the service emails it to a notification address) and keep a
//! refreshed copy of past lookups.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`validation`] | Notification address grammar |
//! | [`executor`] | Bounded, cancellable calls with last-request-wins |
//! | [`classify`] | Raw outcome to user-facing error category |
//! | [`orchestrator`] | Lookup and history orchestrators |
//! | [`domain`] | Assets, lookup results, history entries |
//! | [`config`] | Base url, credential, timeouts |
//! | [`http_client`] | HTTP transport abstraction |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pricewatch_core::{
//!     ClientConfig, HistoryOrchestrator, HttpClient, LookupOrchestrator, ReqwestHttpClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(ClientConfig::from_env()?);
//!     let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
//!     let history = HistoryOrchestrator::new(Arc::clone(&client), Arc::clone(&config));
//!     let lookup = LookupOrchestrator::new(client, config, history);
//!
//!     let outcome = lookup.submit("bitcoin", "me@example.com").await;
//!     if let Some(result) = outcome.value() {
//!         println!("{}: ${:.2}", result.asset, result.price);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / View     │
//! └────────┬────────┘
//!          │ submit / refresh
//!          ▼
//! ┌─────────────────┐  delayed refresh  ┌──────────────────────┐
//! │ LookupOrchestr. │──────────────────▶│ HistoryOrchestrator  │
//! └────────┬────────┘                   └──────────┬───────────┘
//!          │ validate                              │
//!          ▼                                       ▼
//! ┌─────────────────┐     ┌──────────────────┐   ┌──────────────────┐
//! │ RequestExecutor │────▶│ HTTP Client      │   │ classify()       │
//! │ (per action)    │     │ (reqwest/script) │   │ ErrorCategory    │
//! └─────────────────┘     └──────────────────┘   └──────────────────┘
//! ```
//!
//! ## Security
//!
//! The API key is sent only as the `X-API-Key` header. It is redacted from
//! `Debug` output and never recorded in logs or outcomes.

pub mod classify;
pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod http_client;
pub mod orchestrator;
pub mod outcome;
pub mod validation;

pub use classify::classify;

pub use config::ClientConfig;

pub use domain::{
    Asset, EntryId, EntryKey, HistoryEntry, LookupDecodeError, LookupRequest, LookupResult,
    UtcDateTime,
};

pub use error::{ConfigError, ValidationError};

pub use executor::{
    Action, RawOutcome, RequestExecutor, RequestSpec, RequestTicket, TransportFailure,
};

pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient, ScriptedHttpClient, ScriptedReply,
};

pub use orchestrator::{
    HistoryOrchestrator, HistorySnapshot, LookupOrchestrator, LookupSnapshot,
    RequestLifecycleState,
};

pub use outcome::{ClassifiedError, ErrorCategory, OperationOutcome};

pub use validation::{validate_address, InvalidReason, ValidationOutcome};
