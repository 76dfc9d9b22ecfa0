mod assets;
mod history;
mod price;

use std::sync::Arc;

use pricewatch_core::config::{
    parse_timeout_ms, DEFAULT_API_BASE, ENV_API_BASE, ENV_API_KEY, ENV_TIMEOUT_MS,
};
use pricewatch_core::orchestrator::{HISTORY_PATH, PRICE_PATH};
use pricewatch_core::{
    ClientConfig, HistoryOrchestrator, HttpClient, LookupOrchestrator, ReqwestHttpClient,
    ScriptedHttpClient, ScriptedReply,
};
use serde_json::{json, Value};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Rows for `--format table`.
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

pub struct CommandResult {
    pub data: Value,
    pub table: Option<Table>,
    pub notes: Vec<String>,
    pub failed: bool,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            table: None,
            notes: Vec::new(),
            failed: false,
        }
    }

    pub fn with_table(mut self, headers: Vec<&'static str>, rows: Vec<Vec<String>>) -> Self {
        self.table = Some(Table { headers, rows });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn failed(mut self) -> Self {
        self.failed = true;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    if let Command::Assets = cli.command {
        return assets::run();
    }

    let config = Arc::new(resolve_config(cli)?);
    tracing::debug!(config = ?config, mock = cli.mock, "resolved client configuration");

    let client: Arc<dyn HttpClient> = if cli.mock {
        Arc::new(mock_client())
    } else {
        Arc::new(ReqwestHttpClient::new())
    };
    let history = HistoryOrchestrator::new(Arc::clone(&client), Arc::clone(&config));
    let lookup = LookupOrchestrator::new(client, config, history);

    match &cli.command {
        Command::Price(args) => price::run(args, &lookup).await,
        Command::History => history::run(lookup.history()).await,
        Command::Assets => assets::run(),
    }
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    resolve_config_with(cli, |name| std::env::var(name).ok())
}

/// Each setting comes from its flag when given, otherwise from `env`. An
/// environment value that a flag overrides is never read.
fn resolve_config_with(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, CliError> {
    let base_url = cli
        .api_base
        .clone()
        .or_else(|| env(ENV_API_BASE))
        .unwrap_or_else(|| String::from(DEFAULT_API_BASE));
    let mut config = ClientConfig::new(base_url)?;

    if let Some(key) = cli.api_key.clone().or_else(|| env(ENV_API_KEY)) {
        config = config.with_api_key(key);
    }
    if let Some(raw) = cli.timeout_ms.clone().or_else(|| env(ENV_TIMEOUT_MS)) {
        config = config.with_request_timeout(parse_timeout_ms(&raw)?);
    }

    Ok(config)
}

fn mock_client() -> ScriptedHttpClient {
    ScriptedHttpClient::new()
        .route(
            PRICE_PATH,
            ScriptedReply::json(
                200,
                json!({
                    "success": true,
                    "data": { "price": 64250.12, "change24h": 1.84 },
                    "message": "Price sent to your email"
                }),
            ),
        )
        .route(
            HISTORY_PATH,
            ScriptedReply::json(
                200,
                json!({
                    "success": true,
                    "data": [
                        {
                            "id": "mock-2",
                            "cryptocurrency": "ethereum",
                            "price": 3120.5,
                            "change24h": -0.42,
                            "email": "demo@example.com",
                            "timestamp": "2026-01-15T09:30:00Z"
                        },
                        {
                            "id": "mock-1",
                            "cryptocurrency": "bitcoin",
                            "price": 64250.12,
                            "change24h": 1.84,
                            "email": "demo@example.com",
                            "timestamp": "2026-01-15T09:29:00Z"
                        }
                    ]
                }),
            ),
        )
}
