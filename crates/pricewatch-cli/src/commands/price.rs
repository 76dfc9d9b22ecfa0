use pricewatch_core::{ErrorCategory, HistorySnapshot, LookupOrchestrator, LookupSnapshot};
use serde::Serialize;

use crate::cli::PriceArgs;
use crate::commands::{history, CommandResult};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct PriceResponse {
    lookup: LookupSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<HistorySnapshot>,
}

pub async fn run(args: &PriceArgs, lookup: &LookupOrchestrator) -> Result<CommandResult, CliError> {
    let outcome = lookup.submit(&args.asset, &args.email).await;

    if let Some(error) = outcome.error() {
        if error.category() == ErrorCategory::InputInvalid {
            return Err(CliError::InvalidInput(error.message().to_owned()));
        }
    }

    let follow_history = outcome.is_success() && !args.skip_history;
    if follow_history {
        lookup.wait_for_scheduled_refresh().await;
    }

    let snapshot = lookup.snapshot();
    let rows = snapshot
        .result
        .iter()
        .map(|result| {
            vec![
                result.asset.clone(),
                format!("{:.2}", result.price),
                format!("{:+.2}%", result.change_24h),
                result.retrieved_at.format_rfc3339(),
            ]
        })
        .collect();

    let mut command = CommandResult::ok(serde_json::Value::Null)
        .with_table(vec!["asset", "price", "change_24h", "retrieved_at"], rows);
    if let Some(warning) = &snapshot.warning {
        command = command.with_note(format!("warning: {warning}"));
    }
    if let Some(error) = &snapshot.error {
        command = command.with_note(format!("{}: {}", error.category().code(), error.message()));
    }
    if !outcome.is_success() {
        command = command.failed();
    }

    let refreshed = follow_history.then(|| lookup.history().snapshot());
    if let Some(refreshed) = &refreshed {
        command = history::append_notes(command, refreshed);
    }

    command.data = serde_json::to_value(PriceResponse {
        lookup: snapshot,
        history: refreshed,
    })?;
    Ok(command)
}
