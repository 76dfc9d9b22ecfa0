use pricewatch_core::{HistoryEntry, HistoryOrchestrator, HistorySnapshot};

use crate::commands::CommandResult;
use crate::error::CliError;

const HEADERS: [&str; 6] = ["id", "asset", "price", "change_24h", "email", "timestamp"];

pub async fn run(history: &HistoryOrchestrator) -> Result<CommandResult, CliError> {
    let outcome = history.refresh().await;
    let snapshot = history.snapshot();

    let rows = snapshot
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| row(index, entry))
        .collect();
    let mut command = CommandResult::ok(serde_json::to_value(&snapshot)?)
        .with_table(HEADERS.to_vec(), rows);
    command = append_notes(command, &snapshot);
    if !outcome.is_success() {
        command = command.failed();
    }
    Ok(command)
}

/// Adds the history error, if any, as a note.
pub fn append_notes(command: CommandResult, snapshot: &HistorySnapshot) -> CommandResult {
    match &snapshot.error {
        Some(error) => command.with_note(format!(
            "history {}: {}",
            error.category().code(),
            error.message()
        )),
        None => command,
    }
}

fn row(index: usize, entry: &HistoryEntry) -> Vec<String> {
    let id = entry
        .id
        .as_ref()
        .map(|id| id.as_str().to_owned())
        .unwrap_or_else(|| format!("#{index}"));
    vec![
        id,
        entry.asset.clone().unwrap_or_else(|| String::from("-")),
        entry
            .price
            .map(|price| format!("{price:.2}"))
            .unwrap_or_else(|| String::from("-")),
        entry
            .change_24h
            .map(|change| format!("{change:+.2}%"))
            .unwrap_or_else(|| String::from("-")),
        entry
            .notify_address
            .clone()
            .unwrap_or_else(|| String::from("-")),
        entry
            .timestamp
            .map(|timestamp| timestamp.format_rfc3339())
            .unwrap_or_else(|| String::from("-")),
    ]
}
