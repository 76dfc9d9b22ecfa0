use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::commands::{CommandResult, Table};
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match (format, &result.table) {
        (OutputFormat::Table, Some(table)) => render_table(&mut out, table, &result.notes)?,
        _ => {
            let payload = if pretty {
                serde_json::to_string_pretty(&result.data)?
            } else {
                serde_json::to_string(&result.data)?
            };
            writeln!(out, "{payload}")?;
        }
    }

    Ok(())
}

fn render_table(out: &mut impl Write, table: &Table, notes: &[String]) -> Result<(), CliError> {
    let mut widths = table.headers.iter().map(|h| h.len()).collect::<Vec<_>>();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect::<Vec<_>>();
    writeln!(out, "{}", header.join("  ").trim_end())?;

    if table.rows.is_empty() {
        writeln!(out, "(no rows)")?;
    }
    for row in &table.rows {
        let cells = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>();
        writeln!(out, "{}", cells.join("  ").trim_end())?;
    }

    for note in notes {
        writeln!(out, "{note}")?;
    }

    Ok(())
}
