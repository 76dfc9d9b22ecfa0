//! CLI argument definitions for Pricewatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `price` | Look up an asset price and have it emailed |
//! | `history` | Show past lookups |
//! | `assets` | List supported assets |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--api-base` | `$PRICEWATCH_API_BASE` or `http://localhost:3000` | Service base url |
//! | `--api-key` | `$PRICEWATCH_API_KEY` | Static credential |
//! | `--timeout-ms` | `$PRICEWATCH_TIMEOUT_MS` or `30000` | Per-request budget |
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Serve canned responses instead of calling the service |
//!
//! # Examples
//!
//! ```bash
//! pricewatch price bitcoin me@example.com --pretty
//! pricewatch history --format table
//! pricewatch --mock price solana me@example.com
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Crypto price lookups delivered by email.
#[derive(Debug, Parser)]
#[command(
    name = "pricewatch",
    author,
    version,
    about = "Crypto price lookups delivered by email"
)]
pub struct Cli {
    /// Base url of the price service. Overrides `PRICEWATCH_API_BASE`.
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Static API key. Overrides `PRICEWATCH_API_KEY`.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in milliseconds. Overrides `PRICEWATCH_TIMEOUT_MS`.
    #[arg(long, global = true)]
    pub timeout_ms: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Answer from canned responses; no network access.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up the current price of an asset and email it.
    Price(PriceArgs),
    /// Refresh and show past lookups.
    History,
    /// List the assets the service supports.
    Assets,
}

#[derive(Debug, Args)]
pub struct PriceArgs {
    /// Asset identifier, e.g. `bitcoin`.
    pub asset: String,

    /// Address the price is emailed to.
    pub email: String,

    /// Do not wait for the follow-up history refresh.
    #[arg(long, default_value_t = false)]
    pub skip_history: bool,
}
