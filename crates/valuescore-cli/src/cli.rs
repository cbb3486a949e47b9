//! CLI argument definitions for valuescore.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `score` | Load metrics, score and rank tickers |
//! | `explain` | Rule-by-rule breakdown for one ticker |
//! | `tickers` | Print the default ticker universe |
//! | `rules` | Print the rule table |
//! | `fetch` | Print raw metrics records without scoring |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--timeout-ms` | env or `10000` | Request timeout in ms |
//! | `--offline` | `false` | Never touch the network; requires `--input` |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! # Score the S&P 500 and keep the best 20
//! valuescore score --top 20 --format table
//!
//! # Score a saved metrics document without network access
//! valuescore score --input metrics.json --offline --pretty
//!
//! # Why did KO get its score?
//! valuescore explain KO
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Value investing scores from fundamental metrics.
///
/// Fifteen threshold rules over P/E, P/B, P/S, EV multiples, free cash flow,
/// leverage, profitability and growth. Each satisfied rule adds one point.
#[derive(Debug, Parser)]
#[command(
    name = "valuescore",
    author,
    version,
    about = "Value investing scores from fundamental metrics",
    long_about = "valuescore fetches fundamentals for a set of tickers (the S&P 500 by \
default) and scores each one against fifteen value rules.\n\
\n\
Tickers that cannot be fetched are skipped and reported as warnings.\n\
\n\
Use 'valuescore <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    ///
    /// - json: Single JSON object (default)
    /// - ndjson: Metadata line, one JSON line per result row, then any
    ///   remaining fields (histogram, summary) as a final line
    /// - table: ASCII table format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings (skipped tickers) as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Request timeout in milliseconds; overrides VALUESCORE_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Never touch the network. Requires --input.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON.
    Ndjson,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score and rank tickers.
    ///
    /// Tickers come from the arguments, else from --input, else from the
    /// S&P 500 constituents list.
    ///
    /// # Examples
    ///
    ///   valuescore score
    ///   valuescore score KO PEP XOM --format table
    ///   valuescore score --input metrics.json --top 10
    Score(ScoreArgs),

    /// Show which rules one ticker passes.
    ///
    /// # Examples
    ///
    ///   valuescore explain KO
    ///   valuescore explain BRK-B --input metrics.json
    Explain(ExplainArgs),

    /// Print the default ticker universe.
    Tickers(TickersArgs),

    /// Print the scoring rule table.
    Rules,

    /// Fetch raw metrics records without scoring.
    ///
    /// # Examples
    ///
    ///   valuescore fetch KO PEP --pretty
    Fetch(FetchArgs),
}

/// Arguments for the `score` command.
#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Tickers to score (e.g., KO, BRK-B). Defaults to the universe.
    pub symbols: Vec<String>,

    /// Metrics document to score instead of fetching from Yahoo.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Keep only the N highest-scoring tickers in the rows.
    #[arg(long)]
    pub top: Option<usize>,

    /// Score on all cores.
    #[arg(long, default_value_t = false)]
    pub parallel: bool,
}

/// Arguments for the `explain` command.
#[derive(Debug, Args)]
pub struct ExplainArgs {
    /// Ticker to explain.
    pub symbol: String,

    /// Metrics document to read the ticker from.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

/// Arguments for the `tickers` command.
#[derive(Debug, Args)]
pub struct TickersArgs {
    /// List the tickers of a metrics document instead.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

/// Arguments for the `fetch` command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Tickers to fetch. Defaults to the universe.
    pub symbols: Vec<String>,

    /// Metrics document to read instead of fetching from Yahoo.
    #[arg(long)]
    pub input: Option<PathBuf>,
}
