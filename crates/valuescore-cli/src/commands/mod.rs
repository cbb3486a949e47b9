mod explain;
mod fetch;
mod rules;
mod score;
mod tickers;

use std::path::Path;

use serde_json::Value;
use tracing::debug;
use valuescore_core::{
    LoadReport, MetricsProvider, ProviderConfig, ProviderId, ScoreHistogram,
    StaticMetricsProvider, Symbol, YahooMetricsProvider,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::{Envelope, Metadata};
use crate::output::table::TableView;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
    pub provider: Option<ProviderId>,
    pub table: Option<TableView>,
    pub histogram: Option<ScoreHistogram>,
}

impl CommandResult {
    pub fn ok(data: Value, provider: Option<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            latency_ms: 0,
            provider,
            table: None,
            histogram: None,
        }
    }

    /// Latency and one warning per skipped ticker, taken from a batch load.
    pub fn with_load_report(mut self, report: &LoadReport) -> Self {
        self.latency_ms = report.latency_ms;
        self.warnings
            .extend(report.failures.iter().map(|failure| failure.to_string()));
        self
    }

    pub fn with_table(mut self, table: TableView) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_histogram(mut self, histogram: ScoreHistogram) -> Self {
        self.histogram = Some(histogram);
        self
    }
}

/// Envelope plus the table-format views of the same data.
pub struct CommandOutput {
    pub envelope: Envelope,
    pub table: Option<TableView>,
    pub histogram: Option<ScoreHistogram>,
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let command_result = match &cli.command {
        Command::Score(args) => score::run(args, cli).await?,
        Command::Explain(args) => explain::run(args, cli).await?,
        Command::Tickers(args) => tickers::run(args, cli).await?,
        Command::Rules => rules::run()?,
        Command::Fetch(args) => fetch::run(args, cli).await?,
    };

    let CommandResult {
        data,
        warnings,
        latency_ms,
        provider,
        table,
        histogram,
    } = command_result;

    let mut metadata = Metadata::new(provider, latency_ms);
    for warning in warnings {
        metadata.push_warning(warning);
    }

    Ok(CommandOutput {
        envelope: Envelope {
            meta: metadata,
            data,
        },
        table,
        histogram,
    })
}

/// Output is rendered before this runs, so a strict failure still prints
/// the partial result.
pub fn check_strict(output: &CommandOutput, strict: bool) -> Result<(), CliError> {
    let warnings = &output.envelope.meta.warnings;
    if strict && !warnings.is_empty() {
        return Err(CliError::StrictModeViolation {
            warning_count: warnings.len(),
        });
    }
    Ok(())
}

/// Static provider for `--input`, otherwise Yahoo configured from the
/// environment and `--timeout-ms`.
fn provider_for(cli: &Cli, input: Option<&Path>) -> Result<Box<dyn MetricsProvider>, CliError> {
    if let Some(path) = input {
        let document = std::fs::read_to_string(path)?;
        let provider = StaticMetricsProvider::from_json_str(&document).map_err(|source| {
            CliError::Input {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %path.display(), tickers = provider.len(), "loaded metrics document");
        return Ok(Box::new(provider));
    }

    if cli.offline {
        return Err(CliError::Command(String::from(
            "--offline requires --input <FILE>",
        )));
    }

    let mut config = ProviderConfig::from_env()?;
    if let Some(timeout_ms) = cli.timeout_ms {
        if timeout_ms == 0 {
            return Err(CliError::Command(String::from(
                "--timeout-ms must be greater than zero",
            )));
        }
        config = config.with_timeout_ms(timeout_ms);
    }
    Ok(Box::new(YahooMetricsProvider::from_config(config)?))
}

/// `None` when no symbols were given, so the provider's universe is used.
fn parse_symbols(raw: &[String]) -> Result<Option<Vec<Symbol>>, CliError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let symbols = raw
        .iter()
        .map(|raw| Symbol::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(symbols))
}
