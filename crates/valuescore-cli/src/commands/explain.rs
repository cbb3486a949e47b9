use serde::Serialize;
use valuescore_core::{evaluate, MetricsRecord, RuleBreakdown, Symbol, UtcDateTime};

use crate::cli::{Cli, ExplainArgs};
use crate::error::CliError;
use crate::output::table::{score_cell, TableView};

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ExplainResponseData {
    breakdown: RuleBreakdown,
    metrics: MetricsRecord,
}

pub async fn run(args: &ExplainArgs, cli: &Cli) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let provider = super::provider_for(cli, args.input.as_deref())?;

    let started_at = UtcDateTime::now();
    let record = provider.metrics(symbol).await?;
    let latency_ms = UtcDateTime::now().millis_since(started_at);

    let breakdown = evaluate(&record);
    let mut table = TableView::new(["rule", "name", "passed", "description"]);
    for outcome in &breakdown.outcomes {
        table.push_row([
            outcome.number.to_string(),
            outcome.name.to_owned(),
            String::from(if outcome.passed { "yes" } else { "no" }),
            outcome.description.to_owned(),
        ]);
    }
    table.push_row([
        String::new(),
        String::from("total"),
        score_cell(breakdown.score),
    ]);

    let data = serde_json::to_value(ExplainResponseData {
        breakdown,
        metrics: record,
    })?;

    let mut result = CommandResult::ok(data, Some(provider.id())).with_table(table);
    result.latency_ms = latency_ms;
    Ok(result)
}
