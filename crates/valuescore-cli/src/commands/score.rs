use serde::Serialize;
use valuescore_core::{
    annotate, annotate_parallel, load_batch, BatchSummary, MetricField, Score, ScoredBatch,
};

use crate::cli::{Cli, ScoreArgs};
use crate::error::CliError;
use crate::output::table::{metric_cell, score_cell, TableView};

use super::CommandResult;

#[derive(Debug, Serialize)]
struct HistogramBucket {
    score: Score,
    count: usize,
}

#[derive(Debug, Serialize)]
struct ScoreResponseData {
    rows: ScoredBatch,
    histogram: Vec<HistogramBucket>,
    summary: BatchSummary,
}

pub async fn run(args: &ScoreArgs, cli: &Cli) -> Result<CommandResult, CliError> {
    let symbols = super::parse_symbols(&args.symbols)?;
    let provider = super::provider_for(cli, args.input.as_deref())?;
    let mut report = load_batch(provider.as_ref(), symbols).await?;

    let records = std::mem::take(&mut report.records);
    let mut batch = if args.parallel {
        annotate_parallel(records)
    } else {
        annotate(records)
    };

    // Distribution and summary cover the whole batch, even with --top.
    let histogram = batch.histogram();
    let summary = batch.summary();
    batch.sort_by_score_desc();
    let rows = match args.top {
        Some(n) => batch.top(n),
        None => batch,
    };

    let table = ranking_table(&rows);
    let data = serde_json::to_value(ScoreResponseData {
        rows,
        histogram: histogram
            .iter()
            .map(|(score, count)| HistogramBucket { score, count })
            .collect(),
        summary,
    })?;

    Ok(CommandResult::ok(data, Some(report.provider))
        .with_load_report(&report)
        .with_table(table)
        .with_histogram(histogram))
}

fn ranking_table(rows: &ScoredBatch) -> TableView {
    let mut table = TableView::new(["rank", "symbol", "score", "pe", "pb", "ev/ebitda", "coverage"]);
    for (index, entry) in rows.iter().enumerate() {
        let record = entry.record();
        table.push_row([
            (index + 1).to_string(),
            entry.symbol().to_string(),
            score_cell(entry.score()),
            metric_cell(record.get(MetricField::TrailingPe)),
            metric_cell(record.get(MetricField::PriceToBook)),
            metric_cell(record.get(MetricField::EnterpriseToEbitda)),
            format!("{}/14", record.present_fields()),
        ]);
    }
    table
}
