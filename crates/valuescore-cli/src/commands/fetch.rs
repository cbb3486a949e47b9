use valuescore_core::{load_batch, MetricField};

use crate::cli::{Cli, FetchArgs};
use crate::error::CliError;
use crate::output::table::{metric_cell, TableView};

use super::CommandResult;

pub async fn run(args: &FetchArgs, cli: &Cli) -> Result<CommandResult, CliError> {
    let symbols = super::parse_symbols(&args.symbols)?;
    let provider = super::provider_for(cli, args.input.as_deref())?;
    let report = load_batch(provider.as_ref(), symbols).await?;

    let mut table = TableView::new(
        std::iter::once("symbol").chain(MetricField::ALL.iter().map(|field| field.as_str())),
    );
    for record in &report.records {
        table.push_row(
            std::iter::once(record.symbol().to_string())
                .chain(MetricField::ALL.iter().map(|field| metric_cell(record.get(*field)))),
        );
    }

    let data = serde_json::to_value(&report.records)?;
    Ok(CommandResult::ok(data, Some(report.provider))
        .with_load_report(&report)
        .with_table(table))
}
