use valuescore_core::UtcDateTime;

use crate::cli::{Cli, TickersArgs};
use crate::error::CliError;
use crate::output::table::TableView;

use super::CommandResult;

pub async fn run(args: &TickersArgs, cli: &Cli) -> Result<CommandResult, CliError> {
    let provider = super::provider_for(cli, args.input.as_deref())?;

    let started_at = UtcDateTime::now();
    let universe = provider.universe().await?;
    let latency_ms = UtcDateTime::now().millis_since(started_at);

    let mut table = TableView::new(["#", "symbol"]);
    for (index, symbol) in universe.iter().enumerate() {
        table.push_row([(index + 1).to_string(), symbol.to_string()]);
    }

    let data = serde_json::to_value(&universe)?;
    let mut result = CommandResult::ok(data, Some(provider.id())).with_table(table);
    result.latency_ms = latency_ms;
    Ok(result)
}
