use serde::Serialize;
use valuescore_core::RULES;

use crate::error::CliError;
use crate::output::table::TableView;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct RuleRow {
    number: u8,
    name: &'static str,
    description: &'static str,
}

pub fn run() -> Result<CommandResult, CliError> {
    let rows = RULES
        .iter()
        .map(|rule| RuleRow {
            number: rule.number,
            name: rule.name,
            description: rule.description,
        })
        .collect::<Vec<_>>();

    let mut table = TableView::new(["rule", "name", "description"]);
    for row in &rows {
        table.push_row([row.number.to_string(), row.name.to_owned(), row.description.to_owned()]);
    }

    let data = serde_json::to_value(rows)?;
    Ok(CommandResult::ok(data, None).with_table(table))
}
