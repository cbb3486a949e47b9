pub mod table;

use std::io::{self, Write};

use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;
use crate::commands::CommandOutput;
use crate::error::CliError;
use crate::metadata::Envelope;

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&output.envelope)?
            } else {
                serde_json::to_string(&output.envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Ndjson => {
            for line in ndjson_lines(&output.envelope)? {
                writeln!(out, "{line}")?;
            }
        }
        OutputFormat::Table => write!(out, "{}", render_table(output)?)?,
    }

    out.flush()?;
    Ok(())
}

/// Metadata first, then one line per row (the `data` array, or the `rows`
/// member of an object), then the remaining fields as one object.
fn ndjson_lines(envelope: &Envelope) -> Result<Vec<String>, CliError> {
    let mut lines = vec![serde_json::to_string(&json!({ "meta": &envelope.meta }))?];
    match &envelope.data {
        Value::Array(rows) => push_rows(&mut lines, rows)?,
        Value::Object(fields) => match fields.get("rows") {
            Some(Value::Array(rows)) => {
                push_rows(&mut lines, rows)?;
                let rest = fields
                    .iter()
                    .filter(|(key, _)| key.as_str() != "rows")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect::<Map<String, Value>>();
                if !rest.is_empty() {
                    lines.push(serde_json::to_string(&rest)?);
                }
            }
            _ => lines.push(serde_json::to_string(fields)?),
        },
        data => lines.push(serde_json::to_string(data)?),
    }
    Ok(lines)
}

fn push_rows(lines: &mut Vec<String>, rows: &[Value]) -> Result<(), CliError> {
    for row in rows {
        lines.push(serde_json::to_string(row)?);
    }
    Ok(())
}

fn render_table(output: &CommandOutput) -> Result<String, CliError> {
    let meta = &output.envelope.meta;
    let mut text = String::new();
    text.push_str(&format!("request_id  : {}\n", meta.request_id));
    text.push_str(&format!("generated_at: {}\n", meta.generated_at));
    if let Some(provider) = meta.provider {
        text.push_str(&format!("provider    : {provider}\n"));
    }
    text.push_str(&format!("latency_ms  : {}\n", meta.latency_ms));

    if !meta.warnings.is_empty() {
        text.push_str("warnings:\n");
        for warning in &meta.warnings {
            text.push_str(&format!("  - {warning}\n"));
        }
    }

    text.push('\n');
    match &output.table {
        Some(table) => text.push_str(&table.render()),
        None => {
            text.push_str(&serde_json::to_string_pretty(&output.envelope.data)?);
            text.push('\n');
        }
    }

    if let Some(histogram) = &output.histogram {
        text.push_str("\nscore distribution:\n");
        text.push_str(&table::render_histogram(histogram));
    }

    Ok(text)
}
