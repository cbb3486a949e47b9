use std::fmt::Write as _;

use valuescore_core::{Score, ScoreHistogram};

const HISTOGRAM_WIDTH: usize = 40;

/// Column-aligned text table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows shorter than the header are padded with empty cells.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row = cells.into_iter().map(Into::into).collect::<Vec<String>>();
        row.resize(self.headers.len().max(row.len()), String::new());
        self.rows.push(row);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn render(&self) -> String {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            for (index, cell) in row.iter().enumerate() {
                widths[index] = widths[index].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        write_row(&mut out, &self.headers, &widths);
        let rule = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&rule);
        out.push('\n');
        for row in &self.rows {
            write_row(&mut out, row, &widths);
        }
        out
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = widths
        .iter()
        .copied()
        .enumerate()
        .map(|(index, width)| {
            let cell = cells.get(index).map(String::as_str).unwrap_or("");
            format!("{cell:<width$}")
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Horizontal bar chart with one line per score, scaled to the peak bucket.
pub fn render_histogram(histogram: &ScoreHistogram) -> String {
    let peak = histogram.peak();
    let mut out = String::new();
    for (score, count) in histogram.iter() {
        let bar = if peak == 0 {
            0
        } else {
            (count * HISTOGRAM_WIDTH).div_ceil(peak)
        };
        let _ = writeln!(
            out,
            "{:>2} | {:<width$} {count}",
            score.value(),
            "#".repeat(bar),
            width = HISTOGRAM_WIDTH
        );
    }
    out
}

/// Cell text for an optional metric.
pub fn metric_cell(value: Option<f64>) -> String {
    match value {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{value:.0}"),
        Some(value) => format!("{value:.4}"),
        None => String::from("-"),
    }
}

pub fn score_cell(score: Score) -> String {
    format!("{:>2}/{}", score.value(), Score::MAX.value())
}
