//! Ordering and summary statistics over scored records.
//!
//! Rendering lives in the CLI; this module only provides the ordered rows,
//! the `(symbol, score)` pairs and the frequency table over `0..=15`.

use std::cmp::Reverse;

use serde::Serialize;

use crate::{MetricsRecord, Score, Symbol};

/// A metrics record paired with its score. The record itself is untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    record: MetricsRecord,
    score: Score,
}

impl ScoredRecord {
    pub(crate) fn new(record: MetricsRecord, score: Score) -> Self {
        Self { record, score }
    }

    pub fn record(&self) -> &MetricsRecord {
        &self.record
    }

    pub fn symbol(&self) -> &Symbol {
        self.record.symbol()
    }

    pub const fn score(&self) -> Score {
        self.score
    }

    pub fn into_record(self) -> MetricsRecord {
        self.record
    }
}

/// Ordered collection of scored records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoredBatch {
    entries: Vec<ScoredRecord>,
}

impl ScoredBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScoredRecord] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredRecord> {
        self.entries.iter()
    }

    /// Highest score first. Stable: tied records keep their current order.
    pub fn sort_by_score_desc(&mut self) {
        self.entries.sort_by_key(|entry| Reverse(entry.score));
    }

    /// Lowest score first. Stable: tied records keep their current order.
    pub fn sort_by_score_asc(&mut self) {
        self.entries.sort_by_key(|entry| entry.score);
    }

    /// The `n` best-scoring records without reordering `self`.
    pub fn top(&self, n: usize) -> Self {
        let mut ranked = self.clone();
        ranked.sort_by_score_desc();
        ranked.entries.truncate(n);
        ranked
    }

    pub fn pairs(&self) -> Vec<(Symbol, Score)> {
        self.entries
            .iter()
            .map(|entry| (entry.symbol().clone(), entry.score))
            .collect()
    }

    pub fn histogram(&self) -> ScoreHistogram {
        let mut histogram = ScoreHistogram::default();
        for entry in &self.entries {
            histogram.counts[usize::from(entry.score.value())] += 1;
        }
        histogram
    }

    pub fn summary(&self) -> BatchSummary {
        let mut scores = self
            .entries
            .iter()
            .map(|entry| entry.score)
            .collect::<Vec<_>>();
        scores.sort_unstable();

        let count = scores.len();
        if count == 0 {
            return BatchSummary {
                count,
                mean: None,
                median: None,
                min: None,
                max: None,
            };
        }

        let total = scores
            .iter()
            .map(|score| f64::from(score.value()))
            .sum::<f64>();
        let middle = count / 2;
        let median = if count % 2 == 0 {
            (f64::from(scores[middle - 1].value()) + f64::from(scores[middle].value())) / 2.0
        } else {
            f64::from(scores[middle].value())
        };

        BatchSummary {
            count,
            mean: Some(total / count as f64),
            median: Some(median),
            min: scores.first().copied(),
            max: scores.last().copied(),
        }
    }
}

impl From<Vec<ScoredRecord>> for ScoredBatch {
    fn from(entries: Vec<ScoredRecord>) -> Self {
        Self { entries }
    }
}

impl FromIterator<ScoredRecord> for ScoredBatch {
    fn from_iter<T: IntoIterator<Item = ScoredRecord>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ScoredBatch {
    type Item = ScoredRecord;
    type IntoIter = std::vec::IntoIter<ScoredRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScoredBatch {
    type Item = &'a ScoredRecord;
    type IntoIter = std::slice::Iter<'a, ScoredRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Number of records per score, one bucket for each of `0..=15`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreHistogram {
    counts: [usize; 16],
}

impl ScoreHistogram {
    pub fn count(&self, score: Score) -> usize {
        self.counts[usize::from(score.value())]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Largest bucket, used to scale bar charts.
    pub fn peak(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Score, usize)> + '_ {
        Score::range().map(|score| (score, self.count(score)))
    }
}

/// Descriptive statistics of a batch's scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<Score>,
    pub max: Option<Score>,
}
