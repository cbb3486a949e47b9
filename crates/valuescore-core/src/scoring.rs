//! # Scoring Engine
//!
//! Fifteen independent value rules evaluated over a [`MetricsRecord`].
//!
//! Each rule contributes 0 or 1. A rule whose operands are absent
//! contributes 0, so partial records degrade to lower scores instead of
//! failing. Comparisons are strict and use plain `f64` semantics: a value
//! equal to its threshold does not satisfy the rule, and NaN satisfies
//! nothing.
//!
//! ```rust
//! use valuescore_core::{score, MetricField, MetricsRecord, Symbol};
//!
//! let record = MetricsRecord::new(Symbol::parse("XOM").unwrap())
//!     .with(MetricField::TrailingPe, 12.0)
//!     .with(MetricField::MarketCap, 4.5e11);
//!
//! // low P/E, earnings yield above 8%, market cap reported
//! assert_eq!(score(&record).value(), 3);
//! ```

use rayon::prelude::*;
use serde::Serialize;

use crate::report::{ScoredBatch, ScoredRecord};
use crate::{MetricField, MetricsRecord, Score, Symbol};

const MAX_TRAILING_PE: f64 = 15.0;
const MIN_EARNINGS_YIELD: f64 = 0.08;
const MIN_FCF_YIELD: f64 = 0.08;
const MAX_EV_TO_EBITDA: f64 = 10.0;
const MAX_EV_TO_REVENUE: f64 = 2.0;
const MIN_RETURN_ON_EQUITY: f64 = 0.15;

/// Metrics that must all be reported for the completeness rule.
pub const ESSENTIAL_FIELDS: [MetricField; 4] = [
    MetricField::TrailingPe,
    MetricField::PriceToBook,
    MetricField::FreeCashflow,
    MetricField::MarketCap,
];

/// One entry of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub number: u8,
    pub name: &'static str,
    pub description: &'static str,
    predicate: fn(&MetricsRecord) -> bool,
}

impl Rule {
    pub fn applies(&self, record: &MetricsRecord) -> bool {
        (self.predicate)(record)
    }
}

/// Rule table in evaluation order. Every rule has weight 1.
pub static RULES: [Rule; 15] = [
    Rule {
        number: 1,
        name: "low_pe",
        description: "trailing P/E below 15",
        predicate: low_pe,
    },
    Rule {
        number: 2,
        name: "low_pb",
        description: "price to book below 1",
        predicate: low_pb,
    },
    Rule {
        number: 3,
        name: "low_ps",
        description: "trailing twelve month price to sales below 1",
        predicate: low_ps,
    },
    Rule {
        number: 4,
        name: "earnings_yield",
        description: "positive P/E with earnings yield (1/PE) above 8%",
        predicate: high_earnings_yield,
    },
    Rule {
        number: 5,
        name: "low_ev_ebitda",
        description: "EV/EBITDA below 10",
        predicate: low_ev_to_ebitda,
    },
    Rule {
        number: 6,
        name: "fcf_yield",
        description: "free cash flow over positive market cap above 8%",
        predicate: high_fcf_yield,
    },
    Rule {
        number: 7,
        name: "low_debt_to_equity",
        description: "debt to equity below 1",
        predicate: low_debt_to_equity,
    },
    Rule {
        number: 8,
        name: "high_roe",
        description: "return on equity above 15%",
        predicate: high_return_on_equity,
    },
    Rule {
        number: 9,
        name: "positive_operating_margin",
        description: "operating margin above 0",
        predicate: positive_operating_margin,
    },
    Rule {
        number: 10,
        name: "earnings_growth",
        description: "quarterly earnings growth above 0",
        predicate: positive_earnings_growth,
    },
    Rule {
        number: 11,
        name: "low_peg",
        description: "PEG ratio below 1",
        predicate: low_peg,
    },
    Rule {
        number: 12,
        name: "net_cash",
        description: "total cash exceeds total debt",
        predicate: net_cash,
    },
    Rule {
        number: 13,
        name: "low_ev_revenue",
        description: "EV/revenue below 2",
        predicate: low_ev_to_revenue,
    },
    Rule {
        number: 14,
        name: "market_cap_reported",
        description: "market cap is reported",
        predicate: market_cap_reported,
    },
    Rule {
        number: 15,
        name: "essentials_reported",
        description: "trailing P/E, price to book, free cash flow and market cap all reported",
        predicate: essentials_reported,
    },
];

/// Score a record against the full rule table.
pub fn score(record: &MetricsRecord) -> Score {
    let satisfied = RULES.iter().filter(|rule| rule.applies(record)).count();
    // RULES has 15 entries, so the count always fits the score range.
    Score::from_count(satisfied as u8)
}

/// Pass/fail of a single rule for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub number: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub passed: bool,
}

/// Rule-by-rule evaluation of one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleBreakdown {
    pub symbol: Symbol,
    pub score: Score,
    pub outcomes: Vec<RuleOutcome>,
}

impl RuleBreakdown {
    pub fn passed(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.passed)
    }
}

/// Evaluate every rule and keep the individual outcomes.
pub fn evaluate(record: &MetricsRecord) -> RuleBreakdown {
    let outcomes = RULES
        .iter()
        .map(|rule| RuleOutcome {
            number: rule.number,
            name: rule.name,
            description: rule.description,
            passed: rule.applies(record),
        })
        .collect::<Vec<_>>();
    let satisfied = outcomes.iter().filter(|outcome| outcome.passed).count();

    RuleBreakdown {
        symbol: record.symbol().clone(),
        score: Score::from_count(satisfied as u8),
        outcomes,
    }
}

/// Score each record independently, keeping input order.
pub fn annotate<I>(records: I) -> ScoredBatch
where
    I: IntoIterator<Item = MetricsRecord>,
{
    records
        .into_iter()
        .map(|record| {
            let score = score(&record);
            ScoredRecord::new(record, score)
        })
        .collect()
}

/// Same result as [`annotate`], scored on the rayon pool.
pub fn annotate_parallel(records: Vec<MetricsRecord>) -> ScoredBatch {
    records
        .into_par_iter()
        .map(|record| {
            let score = score(&record);
            ScoredRecord::new(record, score)
        })
        .collect::<Vec<_>>()
        .into()
}

fn below(record: &MetricsRecord, field: MetricField, threshold: f64) -> bool {
    matches!(record.get(field), Some(value) if value < threshold)
}

fn above(record: &MetricsRecord, field: MetricField, threshold: f64) -> bool {
    matches!(record.get(field), Some(value) if value > threshold)
}

fn low_pe(record: &MetricsRecord) -> bool {
    below(record, MetricField::TrailingPe, MAX_TRAILING_PE)
}

fn low_pb(record: &MetricsRecord) -> bool {
    below(record, MetricField::PriceToBook, 1.0)
}

fn low_ps(record: &MetricsRecord) -> bool {
    below(record, MetricField::PriceToSalesTrailing12Months, 1.0)
}

fn high_earnings_yield(record: &MetricsRecord) -> bool {
    match record.get(MetricField::TrailingPe) {
        Some(pe) if pe > 0.0 => 1.0 / pe > MIN_EARNINGS_YIELD,
        _ => false,
    }
}

fn low_ev_to_ebitda(record: &MetricsRecord) -> bool {
    below(record, MetricField::EnterpriseToEbitda, MAX_EV_TO_EBITDA)
}

fn high_fcf_yield(record: &MetricsRecord) -> bool {
    match (
        record.get(MetricField::FreeCashflow),
        record.get(MetricField::MarketCap),
    ) {
        (Some(fcf), Some(market_cap)) if market_cap > 0.0 => fcf / market_cap > MIN_FCF_YIELD,
        _ => false,
    }
}

fn low_debt_to_equity(record: &MetricsRecord) -> bool {
    below(record, MetricField::DebtToEquity, 1.0)
}

fn high_return_on_equity(record: &MetricsRecord) -> bool {
    above(record, MetricField::ReturnOnEquity, MIN_RETURN_ON_EQUITY)
}

fn positive_operating_margin(record: &MetricsRecord) -> bool {
    above(record, MetricField::OperatingMargins, 0.0)
}

fn positive_earnings_growth(record: &MetricsRecord) -> bool {
    above(record, MetricField::EarningsQuarterlyGrowth, 0.0)
}

fn low_peg(record: &MetricsRecord) -> bool {
    below(record, MetricField::PegRatio, 1.0)
}

fn net_cash(record: &MetricsRecord) -> bool {
    match (
        record.get(MetricField::TotalCash),
        record.get(MetricField::TotalDebt),
    ) {
        (Some(cash), Some(debt)) => cash > debt,
        _ => false,
    }
}

fn low_ev_to_revenue(record: &MetricsRecord) -> bool {
    below(record, MetricField::EnterpriseToRevenue, MAX_EV_TO_REVENUE)
}

// Rule 14 overlaps with rule 15 on market cap; both are kept as weighted.
fn market_cap_reported(record: &MetricsRecord) -> bool {
    record.is_present(MetricField::MarketCap)
}

fn essentials_reported(record: &MetricsRecord) -> bool {
    ESSENTIAL_FIELDS
        .into_iter()
        .all(|field| record.is_present(field))
}
