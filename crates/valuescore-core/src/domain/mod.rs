//! # Domain Models
//!
//! Canonical domain types for valuescore.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker |
//! | [`MetricField`] | One of the fourteen reported fundamentals |
//! | [`MetricsRecord`] | Fundamentals snapshot with nullable metrics |
//! | [`Score`] | Count of satisfied value rules (0..=15) |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Absent metrics are `None`, never a zero or other sentinel.

mod metrics;
mod score;
mod symbol;
mod timestamp;

pub use metrics::{MetricField, MetricsRecord};
pub use score::Score;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
