//! # Valuescore Core
//!
//! Domain types, the value scoring engine and the metrics provider
//! boundary for the valuescore toolkit.
//!
//! ## Overview
//!
//! - **Metrics records** with nullable fundamentals and a validated ticker
//! - **Scoring engine**: fifteen threshold rules, one point each
//! - **Reporting**: score ordering, top-N, histogram and summary statistics
//! - **Provider boundary** for acquiring records, with Yahoo Finance,
//!   Wikipedia constituents and static JSON documents behind it
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo, Wikipedia and static providers |
//! | [`config`] | Provider endpoints and environment overrides |
//! | [`domain`] | Symbol, MetricsRecord, Score, UtcDateTime |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`provider`] | Provider trait and batch loading |
//! | [`report`] | Scored batches and statistics |
//! | [`scoring`] | Rule table and score computation |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust
//! use valuescore_core::{annotate, MetricField, MetricsRecord, Score, Symbol};
//!
//! let records = vec![
//!     MetricsRecord::new(Symbol::parse("AAA").unwrap())
//!         .with(MetricField::TrailingPe, 9.0)
//!         .with(MetricField::PriceToBook, 0.8),
//!     MetricsRecord::new(Symbol::parse("BBB").unwrap()),
//! ];
//!
//! let mut batch = annotate(records);
//! batch.sort_by_score_desc();
//!
//! assert_eq!(batch.entries()[0].symbol().as_str(), "AAA");
//! assert_eq!(batch.histogram().count(Score::MIN), 1);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  load_batch     │────▶│ MetricsProvider  │──▶ HTTP Client
//! └────────┬────────┘     └──────────────────┘
//!          │ records (failures skipped)
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Scoring Engine │────▶│  ScoredBatch     │
//! │  (RULES)        │     │  sort/histogram  │
//! └─────────────────┘     └──────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod provider;
pub mod report;
pub mod scoring;
pub mod source;

pub use adapters::{StaticMetricsProvider, YahooMetricsProvider};
pub use config::ProviderConfig;
pub use domain::{MetricField, MetricsRecord, Score, Symbol, UtcDateTime};
pub use error::{CoreError, ValidationError};
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use provider::{
    load_batch, FetchError, FetchErrorKind, FetchFuture, LoadFailure, LoadReport, MetricsProvider,
};
pub use report::{BatchSummary, ScoreHistogram, ScoredBatch, ScoredRecord};
pub use scoring::{annotate, annotate_parallel, evaluate, score, Rule, RuleBreakdown, RuleOutcome, RULES};
pub use source::ProviderId;
