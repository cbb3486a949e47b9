//! # Metrics Provider boundary
//!
//! Acquisition of [`MetricsRecord`]s is isolated behind [`MetricsProvider`]
//! so scoring can run on literal inputs without network access.
//!
//! [`load_batch`] fetches tickers one at a time. A ticker that fails is
//! logged, reported in [`LoadReport::failures`] and left out of the batch;
//! it never appears as a record with a sentinel score.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info, warn};

use crate::{MetricsRecord, ProviderId, Symbol, UtcDateTime, ValidationError};

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Unavailable,
    NotFound,
    InvalidResponse,
    InvalidRecord,
    Internal,
}

/// Structured acquisition error for one ticker or for the universe lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Unavailable, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::NotFound, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::InvalidResponse, message)
    }

    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::InvalidRecord, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Internal, message)
    }

    fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Unavailable => "fetch.unavailable",
            FetchErrorKind::NotFound => "fetch.not_found",
            FetchErrorKind::InvalidResponse => "fetch.invalid_response",
            FetchErrorKind::InvalidRecord => "fetch.invalid_record",
            FetchErrorKind::Internal => "fetch.internal",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

impl From<ValidationError> for FetchError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_record(error.to_string())
    }
}

/// Boxed future returned by provider methods.
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'a>>;

/// Source of metrics records and of the default ticker universe.
pub trait MetricsProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Tickers scored when the caller does not name any.
    fn universe(&self) -> FetchFuture<'_, Vec<Symbol>>;

    fn metrics(&self, symbol: Symbol) -> FetchFuture<'_, MetricsRecord>;
}

/// A ticker that was skipped during [`load_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub symbol: Symbol,
    pub error: FetchError,
}

impl Display for LoadFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.symbol, self.error)
    }
}

/// Outcome of loading a batch: the records that arrived, in request order,
/// and the tickers that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub provider: ProviderId,
    pub records: Vec<MetricsRecord>,
    pub failures: Vec<LoadFailure>,
    pub started_at: UtcDateTime,
    pub latency_ms: u64,
}

impl LoadReport {
    pub fn requested(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Fetch metrics for `tickers`, or for the provider's universe when `None`.
///
/// Only a failed universe lookup is returned as an error. Per-ticker
/// failures are collected in the report. Repeated tickers are fetched once.
pub async fn load_batch(
    provider: &dyn MetricsProvider,
    tickers: Option<Vec<Symbol>>,
) -> Result<LoadReport, FetchError> {
    let started_at = UtcDateTime::now();
    let tickers = match tickers {
        Some(tickers) => tickers,
        None => {
            let universe = provider.universe().await?;
            info!(
                provider = %provider.id(),
                tickers = universe.len(),
                "resolved ticker universe"
            );
            universe
        }
    };

    let mut seen = HashSet::with_capacity(tickers.len());
    let mut records = Vec::with_capacity(tickers.len());
    let mut failures = Vec::new();

    for symbol in tickers {
        if !seen.insert(symbol.clone()) {
            debug!(%symbol, "skipping repeated ticker");
            continue;
        }

        debug!(%symbol, provider = %provider.id(), "fetching metrics");
        match provider.metrics(symbol.clone()).await {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(%symbol, code = error.code(), "skipping ticker: {}", error.message());
                failures.push(LoadFailure { symbol, error });
            }
        }
    }

    let latency_ms = UtcDateTime::now().millis_since(started_at);
    info!(
        provider = %provider.id(),
        loaded = records.len(),
        skipped = failures.len(),
        latency_ms,
        "metrics batch loaded"
    );

    Ok(LoadReport {
        provider: provider.id(),
        records,
        failures,
        started_at,
        latency_ms,
    })
}
