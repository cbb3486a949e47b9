use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::provider::{FetchError, FetchFuture, MetricsProvider};
use crate::{CoreError, MetricsRecord, ProviderId, Symbol, ValidationError};

/// In-memory provider backed by literal records or a JSON metrics document.
///
/// Accepted documents:
///
/// ```json
/// { "KO": { "trailingPE": 24.1, "marketCap": null }, "XOM": {} }
/// ```
///
/// ```json
/// [ { "symbol": "KO", "trailingPE": 24.1 }, { "symbol": "XOM" } ]
/// ```
///
/// The universe is the document's tickers in document order.
#[derive(Debug, Clone, Default)]
pub struct StaticMetricsProvider {
    universe: Vec<Symbol>,
    records: HashMap<Symbol, MetricsRecord>,
}

impl StaticMetricsProvider {
    pub fn new(records: Vec<MetricsRecord>) -> Result<Self, ValidationError> {
        let mut provider = Self::default();
        for record in records {
            provider.insert(record)?;
        }
        Ok(provider)
    }

    pub fn from_json_str(document: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(document)?;
        Ok(Self::from_json_value(&value)?)
    }

    pub fn from_json_value(document: &Value) -> Result<Self, ValidationError> {
        let mut provider = Self::default();
        match document {
            Value::Object(by_ticker) => {
                let empty = Map::new();
                for (ticker, fields) in by_ticker {
                    let symbol = Symbol::parse(ticker)?;
                    let fields = match fields {
                        Value::Object(fields) => fields,
                        Value::Null => &empty,
                        _ => {
                            return Err(ValidationError::InvalidDocument {
                                reason: format!("metrics for '{ticker}' must be an object"),
                            })
                        }
                    };
                    provider.insert(MetricsRecord::from_fields(symbol, fields)?)?;
                }
            }
            Value::Array(rows) => {
                for (index, row) in rows.iter().enumerate() {
                    let fields = row.as_object().ok_or_else(|| ValidationError::InvalidDocument {
                        reason: format!("row {index} must be an object"),
                    })?;
                    let ticker = fields
                        .get("symbol")
                        .and_then(Value::as_str)
                        .ok_or_else(|| ValidationError::InvalidDocument {
                            reason: format!("row {index} is missing a string 'symbol'"),
                        })?;
                    let symbol = Symbol::parse(ticker)?;
                    provider.insert(MetricsRecord::from_fields(symbol, fields)?)?;
                }
            }
            _ => {
                return Err(ValidationError::InvalidDocument {
                    reason: String::from("expected an object keyed by ticker or an array of rows"),
                })
            }
        }
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.universe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universe.is_empty()
    }

    fn insert(&mut self, record: MetricsRecord) -> Result<(), ValidationError> {
        let symbol = record.symbol().clone();
        if self.records.contains_key(&symbol) {
            return Err(ValidationError::DuplicateSymbol {
                symbol: symbol.to_string(),
            });
        }
        self.universe.push(symbol.clone());
        self.records.insert(symbol, record);
        Ok(())
    }
}

impl MetricsProvider for StaticMetricsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Static
    }

    fn universe(&self) -> FetchFuture<'_, Vec<Symbol>> {
        let universe = self.universe.clone();
        Box::pin(async move { Ok(universe) })
    }

    fn metrics(&self, symbol: Symbol) -> FetchFuture<'_, MetricsRecord> {
        let found = self.records.get(&symbol).cloned();
        Box::pin(async move {
            found.ok_or_else(|| FetchError::not_found(format!("no metrics for '{symbol}'")))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::MetricField;

    #[test]
    fn object_document_keeps_ticker_order() {
        let provider = StaticMetricsProvider::from_json_value(&json!({
            "ko": { "trailingPE": 24.1 },
            "XOM": null,
            "AAPL": {}
        }))
        .expect("valid document");

        let expected = ["KO", "XOM", "AAPL"];
        assert_eq!(provider.len(), 3);
        for (symbol, expected) in provider.universe.iter().zip(expected) {
            assert_eq!(symbol.as_str(), expected);
        }
        let ko = &provider.records[&Symbol::parse("KO").expect("symbol")];
        assert_eq!(ko.get(MetricField::TrailingPe), Some(24.1));
    }

    #[test]
    fn rows_require_a_symbol() {
        let err = StaticMetricsProvider::from_json_value(&json!([{ "trailingPE": 3 }]))
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDocument { .. }));
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        let err = StaticMetricsProvider::from_json_value(&json!([
            { "symbol": "KO" },
            { "symbol": "ko" }
        ]))
        .expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::DuplicateSymbol {
                symbol: String::from("KO")
            }
        );
    }

    #[test]
    fn malformed_field_fails_the_whole_document() {
        let err = StaticMetricsProvider::from_json_value(&json!({
            "KO": { "marketCap": true }
        }))
        .expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::NonNumericField { field: "marketCap", .. }
        ));
    }

    #[test]
    fn invalid_json_is_a_serialization_error() {
        let err = StaticMetricsProvider::from_json_str("{ not json").expect_err("must fail");
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}
