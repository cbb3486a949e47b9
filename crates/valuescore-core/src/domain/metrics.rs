use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Symbol, ValidationError};

/// Numeric fundamentals a provider reports for one equity.
///
/// Names follow the provider's camelCase keys so raw field maps can be read
/// without a translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricField {
    TrailingPe,
    PriceToBook,
    PriceToSalesTrailing12Months,
    EnterpriseToEbitda,
    EnterpriseToRevenue,
    FreeCashflow,
    TotalCash,
    TotalDebt,
    DebtToEquity,
    ReturnOnEquity,
    OperatingMargins,
    EarningsQuarterlyGrowth,
    PegRatio,
    MarketCap,
}

impl MetricField {
    pub const ALL: [Self; 14] = [
        Self::TrailingPe,
        Self::PriceToBook,
        Self::PriceToSalesTrailing12Months,
        Self::EnterpriseToEbitda,
        Self::EnterpriseToRevenue,
        Self::FreeCashflow,
        Self::TotalCash,
        Self::TotalDebt,
        Self::DebtToEquity,
        Self::ReturnOnEquity,
        Self::OperatingMargins,
        Self::EarningsQuarterlyGrowth,
        Self::PegRatio,
        Self::MarketCap,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrailingPe => "trailingPE",
            Self::PriceToBook => "priceToBook",
            Self::PriceToSalesTrailing12Months => "priceToSalesTrailing12Months",
            Self::EnterpriseToEbitda => "enterpriseToEbitda",
            Self::EnterpriseToRevenue => "enterpriseToRevenue",
            Self::FreeCashflow => "freeCashflow",
            Self::TotalCash => "totalCash",
            Self::TotalDebt => "totalDebt",
            Self::DebtToEquity => "debtToEquity",
            Self::ReturnOnEquity => "returnOnEquity",
            Self::OperatingMargins => "operatingMargins",
            Self::EarningsQuarterlyGrowth => "earningsQuarterlyGrowth",
            Self::PegRatio => "pegRatio",
            Self::MarketCap => "marketCap",
        }
    }
}

impl Display for MetricField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == trimmed)
            .ok_or_else(|| ValidationError::UnknownField {
                value: trimmed.to_owned(),
            })
    }
}

/// Fundamentals snapshot for one equity.
///
/// Every metric is optional: `None` means the provider did not report it,
/// which is never the same as a reported zero. Records are built once and
/// not modified afterwards; scoring produces a separate annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    symbol: Symbol,
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<f64>,
    #[serde(rename = "priceToBook", default)]
    price_to_book: Option<f64>,
    #[serde(rename = "priceToSalesTrailing12Months", default)]
    price_to_sales_ttm: Option<f64>,
    #[serde(rename = "enterpriseToEbitda", default)]
    enterprise_to_ebitda: Option<f64>,
    #[serde(rename = "enterpriseToRevenue", default)]
    enterprise_to_revenue: Option<f64>,
    #[serde(rename = "freeCashflow", default)]
    free_cashflow: Option<f64>,
    #[serde(rename = "totalCash", default)]
    total_cash: Option<f64>,
    #[serde(rename = "totalDebt", default)]
    total_debt: Option<f64>,
    #[serde(rename = "debtToEquity", default)]
    debt_to_equity: Option<f64>,
    #[serde(rename = "returnOnEquity", default)]
    return_on_equity: Option<f64>,
    #[serde(rename = "operatingMargins", default)]
    operating_margins: Option<f64>,
    #[serde(rename = "earningsQuarterlyGrowth", default)]
    earnings_quarterly_growth: Option<f64>,
    #[serde(rename = "pegRatio", default)]
    peg_ratio: Option<f64>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<f64>,
}

impl MetricsRecord {
    /// Record with every metric absent.
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            trailing_pe: None,
            price_to_book: None,
            price_to_sales_ttm: None,
            enterprise_to_ebitda: None,
            enterprise_to_revenue: None,
            free_cashflow: None,
            total_cash: None,
            total_debt: None,
            debt_to_equity: None,
            return_on_equity: None,
            operating_margins: None,
            earnings_quarterly_growth: None,
            peg_ratio: None,
            market_cap: None,
        }
    }

    /// Builder-style setter used while a provider assembles the record.
    pub fn with(mut self, field: MetricField, value: impl Into<Option<f64>>) -> Self {
        *self.slot_mut(field) = value.into();
        self
    }

    /// Build a record from a raw name/value map as returned by a provider.
    ///
    /// Missing keys and JSON `null` become absent metrics. Any other
    /// non-number value is rejected with the offending ticker and field
    /// rather than coerced. Keys that are not metric names are ignored.
    pub fn from_fields(symbol: Symbol, fields: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut record = Self::new(symbol);
        for field in MetricField::ALL {
            let value = match fields.get(field.as_str()) {
                None | Some(Value::Null) => None,
                Some(Value::Number(number)) => match number.as_f64() {
                    Some(value) if value.is_finite() => Some(value),
                    _ => return Err(record.non_numeric(field)),
                },
                Some(_) => return Err(record.non_numeric(field)),
            };
            *record.slot_mut(field) = value;
        }
        Ok(record)
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub const fn get(&self, field: MetricField) -> Option<f64> {
        match field {
            MetricField::TrailingPe => self.trailing_pe,
            MetricField::PriceToBook => self.price_to_book,
            MetricField::PriceToSalesTrailing12Months => self.price_to_sales_ttm,
            MetricField::EnterpriseToEbitda => self.enterprise_to_ebitda,
            MetricField::EnterpriseToRevenue => self.enterprise_to_revenue,
            MetricField::FreeCashflow => self.free_cashflow,
            MetricField::TotalCash => self.total_cash,
            MetricField::TotalDebt => self.total_debt,
            MetricField::DebtToEquity => self.debt_to_equity,
            MetricField::ReturnOnEquity => self.return_on_equity,
            MetricField::OperatingMargins => self.operating_margins,
            MetricField::EarningsQuarterlyGrowth => self.earnings_quarterly_growth,
            MetricField::PegRatio => self.peg_ratio,
            MetricField::MarketCap => self.market_cap,
        }
    }

    pub fn is_present(&self, field: MetricField) -> bool {
        self.get(field).is_some()
    }

    /// Number of metrics the provider reported.
    pub fn present_fields(&self) -> usize {
        MetricField::ALL
            .into_iter()
            .filter(|field| self.is_present(*field))
            .count()
    }

    fn slot_mut(&mut self, field: MetricField) -> &mut Option<f64> {
        match field {
            MetricField::TrailingPe => &mut self.trailing_pe,
            MetricField::PriceToBook => &mut self.price_to_book,
            MetricField::PriceToSalesTrailing12Months => &mut self.price_to_sales_ttm,
            MetricField::EnterpriseToEbitda => &mut self.enterprise_to_ebitda,
            MetricField::EnterpriseToRevenue => &mut self.enterprise_to_revenue,
            MetricField::FreeCashflow => &mut self.free_cashflow,
            MetricField::TotalCash => &mut self.total_cash,
            MetricField::TotalDebt => &mut self.total_debt,
            MetricField::DebtToEquity => &mut self.debt_to_equity,
            MetricField::ReturnOnEquity => &mut self.return_on_equity,
            MetricField::OperatingMargins => &mut self.operating_margins,
            MetricField::EarningsQuarterlyGrowth => &mut self.earnings_quarterly_growth,
            MetricField::PegRatio => &mut self.peg_ratio,
            MetricField::MarketCap => &mut self.market_cap,
        }
    }

    fn non_numeric(&self, field: MetricField) -> ValidationError {
        ValidationError::NonNumericField {
            symbol: self.symbol.to_string(),
            field: field.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn field_names_round_trip() {
        for field in MetricField::ALL {
            let parsed: MetricField = field.as_str().parse().expect("known field");
            assert_eq!(parsed, field);
        }
        assert!(matches!(
            "forwardPE".parse::<MetricField>(),
            Err(ValidationError::UnknownField { .. })
        ));
    }

    #[test]
    fn null_and_missing_fields_stay_absent() {
        let fields = json!({ "trailingPE": null, "marketCap": 0 });
        let record = MetricsRecord::from_fields(symbol("KO"), fields.as_object().expect("object"))
            .expect("valid record");

        assert_eq!(record.get(MetricField::TrailingPe), None);
        assert_eq!(record.get(MetricField::MarketCap), Some(0.0));
        assert_eq!(record.get(MetricField::PriceToBook), None);
        assert_eq!(record.present_fields(), 1);
    }

    #[test]
    fn string_value_is_rejected_with_ticker_and_field() {
        let fields = json!({ "priceToBook": "1.2" });
        let err = MetricsRecord::from_fields(symbol("pep"), fields.as_object().expect("object"))
            .expect_err("must fail");

        assert_eq!(
            err,
            ValidationError::NonNumericField {
                symbol: String::from("PEP"),
                field: "priceToBook",
            }
        );
    }

    #[test]
    fn serializes_with_provider_field_names() {
        let record = MetricsRecord::new(symbol("T"))
            .with(MetricField::TrailingPe, 7.5)
            .with(MetricField::PriceToSalesTrailing12Months, 0.9);
        let value = serde_json::to_value(&record).expect("serialize");

        assert_eq!(value["symbol"], "T");
        assert_eq!(value["trailingPE"], 7.5);
        assert_eq!(value["priceToSalesTrailing12Months"], 0.9);
        assert!(value["marketCap"].is_null());
    }

    #[test]
    fn deserializes_partial_record() {
        let record: MetricsRecord =
            serde_json::from_value(json!({ "symbol": "ibm", "pegRatio": 0.7 })).expect("record");

        assert_eq!(record.symbol().as_str(), "IBM");
        assert_eq!(record.get(MetricField::PegRatio), Some(0.7));
        assert_eq!(record.present_fields(), 1);
    }
}
