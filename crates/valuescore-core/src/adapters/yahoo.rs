use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::adapters::wikipedia;
use crate::config::ProviderConfig;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::provider::{FetchError, FetchFuture, MetricsProvider};
use crate::{MetricField, MetricsRecord, ProviderId, Symbol};

const REFERER: &str = "https://finance.yahoo.com/";
const MODULES: &str = "defaultKeyStatistics,financialData,summaryDetail,price";

/// quoteSummary modules each metric is read from, in priority order.
const FIELD_SOURCES: [(MetricField, &[&str]); 14] = [
    (MetricField::TrailingPe, &["summaryDetail"]),
    (MetricField::PriceToBook, &["defaultKeyStatistics"]),
    (MetricField::PriceToSalesTrailing12Months, &["summaryDetail"]),
    (MetricField::EnterpriseToEbitda, &["defaultKeyStatistics"]),
    (MetricField::EnterpriseToRevenue, &["defaultKeyStatistics"]),
    (MetricField::FreeCashflow, &["financialData"]),
    (MetricField::TotalCash, &["financialData"]),
    (MetricField::TotalDebt, &["financialData"]),
    (MetricField::DebtToEquity, &["financialData"]),
    (MetricField::ReturnOnEquity, &["financialData"]),
    (MetricField::OperatingMargins, &["financialData"]),
    (MetricField::EarningsQuarterlyGrowth, &["defaultKeyStatistics"]),
    (MetricField::PegRatio, &["defaultKeyStatistics"]),
    (MetricField::MarketCap, &["summaryDetail", "price"]),
];

/// Yahoo Finance metrics provider.
///
/// Yahoo's quoteSummary endpoint needs a session cookie (set by
/// `fc.yahoo.com`) plus a crumb token tied to it. The crumb is fetched on
/// first use and reused until Yahoo rejects it. Setting `YAHOO_COOKIE`
/// replaces the cookie handshake with a fixed cookie header.
pub struct YahooMetricsProvider {
    http_client: Arc<dyn HttpClient>,
    config: ProviderConfig,
    crumb: Mutex<Option<String>>,
}

impl YahooMetricsProvider {
    pub fn new(http_client: Arc<dyn HttpClient>, config: ProviderConfig) -> Self {
        Self {
            http_client,
            config,
            crumb: Mutex::new(None),
        }
    }

    /// Provider backed by a reqwest client built from `config`.
    pub fn from_config(config: ProviderConfig) -> Result<Self, FetchError> {
        let client = ReqwestHttpClient::from_config(&config)
            .map_err(|e| FetchError::internal(e.message().to_owned()))?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn auth(&self) -> HttpAuth {
        match &self.config.cookie {
            Some(cookie) => HttpAuth::Cookie(cookie.clone()),
            None => HttpAuth::None,
        }
    }

    fn request(&self, url: impl Into<String>) -> HttpRequest {
        HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_auth(&self.auth())
            .with_timeout_ms(self.config.timeout_ms)
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        self.http_client
            .execute(request)
            .await
            .map_err(|e| FetchError::unavailable(format!("yahoo transport error: {}", e.message())))
    }

    async fn crumb(&self) -> Result<String, FetchError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        let crumb = self.fetch_crumb().await?;
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn fetch_crumb(&self) -> Result<String, FetchError> {
        if self.config.cookie.is_none() {
            // fc.yahoo.com answers 404 but still sets the session cookie.
            self.execute(self.request(self.config.session_url.as_str()))
                .await?;
        }

        let response = self.execute(self.request(self.config.crumb_url())).await?;
        if !response.is_success() {
            return Err(FetchError::unavailable(format!(
                "yahoo crumb endpoint returned status {}",
                response.status
            )));
        }

        let crumb = parse_crumb(&response.body)?;
        debug!("obtained yahoo crumb");
        Ok(crumb)
    }

    async fn fetch_metrics(&self, symbol: Symbol) -> Result<MetricsRecord, FetchError> {
        let crumb = self.crumb().await?;
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            self.config.yahoo_base_url,
            urlencoding::encode(symbol.as_str()),
            MODULES,
            urlencoding::encode(&crumb)
        );

        let response = self.execute(self.request(url)).await?;
        match response.status {
            401 | 403 => {
                // Next ticker performs a fresh handshake.
                *self.crumb.lock().await = None;
                Err(FetchError::unavailable(format!(
                    "yahoo rejected the session (status {})",
                    response.status
                )))
            }
            404 => Err(FetchError::not_found(format!(
                "yahoo has no quote summary for '{symbol}'"
            ))),
            status if !response.is_success() => Err(FetchError::unavailable(format!(
                "yahoo returned status {status}"
            ))),
            _ => parse_quote_summary(symbol, &response.body),
        }
    }
}

impl MetricsProvider for YahooMetricsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn universe(&self) -> FetchFuture<'_, Vec<Symbol>> {
        Box::pin(async move {
            wikipedia::fetch_sp500_tickers(
                self.http_client.as_ref(),
                &self.config.constituents_url,
                self.config.timeout_ms,
            )
            .await
        })
    }

    fn metrics(&self, symbol: Symbol) -> FetchFuture<'_, MetricsRecord> {
        Box::pin(self.fetch_metrics(symbol))
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn parse_crumb(body: &str) -> Result<String, FetchError> {
    let body = body.trim();
    if body.to_ascii_lowercase().contains("too many requests") {
        return Err(FetchError::unavailable(
            "yahoo rate limited the crumb request",
        ));
    }

    let plausible = !body.is_empty()
        && body.len() < 100
        && !body.contains('<')
        && !body.contains(char::is_whitespace);
    if !plausible {
        return Err(FetchError::invalid_response(
            "yahoo crumb endpoint returned an unexpected payload",
        ));
    }

    Ok(body.to_owned())
}

fn parse_quote_summary(symbol: Symbol, body: &str) -> Result<MetricsRecord, FetchError> {
    let response: QuoteSummaryResponse = serde_json::from_str(body).map_err(|e| {
        FetchError::invalid_response(format!("failed to parse yahoo quote summary: {e}"))
    })?;

    if let Some(error) = response.quote_summary.error {
        let code = error.code.unwrap_or_default();
        let description = error.description.unwrap_or_default();
        let message = format!("yahoo quote summary error for '{symbol}': {code} {description}");
        return Err(if code.eq_ignore_ascii_case("not found") {
            FetchError::not_found(message.trim_end())
        } else {
            FetchError::unavailable(message.trim_end())
        });
    }

    let modules = response
        .quote_summary
        .result
        .and_then(|result| result.into_iter().next())
        .ok_or_else(|| FetchError::not_found(format!("yahoo returned no data for '{symbol}'")))?;

    Ok(MetricsRecord::from_fields(symbol, &collect_fields(&modules))?)
}

/// Flatten the quoteSummary modules into a metric name/value map.
///
/// Yahoo wraps numbers as `{"raw": 1.5, "fmt": "1.50"}` and reports a
/// missing number as `{}`.
fn collect_fields(modules: &Map<String, Value>) -> Map<String, Value> {
    let mut fields = Map::new();
    for (field, sources) in FIELD_SOURCES {
        let value = sources
            .iter()
            .filter_map(|module| modules.get(*module)?.get(field.as_str()))
            .map(unwrap_raw)
            .find(|value| !value.is_null())
            .unwrap_or(Value::Null);
        fields.insert(field.as_str().to_owned(), value);
    }
    fields
}

fn unwrap_raw(value: &Value) -> Value {
    match value {
        Value::Object(wrapped) => wrapped.get("raw").cloned().unwrap_or(Value::Null),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;

    use serde_json::json;

    use super::*;
    use crate::http_client::HttpError;
    use crate::provider::FetchErrorKind;

    /// Answers each request with the first route whose marker occurs in the
    /// URL, recording every request.
    struct ScriptedHttpClient {
        routes: Vec<(&'static str, Result<HttpResponse, HttpError>)>,
        requests: std::sync::Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(routes: Vec<(&'static str, Result<HttpResponse, HttpError>)>) -> Self {
            Self {
                routes,
                requests: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn recorded(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }

        fn hits(&self, marker: &str) -> usize {
            self.recorded()
                .iter()
                .filter(|request| request.url.contains(marker))
                .count()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self
                .routes
                .iter()
                .find(|(marker, _)| request.url.contains(marker))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Ok(HttpResponse::new(500, "unrouted")));
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            Box::pin(async move { response })
        }
    }

    fn config() -> ProviderConfig {
        ProviderConfig {
            yahoo_base_url: String::from("https://yahoo.test"),
            session_url: String::from("https://session.yahoo.test"),
            ..ProviderConfig::default()
        }
    }

    fn summary_body() -> String {
        json!({
            "quoteSummary": {
                "result": [{
                    "summaryDetail": {
                        "trailingPE": { "raw": 11.2, "fmt": "11.20" },
                        "priceToSalesTrailing12Months": { "raw": 0.8, "fmt": "0.80" },
                        "marketCap": {}
                    },
                    "price": { "marketCap": { "raw": 2.0e11, "fmt": "200B" } },
                    "defaultKeyStatistics": {
                        "priceToBook": { "raw": 1.4, "fmt": "1.40" },
                        "pegRatio": {},
                        "enterpriseToEbitda": { "raw": 7.1, "fmt": "7.10" }
                    },
                    "financialData": {
                        "freeCashflow": { "raw": 1.9e10, "fmt": "19B" },
                        "debtToEquity": { "raw": 152.3, "fmt": "152.30" },
                        "operatingMargins": { "raw": 0.12, "fmt": "12%" }
                    }
                }],
                "error": null
            }
        })
        .to_string()
    }

    fn ok_routes(summary: String) -> Vec<(&'static str, Result<HttpResponse, HttpError>)> {
        vec![
            ("session.yahoo.test", Ok(HttpResponse::new(404, "<html></html>"))),
            ("/v1/test/getcrumb", Ok(HttpResponse::ok("abcDEF.123"))),
            ("/quoteSummary/", Ok(HttpResponse::ok(summary))),
        ]
    }

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn maps_modules_onto_metric_fields() {
        let record = parse_quote_summary(symbol("CVX"), &summary_body()).expect("record");

        assert_eq!(record.get(MetricField::TrailingPe), Some(11.2));
        assert_eq!(record.get(MetricField::PriceToSalesTrailing12Months), Some(0.8));
        assert_eq!(record.get(MetricField::PriceToBook), Some(1.4));
        assert_eq!(record.get(MetricField::EnterpriseToEbitda), Some(7.1));
        assert_eq!(record.get(MetricField::FreeCashflow), Some(1.9e10));
        assert_eq!(record.get(MetricField::DebtToEquity), Some(152.3));
        // empty summaryDetail.marketCap falls back to price.marketCap
        assert_eq!(record.get(MetricField::MarketCap), Some(2.0e11));
        assert_eq!(record.get(MetricField::PegRatio), None);
        assert_eq!(record.get(MetricField::TotalCash), None);
    }

    #[test]
    fn not_found_error_payload_maps_to_not_found() {
        let body = json!({
            "quoteSummary": {
                "result": null,
                "error": { "code": "Not Found", "description": "Quote not found for symbol: ZZZZ" }
            }
        })
        .to_string();
        let err = parse_quote_summary(symbol("ZZZZ"), &body).expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::NotFound);
    }

    #[test]
    fn non_numeric_raw_value_rejects_the_record() {
        let body = json!({
            "quoteSummary": {
                "result": [{ "summaryDetail": { "trailingPE": { "raw": "Infinity", "fmt": "∞" } } }],
                "error": null
            }
        })
        .to_string();
        let err = parse_quote_summary(symbol("TSLA"), &body).expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::InvalidRecord);
        assert!(err.message().contains("trailingPE"));
    }

    #[test]
    fn crumb_rejects_html_and_rate_limit_pages() {
        assert_eq!(parse_crumb(" a1b2/c3 \n").expect("crumb"), "a1b2/c3");
        assert_eq!(
            parse_crumb("<!DOCTYPE html>").expect_err("html").kind(),
            FetchErrorKind::InvalidResponse
        );
        assert_eq!(
            parse_crumb("Too Many Requests").expect_err("429").kind(),
            FetchErrorKind::Unavailable
        );
    }

    #[tokio::test]
    async fn crumb_is_fetched_once_per_session() {
        let client = Arc::new(ScriptedHttpClient::new(ok_routes(summary_body())));
        let provider = YahooMetricsProvider::new(client.clone(), config());

        provider.metrics(symbol("CVX")).await.expect("first");
        provider.metrics(symbol("XOM")).await.expect("second");

        assert_eq!(client.hits("session.yahoo.test"), 1);
        assert_eq!(client.hits("/v1/test/getcrumb"), 1);
        assert_eq!(client.hits("/quoteSummary/"), 2);
        let last = client.recorded().pop().expect("request");
        assert!(last.url.contains("/quoteSummary/XOM?modules="));
        assert!(last.url.ends_with("&crumb=abcDEF.123"));
        assert_eq!(last.timeout_ms, config().timeout_ms);
    }

    #[tokio::test]
    async fn rejected_session_is_dropped_for_the_next_ticker() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            ("session.yahoo.test", Ok(HttpResponse::new(404, ""))),
            ("/v1/test/getcrumb", Ok(HttpResponse::ok("crumb1"))),
            ("/quoteSummary/", Ok(HttpResponse::new(401, "Unauthorized"))),
        ]));
        let provider = YahooMetricsProvider::new(client.clone(), config());

        let err = provider.metrics(symbol("KO")).await.expect_err("401");
        assert_eq!(err.kind(), FetchErrorKind::Unavailable);
        let _ = provider.metrics(symbol("PEP")).await;

        assert_eq!(client.hits("/v1/test/getcrumb"), 2);
        // one attempt per ticker, never retried
        assert_eq!(client.hits("/quoteSummary/"), 2);
    }

    #[tokio::test]
    async fn unknown_ticker_status_is_not_found() {
        let mut routes = ok_routes(String::new());
        routes[2] = ("/quoteSummary/", Ok(HttpResponse::new(404, "{}")));
        let provider = YahooMetricsProvider::new(Arc::new(ScriptedHttpClient::new(routes)), config());

        let err = provider.metrics(symbol("NOPE")).await.expect_err("404");
        assert_eq!(err.kind(), FetchErrorKind::NotFound);
    }

    #[tokio::test]
    async fn cookie_override_skips_handshake_and_sends_cookie() {
        let client = Arc::new(ScriptedHttpClient::new(ok_routes(summary_body())));
        let config = ProviderConfig {
            cookie: Some(String::from("A3=d=fixed")),
            ..config()
        };
        let provider = YahooMetricsProvider::new(client.clone(), config);

        provider.metrics(symbol("CVX")).await.expect("record");

        assert_eq!(client.hits("session.yahoo.test"), 0);
        for request in client.recorded() {
            assert_eq!(
                request.headers.get("cookie").map(String::as_str),
                Some("A3=d=fixed")
            );
        }
    }

    #[tokio::test]
    async fn transport_failure_is_unavailable() {
        let client = Arc::new(ScriptedHttpClient::new(vec![(
            "yahoo.test",
            Err(HttpError::new("connection failed: refused")),
        )]));
        let provider = YahooMetricsProvider::new(client, config());

        let err = provider.metrics(symbol("KO")).await.expect_err("transport");
        assert_eq!(err.kind(), FetchErrorKind::Unavailable);
        assert!(err.message().contains("connection failed"));
    }
}
