use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::json;
use valuescore_core::{
    load_batch, FetchErrorKind, HttpClient, HttpError, HttpRequest, HttpResponse, MetricField,
    MetricsProvider, ProviderConfig, ProviderId, StaticMetricsProvider, Symbol,
    YahooMetricsProvider,
};

const CONSTITUENTS_URL: &str = "https://wiki.test/constituents";

const CONSTITUENTS_PAGE: &str = r#"
<table id="constituents">
  <tr><th>Symbol</th><th>Security</th></tr>
  <tr><td>KO</td><td>Coca-Cola</td></tr>
  <tr><td>BRK.B</td><td>Berkshire Hathaway</td></tr>
</table>
"#;

/// Serves a constituents page and quoteSummary documents for KO and BRK-B.
/// Every other ticker gets Yahoo's not-found payload.
struct FakeYahoo;

impl FakeYahoo {
    fn respond(url: &str) -> HttpResponse {
        if url.starts_with(CONSTITUENTS_URL) {
            return HttpResponse::ok(CONSTITUENTS_PAGE);
        }
        if url.contains("/v1/test/getcrumb") {
            return HttpResponse::ok("contractcrumb");
        }
        if url.contains("/quoteSummary/KO?") {
            return HttpResponse::ok(summary(json!({
                "summaryDetail": { "trailingPE": { "raw": 23.9 }, "marketCap": { "raw": 2.6e11 } },
                "defaultKeyStatistics": { "priceToBook": { "raw": 10.1 } },
                "financialData": { "freeCashflow": { "raw": 9.7e9 } }
            })));
        }
        if url.contains("/quoteSummary/BRK-B?") {
            return HttpResponse::ok(summary(json!({
                "summaryDetail": { "trailingPE": { "raw": 9.4 } },
                "price": { "marketCap": { "raw": 8.9e11 } }
            })));
        }
        if url.contains("/quoteSummary/") {
            return HttpResponse::ok(
                json!({
                    "quoteSummary": {
                        "result": null,
                        "error": { "code": "Not Found", "description": "Quote not found" }
                    }
                })
                .to_string(),
            );
        }
        // session endpoint
        HttpResponse::new(404, "")
    }
}

impl HttpClient for FakeYahoo {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = Self::respond(&request.url);
        Box::pin(async move { Ok(response) })
    }
}

fn summary(modules: serde_json::Value) -> String {
    json!({ "quoteSummary": { "result": [modules], "error": null } }).to_string()
}

#[derive(Clone)]
struct ProviderCase {
    id: ProviderId,
    provider: Arc<dyn MetricsProvider>,
}

fn provider_cases() -> Vec<ProviderCase> {
    let document = json!({
        "KO": { "trailingPE": 23.9, "priceToBook": 10.1, "freeCashflow": 9.7e9, "marketCap": 2.6e11 },
        "BRK-B": { "trailingPE": 9.4, "marketCap": 8.9e11 }
    });
    let config = ProviderConfig {
        yahoo_base_url: String::from("https://yahoo.test"),
        session_url: String::from("https://session.yahoo.test"),
        constituents_url: String::from(CONSTITUENTS_URL),
        ..ProviderConfig::default()
    };

    vec![
        ProviderCase {
            id: ProviderId::Static,
            provider: Arc::new(
                StaticMetricsProvider::from_json_value(&document).expect("valid document"),
            ),
        },
        ProviderCase {
            id: ProviderId::Yahoo,
            provider: Arc::new(YahooMetricsProvider::new(Arc::new(FakeYahoo), config)),
        },
    ]
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

#[test]
fn providers_report_their_identity() {
    for case in provider_cases() {
        assert_eq!(case.provider.id(), case.id);
    }
}

#[tokio::test]
async fn universe_lists_normalized_tickers_in_source_order() {
    for case in provider_cases() {
        let universe = case.provider.universe()
            .await
            .unwrap_or_else(|error| panic!("provider '{}' universe failed: {error}", case.id));
        let tickers = universe.iter().map(Symbol::as_str).collect::<Vec<_>>();
        assert_eq!(tickers, vec!["KO", "BRK-B"], "provider '{}': universe", case.id);
    }
}

#[tokio::test]
async fn metrics_carry_the_requested_symbol_and_reported_fields() {
    for case in provider_cases() {
        let record = case.provider.metrics(symbol("KO"))
            .await
            .unwrap_or_else(|error| panic!("provider '{}' metrics failed: {error}", case.id));

        assert_eq!(record.symbol().as_str(), "KO", "provider '{}': symbol", case.id);
        assert_eq!(
            record.get(MetricField::TrailingPe),
            Some(23.9),
            "provider '{}': trailingPE",
            case.id
        );
        assert_eq!(
            record.get(MetricField::MarketCap),
            Some(2.6e11),
            "provider '{}': marketCap",
            case.id
        );
        assert_eq!(
            record.get(MetricField::PegRatio),
            None,
            "provider '{}': unreported metrics stay absent",
            case.id
        );
    }
}

#[tokio::test]
async fn unknown_tickers_are_not_found() {
    for case in provider_cases() {
        let error = case.provider.metrics(symbol("NOPE"))
            .await
            .expect_err("unknown ticker must fail");
        assert_eq!(
            error.kind(),
            FetchErrorKind::NotFound,
            "provider '{}': error kind",
            case.id
        );
        assert_eq!(error.code(), "fetch.not_found");
    }
}

#[tokio::test]
async fn universe_batches_score_the_same_across_providers() {
    let mut scores = Vec::new();
    for case in provider_cases() {
        let report = load_batch(case.provider.as_ref(), None)
            .await
            .unwrap_or_else(|error| panic!("provider '{}' batch failed: {error}", case.id));
        assert!(report.failures.is_empty(), "provider '{}': failures", case.id);
        assert_eq!(report.provider, case.id);

        let batch = valuescore_core::annotate(report.records);
        scores.push(
            batch
                .pairs()
                .into_iter()
                .map(|(symbol, score)| (symbol.to_string(), score.value()))
                .collect::<Vec<_>>(),
        );
    }

    assert_eq!(scores[0], scores[1]);
    // KO: market cap + essentials; BRK-B: low P/E, earnings yield, market cap
    assert_eq!(
        scores[0],
        vec![(String::from("KO"), 2), (String::from("BRK-B"), 3)]
    );
}
