//! S&P 500 constituent list scraped from Wikipedia.
//!
//! The ticker is the first cell of each row of `table#constituents`.
//! Listings use `.` for share classes (`BRK.B`) where Yahoo expects `-`.

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::FetchError;
use crate::Symbol;

/// Fetch the constituents page and extract its tickers.
pub async fn fetch_sp500_tickers(
    client: &dyn HttpClient,
    url: &str,
    timeout_ms: u64,
) -> Result<Vec<Symbol>, FetchError> {
    let request = HttpRequest::get(url).with_timeout_ms(timeout_ms);
    let response = client.execute(request).await.map_err(|e| {
        FetchError::unavailable(format!("failed to fetch constituents page: {}", e.message()))
    })?;

    if !response.is_success() {
        return Err(FetchError::unavailable(format!(
            "constituents page returned status {}",
            response.status
        )));
    }

    let tickers = parse_constituents(&response.body)?;
    debug!(count = tickers.len(), "parsed constituents table");
    Ok(tickers)
}

/// Tickers from the `constituents` table, in table order.
///
/// Cells that do not form a valid symbol are logged and skipped. A page
/// without the table, or whose table yields no tickers, is rejected.
pub fn parse_constituents(html: &str) -> Result<Vec<Symbol>, FetchError> {
    let document = Html::parse_document(html);
    let table = selector("table#constituents")?;
    let row = selector("tr")?;
    let cell = selector("td")?;

    let table = document.select(&table).next().ok_or_else(|| {
        FetchError::invalid_response("constituents table not found in page")
    })?;

    let mut tickers = Vec::new();
    for row in table.select(&row) {
        let Some(first) = row.select(&cell).next() else {
            continue;
        };
        let raw = first.text().collect::<String>();
        let raw = raw.trim();
        match Symbol::parse_listing(raw) {
            Ok(symbol) => tickers.push(symbol),
            Err(error) => warn!(cell = raw, "skipping constituents row: {error}"),
        }
    }

    if tickers.is_empty() {
        return Err(FetchError::invalid_response(
            "constituents table contained no tickers",
        ));
    }
    Ok(tickers)
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css)
        .map_err(|e| FetchError::internal(format!("invalid css selector '{css}': {e:?}")))
}
