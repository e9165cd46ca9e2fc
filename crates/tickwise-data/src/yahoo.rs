use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tickwise_models::{InstrumentInfo, PriceBar};
use tracing::debug;

use crate::capability::{MarketData, ReferenceData};
use crate::error::DataError;

/// Yahoo Finance client over the v8 chart API (no auth required).
///
/// Serves both reference lookups (chart metadata) and daily history.
pub struct YahooClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl YahooClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, DataError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| DataError::Config(format!("Invalid Yahoo base URL {base_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Config(format!("HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    fn chart_url(&self, symbol: &str) -> Result<reqwest::Url, DataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DataError::Config("Yahoo base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    async fn chart(&self, symbol: &str, range: &str) -> Result<ChartData, DataError> {
        let url = self.chart_url(symbol)?;
        debug!(symbol, range, "Requesting Yahoo chart");

        let resp = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::NotFound(format!("Yahoo returned 404 for {symbol}")));
        }
        if !status.is_success() {
            return Err(DataError::Status {
                status: status.as_u16(),
                message: format!("Yahoo chart request for {symbol}"),
            });
        }

        let body = resp.text().await?;
        decode_chart(symbol, &body)
    }
}

#[async_trait]
impl ReferenceData for YahooClient {
    async fn lookup(&self, symbol: &str) -> Result<InstrumentInfo, DataError> {
        let chart = self.chart(symbol, "1d").await?;
        let display_name = chart
            .meta
            .short_name
            .or(chart.meta.long_name)
            .filter(|name| !name.trim().is_empty());
        Ok(InstrumentInfo {
            symbol: chart.meta.symbol.unwrap_or_else(|| symbol.to_string()),
            display_name,
        })
    }
}

#[async_trait]
impl MarketData for YahooClient {
    async fn history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>, DataError> {
        if days == 0 {
            return Ok(Vec::new());
        }
        let chart = self.chart(symbol, &format!("{days}d")).await?;
        Ok(bars_from_chart(&chart))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    result: Option<Vec<ChartData>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn decode_chart(symbol: &str, body: &str) -> Result<ChartData, DataError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| DataError::Parse(format!("Yahoo chart for {symbol}: {e}")))?;

    if let Some(err) = response.chart.error {
        return if err.code.eq_ignore_ascii_case("not found") {
            Err(DataError::NotFound(format!("{symbol}: {}", err.description)))
        } else {
            Err(DataError::Parse(format!(
                "Yahoo error for {symbol}: {} {}",
                err.code, err.description
            )))
        };
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| DataError::NotFound(format!("No chart results for {symbol}")))
}

/// Zip the chart's parallel arrays into bars, skipping rows with missing prices.
fn bars_from_chart(chart: &ChartData) -> Vec<PriceBar> {
    let Some(quote) = chart.indicators.as_ref().and_then(|i| i.quote.first()) else {
        return Vec::new();
    };
    let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    chart
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts + chart.meta.gmtoffset, 0)?.date_naive();
            Some(PriceBar::new(
                date,
                at(&quote.open, i)?,
                at(&quote.high, i)?,
                at(&quote.low, i)?,
                at(&quote.close, i)?,
                at(&quote.volume, i).unwrap_or(0.0),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "shortName": "Apple Inc.", "gmtoffset": -14400},
                "timestamp": [1704292200, 1704378600, 1704465000],
                "indicators": {"quote": [{
                    "open": [184.2, 182.1, null],
                    "high": [185.9, 183.1, 182.8],
                    "low": [183.4, 180.9, 180.2],
                    "close": [184.25, 181.91, 181.18],
                    "volume": [58414500.0, 71983600.0, 62303300.0]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn decodes_meta_and_bars() {
        let chart = decode_chart("AAPL", CHART_BODY).unwrap();
        assert_eq!(chart.meta.short_name.as_deref(), Some("Apple Inc."));

        let bars = bars_from_chart(&chart);
        // third row has a null open and is skipped
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(bars[0].close, 184.25);
        assert_eq!(bars[1].volume, 71_983_600);
    }

    #[test]
    fn not_found_error_body_maps_to_not_found() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let err = decode_chart("ZZZZINVALID", body).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn other_error_body_is_not_not_found() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Bad Request", "description": "Invalid input"}}}"#;
        let err = decode_chart("AAPL", body).unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn garbage_body_is_parse_error() {
        let err = decode_chart("AAPL", "<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn chart_without_indicators_has_no_bars() {
        let body = r#"{"chart": {"result": [{"meta": {"symbol": "XYZ"}}], "error": null}}"#;
        let chart = decode_chart("XYZ", body).unwrap();
        assert!(bars_from_chart(&chart).is_empty());
    }

    #[test]
    fn chart_url_escapes_symbol() {
        let client = YahooClient::new(
            "https://query1.finance.yahoo.com",
            "tickwise-test",
            Duration::from_secs(1),
        )
        .unwrap();
        let url = client.chart_url("BRK.B").unwrap();
        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/BRK.B"
        );
        let url = client.chart_url("A/B").unwrap();
        assert!(url.as_str().ends_with("/chart/A%2FB"));
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let result = YahooClient::new("not a url", "ua", Duration::from_secs(1));
        assert!(matches!(result, Err(DataError::Config(_))));
    }
}
