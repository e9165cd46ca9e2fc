use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reference metadata for a listed instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InstrumentInfo {
    pub symbol: String,
    /// Short display name (e.g. "Apple Inc."). Providers may omit it.
    pub display_name: Option<String>,
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Build a bar from raw provider values. Volume is truncated to an integer.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume: volume.max(0.0).trunc() as u64,
        }
    }
}

/// Daily bars for a symbol plus summary statistics over the closes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSeries {
    pub ticker: String,
    pub data: Vec<PriceBar>,
    /// Arithmetic mean of the closing prices.
    pub moving_average: f64,
    /// Sample standard deviation of the closing prices.
    pub volatility: f64,
}

impl PriceSeries {
    /// Summarise a bar series. Returns `None` when there are no bars.
    pub fn from_bars(ticker: &str, bars: Vec<PriceBar>) -> Option<Self> {
        if bars.is_empty() {
            return None;
        }
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        Some(Self {
            ticker: ticker.to_string(),
            moving_average: mean(&closes),
            volatility: sample_std_dev(&closes),
            data: bars,
        })
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.data.last().map(|b| b.close)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bessel-corrected (n - 1) standard deviation. Zero for fewer than two values.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// One web search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
