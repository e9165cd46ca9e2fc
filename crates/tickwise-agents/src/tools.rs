use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tickwise_data::{MarketData, WebSearch};
use tickwise_models::PriceSeries;
use tracing::{debug, info, warn};

/// Output of one tool invocation, handed to the reasoning engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutput {
    pub tool: String,
    pub payload: serde_json::Value,
}

/// The callable capabilities an agent may carry. Fixed at agent construction.
#[derive(Clone)]
pub enum Tool {
    PriceFetch {
        market: Arc<dyn MarketData>,
        days: u32,
    },
    WebSearch {
        search: Arc<dyn WebSearch>,
        limit: usize,
    },
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::PriceFetch { .. } => "Fetch Price Data Tool",
            Tool::WebSearch { .. } => "Web Search Tool",
        }
    }

    /// Run the tool for a ticker. Never fails: degraded results are reported
    /// inside the payload so the engine can account for missing data.
    pub async fn invoke(&self, symbol: &str) -> ToolOutput {
        let payload = match self {
            Tool::PriceFetch { market, days } => {
                match fetch_price_data(market.as_ref(), symbol, *days).await {
                    Some(series) => serde_json::to_value(&series).unwrap_or_else(|e| {
                        serde_json::json!({ "ticker": symbol, "error": e.to_string() })
                    }),
                    None => serde_json::json!({
                        "ticker": symbol,
                        "data": null,
                        "note": "No price data available",
                    }),
                }
            }
            Tool::WebSearch { search, limit } => {
                let query = format!("{symbol} stock news");
                match search.search(&query, *limit).await {
                    Ok(hits) => serde_json::json!({ "query": query, "results": hits }),
                    Err(e) => {
                        warn!(symbol, error = %e, "Web search failed");
                        serde_json::json!({
                            "query": query,
                            "results": [],
                            "note": "Web search unavailable",
                        })
                    }
                }
            }
        };

        ToolOutput {
            tool: self.name().to_string(),
            payload,
        }
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::PriceFetch { days, .. } => f.debug_struct("PriceFetch").field("days", days).finish(),
            Tool::WebSearch { limit, .. } => {
                f.debug_struct("WebSearch").field("limit", limit).finish()
            }
        }
    }
}

/// Fetch `days` of daily bars and summarise the closes.
///
/// Empty history and any fetch failure both yield `None`: a missing price
/// series degrades the analysis, it does not abort it.
pub async fn fetch_price_data(
    market: &dyn MarketData,
    symbol: &str,
    days: u32,
) -> Option<PriceSeries> {
    info!(symbol, days, "Fetching price data");

    match market.history(symbol, days).await {
        Ok(bars) => {
            let series = PriceSeries::from_bars(symbol, bars);
            match &series {
                Some(s) => debug!(
                    symbol,
                    bars = s.data.len(),
                    latest_close = s.latest_close(),
                    "Price data ready"
                ),
                None => warn!(symbol, "No price data found"),
            }
            series
        }
        Err(e) => {
            warn!(symbol, error = %e, "Error fetching price data");
            None
        }
    }
}
