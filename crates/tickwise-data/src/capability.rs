//! Capability interfaces consumed by the analysis core.
//!
//! Each trait is object-safe so the core can hold `Arc<dyn ...>` handles and
//! tests can substitute stubs.

use async_trait::async_trait;
use tickwise_models::{InstrumentInfo, PriceBar, SearchHit};

use crate::error::DataError;

/// Reference metadata for a symbol. Used to decide whether a ticker exists.
#[async_trait]
pub trait ReferenceData: Send + Sync {
    /// Fails with [`DataError::NotFound`] when the provider does not know the symbol.
    async fn lookup(&self, symbol: &str) -> Result<InstrumentInfo, DataError>;
}

/// Daily OHLCV history.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Bars ordered oldest first. An unknown symbol may yield an empty vector.
    async fn history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>, DataError>;
}

/// Web search used by the news agent.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, DataError>;
}
