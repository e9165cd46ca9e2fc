use std::sync::Arc;

use async_trait::async_trait;
use tickwise_data::ReferenceData;
use tickwise_models::{normalize_symbol, ValidationResult};
use tracing::{debug, info};

pub const EMPTY_SYMBOL_ERROR: &str = "Ticker symbol must be a non-empty string.";

/// Decides whether a ticker is real before any costly work starts.
#[async_trait]
pub trait TickerValidator: Send + Sync {
    /// Never fails: every input maps to a [`ValidationResult`].
    async fn validate(&self, symbol: &str) -> ValidationResult;

    /// Validate input that may be absent altogether.
    async fn validate_input(&self, symbol: Option<&str>) -> ValidationResult {
        match symbol {
            Some(symbol) => self.validate(symbol).await,
            None => ValidationResult::invalid("", EMPTY_SYMBOL_ERROR),
        }
    }
}

/// Validator backed by a reference-data provider.
pub struct Validator {
    reference: Arc<dyn ReferenceData>,
}

impl Validator {
    pub fn new(reference: Arc<dyn ReferenceData>) -> Self {
        Self { reference }
    }
}

#[async_trait]
impl TickerValidator for Validator {
    async fn validate(&self, symbol: &str) -> ValidationResult {
        let Some(symbol) = normalize_symbol(symbol) else {
            return ValidationResult::invalid(symbol, EMPTY_SYMBOL_ERROR);
        };

        info!(symbol = %symbol, "Validating ticker symbol");

        match self.reference.lookup(&symbol).await {
            Ok(info) => {
                let name = info
                    .display_name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| symbol.clone());
                ValidationResult::valid(symbol, name)
            }
            Err(e) if e.is_not_found() => {
                debug!(symbol = %symbol, error = %e, "Ticker not found");
                let message = format!("Ticker symbol '{symbol}' does not exist.");
                ValidationResult::invalid(symbol, message)
            }
            Err(e) => {
                debug!(symbol = %symbol, error = ?e, "Error validating ticker");
                let message = format!("Error validating ticker '{symbol}'. Please try again.");
                ValidationResult::invalid(symbol, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubReferenceData;
    use tickwise_data::DataError;

    #[tokio::test]
    async fn valid_ticker_uses_display_name() {
        let reference = Arc::new(StubReferenceData::found("Test Company"));
        let validator = Validator::new(reference.clone());

        let result = validator.validate("AAPL").await;

        assert!(result.is_valid());
        assert_eq!(result.symbol(), "AAPL");
        assert_eq!(result.display_name(), Some("Test Company"));
        assert!(result.error().is_none());
        assert_eq!(reference.lookups(), vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn missing_display_name_falls_back_to_symbol() {
        let validator = Validator::new(Arc::new(StubReferenceData::found_without_name()));

        let result = validator.validate("XYZ").await;

        assert!(result.is_valid());
        assert_eq!(result.display_name(), Some("XYZ"));
    }

    #[tokio::test]
    async fn not_found_reports_nonexistent_symbol() {
        let validator = Validator::new(Arc::new(StubReferenceData::not_found()));

        let result = validator.validate("INVALID").await;

        assert!(!result.is_valid());
        assert_eq!(result.symbol(), "INVALID");
        assert!(result.display_name().is_none());
        assert_eq!(
            result.error(),
            Some("Ticker symbol 'INVALID' does not exist.")
        );
    }

    #[tokio::test]
    async fn other_failures_ask_to_retry() {
        let validator = Validator::new(Arc::new(StubReferenceData::failing(
            DataError::Network("timed out".to_string()),
        )));

        let result = validator.validate("AAPL").await;

        assert!(!result.is_valid());
        assert_eq!(
            result.error(),
            Some("Error validating ticker 'AAPL'. Please try again.")
        );
    }

    #[tokio::test]
    async fn empty_input_never_reaches_provider() {
        let reference = Arc::new(StubReferenceData::found("Test Company"));
        let validator = Validator::new(reference.clone());

        for input in ["", "   "] {
            let result = validator.validate(input).await;
            assert!(!result.is_valid());
            assert!(result.display_name().is_none());
            assert_eq!(result.error(), Some(EMPTY_SYMBOL_ERROR));
        }
        let absent = validator.validate_input(None).await;
        assert_eq!(absent.error(), Some(EMPTY_SYMBOL_ERROR));
        assert_eq!(absent.symbol(), "");

        assert_eq!(reference.calls(), 0);
    }

    #[tokio::test]
    async fn input_is_trimmed_and_uppercased_before_lookup() {
        let reference = Arc::new(StubReferenceData::found("Apple Inc."));
        let validator = Validator::new(reference.clone());

        let result = validator.validate(" aapl ").await;

        assert_eq!(result.symbol(), "AAPL");
        assert_eq!(reference.lookups(), vec!["AAPL".to_string()]);
    }
}
