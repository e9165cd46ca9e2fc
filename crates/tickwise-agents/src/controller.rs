//! Top-level entry point: validate, gate, run, and map the outcome.

use std::sync::Arc;
use std::time::Instant;

use tickwise_models::{Recommendation, TaskOutput};
use tracing::{error, info, warn};

use crate::orchestrator::PipelineRunner;
use crate::stock::{build_stock_pipeline, AgentFactory};
use crate::validation::TickerValidator;

/// Result of one analysis, safe to hand to any front end.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub symbol: String,
    /// Terminal payload. Present only on success.
    pub result: Option<TaskOutput>,
    pub error: Option<String>,
}

impl AnalysisOutcome {
    fn succeeded(symbol: String, result: TaskOutput) -> Self {
        Self {
            symbol,
            result: Some(result),
            error: None,
        }
    }

    fn failed(symbol: String, error: String) -> Self {
        Self {
            symbol,
            result: None,
            error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// The recommendation carried by a successful result, if it is well formed.
    pub fn recommendation(&self) -> Option<Recommendation> {
        self.result.as_ref().and_then(Recommendation::from_output)
    }

    /// `(success, error)`, dropping the payload.
    pub fn into_parts(self) -> (bool, Option<String>) {
        (self.error.is_none(), self.error)
    }
}

pub struct Controller {
    validator: Arc<dyn TickerValidator>,
    agents: Arc<dyn AgentFactory>,
    runner: Arc<dyn PipelineRunner>,
}

impl Controller {
    pub fn new(
        validator: Arc<dyn TickerValidator>,
        agents: Arc<dyn AgentFactory>,
        runner: Arc<dyn PipelineRunner>,
    ) -> Self {
        Self {
            validator,
            agents,
            runner,
        }
    }

    /// Analyze one ticker. Never fails; every error is folded into the outcome.
    ///
    /// Nothing past validation runs for an invalid ticker: no agents are built
    /// and the runner is never called.
    pub async fn analyze(&self, symbol: &str) -> AnalysisOutcome {
        let validation = self.validator.validate(symbol).await;
        if !validation.is_valid() {
            let message = validation
                .error()
                .unwrap_or("Ticker validation failed.")
                .to_string();
            warn!(symbol, error = %message, "Ticker rejected");
            return AnalysisOutcome::failed(validation.symbol().to_string(), message);
        }

        let symbol = validation.symbol().to_string();
        info!(
            symbol = %symbol,
            name = validation.display_name().unwrap_or(symbol.as_str()),
            "Ticker validated"
        );
        let start = Instant::now();

        let agents = match self.agents.build(&symbol) {
            Ok(agents) => agents,
            Err(e) => {
                error!(symbol = %symbol, error = ?e, "Failed to construct agents");
                return AnalysisOutcome::failed(
                    symbol.clone(),
                    format!("Error analyzing ticker {symbol}: {e}"),
                );
            }
        };

        let pipeline = build_stock_pipeline(&symbol, &agents);
        match self.runner.run(pipeline).await {
            Ok(result) => {
                info!(
                    symbol = %symbol,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Analysis complete"
                );
                match Recommendation::from_output(&result) {
                    Some(rec) => info!(
                        symbol = %symbol,
                        action = ?rec.action,
                        explanation = %rec.explanation,
                        "Recommendation"
                    ),
                    None => warn!(symbol = %symbol, "Terminal output is not a structured recommendation"),
                }
                AnalysisOutcome::succeeded(symbol, result)
            }
            Err(e) => {
                let stage = e.task().map(|t| t.to_string());
                error!(
                    symbol = %symbol,
                    stage = stage.as_deref().unwrap_or("-"),
                    error = ?e,
                    "Analysis failed"
                );
                AnalysisOutcome::failed(
                    symbol.clone(),
                    format!("Error analyzing ticker {symbol}: {e}"),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingAgentFactory, StubRunner, StubValidator};
    use crate::validation::EMPTY_SYMBOL_ERROR;

    fn controller(
        validator: StubValidator,
        factory: &Arc<CountingAgentFactory>,
        runner: &Arc<StubRunner>,
    ) -> Controller {
        Controller::new(Arc::new(validator), factory.clone(), runner.clone())
    }

    #[tokio::test]
    async fn invalid_ticker_short_circuits() {
        let factory = Arc::new(CountingAgentFactory::default());
        let runner = Arc::new(StubRunner::succeeding());
        let outcome = controller(StubValidator::rejecting(EMPTY_SYMBOL_ERROR), &factory, &runner)
            .analyze("")
            .await;

        assert_eq!(
            outcome.into_parts(),
            (false, Some(EMPTY_SYMBOL_ERROR.to_string()))
        );
        assert_eq!(factory.builds(), 0);
        assert_eq!(runner.runs(), 0);
    }

    #[tokio::test]
    async fn valid_ticker_runs_pipeline() {
        let factory = Arc::new(CountingAgentFactory::default());
        let runner = Arc::new(StubRunner::succeeding());
        let outcome = controller(StubValidator::accepting(), &factory, &runner)
            .analyze("aapl")
            .await;

        assert!(outcome.success());
        assert_eq!(outcome.symbol, "AAPL");
        assert_eq!(outcome.recommendation().map(|r| r.ticker), Some("AAPL".to_string()));
        assert_eq!(outcome.into_parts(), (true, None));
        assert_eq!(factory.builds(), 1);
        assert_eq!(runner.runs(), 1);
        assert_eq!(runner.subjects(), vec!["AAPL"]);
    }

    #[tokio::test]
    async fn runner_failure_is_summarised() {
        let factory = Arc::new(CountingAgentFactory::default());
        let runner = Arc::new(StubRunner::failing_at("sentiment"));
        let outcome = controller(StubValidator::accepting(), &factory, &runner)
            .analyze("MSFT")
            .await;

        let (success, error) = outcome.into_parts();
        assert!(!success);
        let error = error.unwrap();
        assert!(error.starts_with("Error analyzing ticker MSFT: "), "{error}");
        assert!(error.contains("sentiment"), "{error}");
    }

    #[tokio::test]
    async fn factory_failure_is_summarised_without_running() {
        let factory = Arc::new(CountingAgentFactory::failing("empty role"));
        let runner = Arc::new(StubRunner::succeeding());
        let outcome = controller(StubValidator::accepting(), &factory, &runner)
            .analyze("MSFT")
            .await;

        assert!(!outcome.success());
        assert!(outcome
            .error
            .as_deref()
            .unwrap()
            .starts_with("Error analyzing ticker MSFT: "));
        assert_eq!(runner.runs(), 0);
    }
}
