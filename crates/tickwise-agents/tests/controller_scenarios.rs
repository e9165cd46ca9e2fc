//! Controller contract: validation gating and `(success, error)` mapping.

use std::sync::Arc;

use tickwise_agents::test_support::{
    CountingAgentFactory, StubReferenceData, StubRunner, StubValidator,
};
use tickwise_agents::{Controller, TickerValidator, Validator};
use tickwise_data::DataError;

fn controller(
    validator: Arc<dyn TickerValidator>,
    factory: &Arc<CountingAgentFactory>,
    runner: &Arc<StubRunner>,
) -> Controller {
    Controller::new(validator, factory.clone(), runner.clone())
}

#[tokio::test]
async fn known_ticker_succeeds() {
    let factory = Arc::new(CountingAgentFactory::default());
    let runner = Arc::new(StubRunner::succeeding());
    let validator = Arc::new(Validator::new(Arc::new(StubReferenceData::found("Apple Inc."))));

    let outcome = controller(validator, &factory, &runner).analyze("AAPL").await;

    assert_eq!(outcome.into_parts(), (true, None));
    assert_eq!(factory.builds(), 1);
    assert_eq!(runner.subjects(), vec!["AAPL"]);
}

#[tokio::test]
async fn empty_ticker_is_rejected_before_any_work() {
    let factory = Arc::new(CountingAgentFactory::default());
    let runner = Arc::new(StubRunner::succeeding());
    let reference = Arc::new(StubReferenceData::found("Apple Inc."));
    let validator = Arc::new(Validator::new(reference.clone()));

    let outcome = controller(validator, &factory, &runner).analyze("").await;

    assert_eq!(
        outcome.into_parts(),
        (
            false,
            Some("Ticker symbol must be a non-empty string.".to_string())
        )
    );
    assert_eq!(reference.calls(), 0);
    assert_eq!(factory.builds(), 0);
    assert_eq!(runner.runs(), 0);
}

#[tokio::test]
async fn unknown_ticker_is_rejected_before_any_work() {
    let factory = Arc::new(CountingAgentFactory::default());
    let runner = Arc::new(StubRunner::succeeding());
    let validator = Arc::new(Validator::new(Arc::new(StubReferenceData::not_found())));

    let outcome = controller(validator, &factory, &runner)
        .analyze("ZZZZINVALID")
        .await;

    assert_eq!(
        outcome.into_parts(),
        (
            false,
            Some("Ticker symbol 'ZZZZINVALID' does not exist.".to_string())
        )
    );
    assert_eq!(factory.builds(), 0);
    assert_eq!(runner.runs(), 0);
}

#[tokio::test]
async fn provider_outage_asks_to_retry() {
    let factory = Arc::new(CountingAgentFactory::default());
    let runner = Arc::new(StubRunner::succeeding());
    let validator = Arc::new(Validator::new(Arc::new(StubReferenceData::failing(
        DataError::Status {
            status: 503,
            message: "unavailable".to_string(),
        },
    ))));

    let (success, error) = controller(validator, &factory, &runner)
        .analyze("AAPL")
        .await
        .into_parts();

    assert!(!success);
    assert_eq!(
        error.as_deref(),
        Some("Error validating ticker 'AAPL'. Please try again.")
    );
    assert_eq!(runner.runs(), 0);
}

#[tokio::test]
async fn stub_rejection_gates_construction() {
    let factory = Arc::new(CountingAgentFactory::default());
    let runner = Arc::new(StubRunner::succeeding());
    let validator = Arc::new(StubValidator::rejecting("nope"));

    let outcome = controller(validator.clone(), &factory, &runner)
        .analyze("AAPL")
        .await;

    assert_eq!(outcome.error.as_deref(), Some("nope"));
    assert!(outcome.result.is_none());
    assert_eq!(validator.calls(), 1);
    assert_eq!(factory.builds(), 0);
    assert_eq!(runner.runs(), 0);
}

#[tokio::test]
async fn independent_analyses_can_run_concurrently() {
    let factory = Arc::new(CountingAgentFactory::default());
    let runner = Arc::new(StubRunner::succeeding());
    let controller = Arc::new(controller(
        Arc::new(StubValidator::accepting()),
        &factory,
        &runner,
    ));

    let handles: Vec<_> = ["AAPL", "MSFT", "NVDA"]
        .into_iter()
        .map(|symbol| {
            let controller = controller.clone();
            tokio::spawn(async move { controller.analyze(symbol).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().success());
    }
    assert_eq!(factory.builds(), 3);
    let mut subjects = runner.subjects();
    subjects.sort();
    assert_eq!(subjects, vec!["AAPL", "MSFT", "NVDA"]);
}
