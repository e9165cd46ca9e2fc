//! Stub collaborators for exercising the pipeline without network or CLI access.
//!
//! Every stub records how it was called so tests can assert on gating and
//! ordering, not just on results.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tickwise_data::{DataError, MarketData, ReferenceData, WebSearch};
use tickwise_models::{
    normalize_symbol, AgentKind, InstrumentInfo, PriceBar, SearchHit, TaskId, TaskOutput,
    ValidationResult,
};

use crate::agent::{Agent, TaskRequest};
use crate::engine::{CompletionRequest, EngineFactory, ReasoningEngine};
use crate::error::{AgentError, PipelineError};
use crate::orchestrator::PipelineRunner;
use crate::stock::{AgentFactory, StockAgents};
use crate::task::Pipeline;
use crate::validation::{TickerValidator, EMPTY_SYMBOL_ERROR};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Daily bars starting 2023-01-01 with the given closes.
pub fn sample_bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            PriceBar::new(
                start + Days::new(i as u64),
                close - 1.0,
                close + 2.0,
                close - 2.0,
                close,
                1_000_000.0,
            )
        })
        .collect()
}

pub struct StubReferenceData {
    reply: Result<InstrumentInfo, DataError>,
    lookups: Mutex<Vec<String>>,
}

impl StubReferenceData {
    fn new(reply: Result<InstrumentInfo, DataError>) -> Self {
        Self {
            reply,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn found(name: &str) -> Self {
        Self::new(Ok(InstrumentInfo {
            symbol: String::new(),
            display_name: Some(name.to_string()),
        }))
    }

    pub fn found_without_name() -> Self {
        Self::new(Ok(InstrumentInfo::default()))
    }

    pub fn not_found() -> Self {
        Self::new(Err(DataError::NotFound("No data found".to_string())))
    }

    pub fn failing(error: DataError) -> Self {
        Self::new(Err(error))
    }

    pub fn lookups(&self) -> Vec<String> {
        lock(&self.lookups).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.lookups).len()
    }
}

#[async_trait]
impl ReferenceData for StubReferenceData {
    async fn lookup(&self, symbol: &str) -> Result<InstrumentInfo, DataError> {
        lock(&self.lookups).push(symbol.to_string());
        self.reply.clone().map(|mut info| {
            info.symbol = symbol.to_string();
            info
        })
    }
}

pub struct StubMarketData {
    reply: Result<Vec<PriceBar>, DataError>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl StubMarketData {
    pub fn with_bars(bars: Vec<PriceBar>) -> Self {
        Self {
            reply: Ok(bars),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: DataError) -> Self {
        Self {
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last_days(&self) -> Option<u32> {
        lock(&self.requests).last().map(|(_, days)| *days)
    }
}

#[async_trait]
impl MarketData for StubMarketData {
    async fn history(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>, DataError> {
        lock(&self.requests).push((symbol.to_string(), days));
        self.reply.clone()
    }
}

pub struct StubSearch {
    hits: Option<usize>,
    queries: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn with_hits(count: usize) -> Self {
        Self {
            hits: Some(count),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, DataError> {
        lock(&self.queries).push(query.to_string());
        let Some(count) = self.hits else {
            return Err(DataError::Status {
                status: 429,
                message: "rate limited".to_string(),
            });
        };
        Ok((1..=count.min(limit))
            .map(|i| SearchHit {
                title: format!("Headline {i} for {query}"),
                url: format!("https://news.example.com/{i}"),
                snippet: format!("Snippet {i}"),
            })
            .collect())
    }
}

enum Script {
    Echo,
    Reply(String),
    Fail(String),
}

/// Engine with a fixed reply that records every request it receives.
pub struct ScriptedEngine {
    script: Script,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedEngine {
    fn new(script: Script) -> Self {
        Self {
            script,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies `"{role} done"`.
    pub fn echo() -> Self {
        Self::new(Script::Echo)
    }

    pub fn replying(reply: &str) -> Self {
        Self::new(Script::Reply(reply.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Script::Fail(message.to_string()))
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AgentError> {
        lock(&self.requests).push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Echo => Ok(format!("{} done", request.role)),
            Script::Reply(reply) => Ok(reply.clone()),
            Script::Fail(message) => Err(AgentError::Engine(message.clone())),
        }
    }
}

/// Hands the same engine to every agent kind and records which kinds asked.
pub struct StaticEngineFactory {
    engine: Arc<ScriptedEngine>,
    kinds: Mutex<Vec<AgentKind>>,
}

impl StaticEngineFactory {
    pub fn new(engine: Arc<ScriptedEngine>) -> Self {
        Self {
            engine,
            kinds: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(Arc::new(ScriptedEngine::echo()))
    }

    pub fn kinds(&self) -> Vec<AgentKind> {
        lock(&self.kinds).clone()
    }
}

impl EngineFactory for StaticEngineFactory {
    fn engine_for(&self, kind: AgentKind) -> Arc<dyn ReasoningEngine> {
        lock(&self.kinds).push(kind);
        self.engine.clone()
    }
}

/// Shared record of the order in which agents ran.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    pub fn record(&self, entry: &str) {
        lock(&self.entries).push(entry.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }
}

/// Agent that replies `"{id} output"` and records requests.
pub struct RecordingAgent {
    id: String,
    fail: bool,
    delay: Option<Duration>,
    log: Option<ExecutionLog>,
    requests: Mutex<Vec<TaskRequest>>,
}

impl RecordingAgent {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            fail: false,
            delay: None,
            log: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(id: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(id)
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn logging_to(mut self, log: ExecutionLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn requests(&self) -> Vec<TaskRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl Agent for RecordingAgent {
    fn role(&self) -> &str {
        &self.id
    }

    async fn perform(&self, request: &TaskRequest) -> Result<TaskOutput, AgentError> {
        lock(&self.requests).push(request.clone());
        if let Some(log) = &self.log {
            log.record(&self.id);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AgentError::Engine(format!("{} failed", self.id)));
        }
        Ok(TaskOutput::Text(format!("{} output", self.id)))
    }
}

/// A structured recommendation payload for `symbol`.
pub fn sample_recommendation(symbol: &str) -> TaskOutput {
    TaskOutput::Structured(serde_json::json!({
        "ticker": symbol,
        "action": "Buy",
        "explanation": "Steady uptrend with positive coverage.",
        "references": ["https://news.example.com/1"],
    }))
}

/// Four recording agents named after their stages, all logging to one log.
pub fn recording_agents() -> (StockAgents, ExecutionLog) {
    let log = ExecutionLog::default();
    let agent = |id: &str| -> Arc<dyn Agent> {
        Arc::new(RecordingAgent::new(id).logging_to(log.clone()))
    };
    let agents = StockAgents {
        price: agent("price"),
        news: agent("news"),
        sentiment: agent("sentiment"),
        recommendation: agent("recommendation"),
    };
    (agents, log)
}

/// Counts how many agent sets were built.
#[derive(Default)]
pub struct CountingAgentFactory {
    failure: Option<String>,
    builds: Mutex<usize>,
}

impl CountingAgentFactory {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            builds: Mutex::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        *lock(&self.builds)
    }
}

impl AgentFactory for CountingAgentFactory {
    fn build(&self, _symbol: &str) -> Result<StockAgents, AgentError> {
        *lock(&self.builds) += 1;
        if let Some(message) = &self.failure {
            return Err(AgentError::Config(message.clone()));
        }
        Ok(recording_agents().0)
    }
}

/// Validator with a fixed verdict.
pub struct StubValidator {
    rejection: Option<String>,
    calls: Mutex<usize>,
}

impl StubValidator {
    /// Accepts any non-empty input, normalised the same way as the real validator.
    pub fn accepting() -> Self {
        Self {
            rejection: None,
            calls: Mutex::new(0),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            rejection: Some(message.to_string()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }
}

#[async_trait]
impl TickerValidator for StubValidator {
    async fn validate(&self, symbol: &str) -> ValidationResult {
        *lock(&self.calls) += 1;
        if let Some(message) = &self.rejection {
            return ValidationResult::invalid(symbol, message.clone());
        }
        match normalize_symbol(symbol) {
            Some(symbol) => ValidationResult::valid(symbol.clone(), symbol),
            None => ValidationResult::invalid(symbol, EMPTY_SYMBOL_ERROR),
        }
    }
}

/// Runner that never executes tasks: it succeeds with a recommendation for the
/// pipeline's subject or fails at a named task.
pub struct StubRunner {
    failing_task: Option<TaskId>,
    subjects: Mutex<Vec<String>>,
}

impl StubRunner {
    pub fn succeeding() -> Self {
        Self {
            failing_task: None,
            subjects: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_at(task: &str) -> Self {
        Self {
            failing_task: Some(TaskId::from(task)),
            subjects: Mutex::new(Vec::new()),
        }
    }

    pub fn runs(&self) -> usize {
        lock(&self.subjects).len()
    }

    pub fn subjects(&self) -> Vec<String> {
        lock(&self.subjects).clone()
    }
}

#[async_trait]
impl PipelineRunner for StubRunner {
    async fn run(&self, pipeline: Pipeline) -> Result<TaskOutput, PipelineError> {
        lock(&self.subjects).push(pipeline.subject().to_string());
        match &self.failing_task {
            Some(task) => Err(PipelineError::TaskFailed {
                task: task.clone(),
                source: AgentError::Engine("stub failure".to_string()),
            }),
            None => Ok(sample_recommendation(pipeline.subject())),
        }
    }
}
