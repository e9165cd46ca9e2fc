pub mod agent;
pub mod claude_cli;
pub mod controller;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod stock;
pub mod task;
pub mod tools;
pub mod validation;

pub mod test_support;

pub use agent::{Agent, AgentProfile, CapabilityAgent, TaskRequest};
pub use claude_cli::{ClaudeCliEngine, ClaudeEngineFactory};
pub use controller::{AnalysisOutcome, Controller};
pub use engine::{CompletionRequest, EngineFactory, ReasoningEngine};
pub use error::{AgentError, PipelineError};
pub use orchestrator::{Orchestrator, PipelineRunner};
pub use stock::{build_stock_pipeline, AgentFactory, CapabilityAgentFactory, StockAgents};
pub use task::{Pipeline, TaskDescriptor};
pub use tools::{fetch_price_data, Tool, ToolOutput};
pub use validation::{TickerValidator, Validator};
