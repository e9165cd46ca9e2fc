use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tickwise_models::{AgentKind, ContextEntry};

use crate::error::AgentError;
use crate::tools::ToolOutput;

/// Everything a reasoning engine sees for one task.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Names of the tools the agent ran before asking for a completion.
    pub tools: Vec<String>,
    pub instruction: String,
    pub expected_output: String,
    pub plan: Option<String>,
    pub tool_outputs: Vec<ToolOutput>,
    /// Upstream outputs in dependency-declaration order.
    pub context: Vec<ContextEntry>,
}

/// The language-model seam. Mockable for testing.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AgentError>;
}

/// Hands out the engine each agent kind should use.
///
/// The controller receives one of these explicitly; there is no ambient default.
pub trait EngineFactory: Send + Sync {
    fn engine_for(&self, kind: AgentKind) -> Arc<dyn ReasoningEngine>;
}
