use std::sync::Arc;

use async_trait::async_trait;
use tickwise_models::{AgentKind, ContextEntry, ProfileConfig, TaskId, TaskOutput};
use tracing::debug;

use crate::engine::{CompletionRequest, ReasoningEngine};
use crate::error::AgentError;
use crate::parser::parse_task_output;
use crate::prompts;
use crate::tools::Tool;

/// What an agent receives when the orchestrator hands it a task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRequest {
    pub task: TaskId,
    /// The ticker under analysis.
    pub subject: String,
    pub instruction: String,
    pub expected_output: String,
    pub plan: Option<String>,
    /// Upstream outputs in dependency-declaration order.
    pub context: Vec<ContextEntry>,
}

/// Trait for task-performing agents. Mockable for testing.
#[async_trait]
pub trait Agent: Send + Sync {
    fn role(&self) -> &str;

    async fn perform(&self, request: &TaskRequest) -> Result<TaskOutput, AgentError>;
}

/// Role, goal and persona of one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub kind: AgentKind,
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentProfile {
    pub fn default_for(kind: AgentKind) -> Self {
        Self {
            kind,
            role: prompts::default_role(kind).to_string(),
            goal: prompts::default_goal(kind).to_string(),
            backstory: prompts::backstory(kind),
        }
    }

    /// Apply a configured override of role and goal.
    pub fn with_overrides(mut self, overrides: Option<&ProfileConfig>) -> Self {
        if let Some(o) = overrides {
            if let Some(role) = &o.role {
                self.role = role.clone();
            }
            if let Some(goal) = &o.goal {
                self.goal = goal.clone();
            }
        }
        self
    }

    fn validate(&self) -> Result<(), AgentError> {
        if self.role.trim().is_empty() {
            return Err(AgentError::Config(format!("{} agent has an empty role", self.kind)));
        }
        if self.goal.trim().is_empty() {
            return Err(AgentError::Config(format!("{} agent has an empty goal", self.kind)));
        }
        Ok(())
    }
}

/// An agent that runs its tools and then asks its reasoning engine to complete the task.
pub struct CapabilityAgent {
    profile: AgentProfile,
    tools: Vec<Tool>,
    engine: Arc<dyn ReasoningEngine>,
}

impl CapabilityAgent {
    pub fn new(
        profile: AgentProfile,
        tools: Vec<Tool>,
        engine: Arc<dyn ReasoningEngine>,
    ) -> Result<Self, AgentError> {
        profile.validate()?;
        Ok(Self {
            profile,
            tools,
            engine,
        })
    }

    fn structured_output(&self) -> bool {
        self.profile.kind == AgentKind::Recommendation
    }
}

#[async_trait]
impl Agent for CapabilityAgent {
    fn role(&self) -> &str {
        &self.profile.role
    }

    async fn perform(&self, request: &TaskRequest) -> Result<TaskOutput, AgentError> {
        let mut tool_outputs = Vec::with_capacity(self.tools.len());
        for tool in &self.tools {
            debug!(role = %self.profile.role, tool = tool.name(), "Running tool");
            tool_outputs.push(tool.invoke(&request.subject).await);
        }

        let completion = CompletionRequest {
            role: self.profile.role.clone(),
            goal: self.profile.goal.clone(),
            backstory: self.profile.backstory.clone(),
            tools: self.tools.iter().map(|t| t.name().to_string()).collect(),
            instruction: request.instruction.clone(),
            expected_output: request.expected_output.clone(),
            plan: request.plan.clone(),
            tool_outputs,
            context: request.context.clone(),
        };

        let raw = self.engine.complete(&completion).await?;
        if raw.trim().is_empty() {
            return Err(AgentError::Engine(format!(
                "{} returned an empty completion",
                self.profile.role
            )));
        }
        Ok(parse_task_output(&raw, self.structured_output()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_bars, ScriptedEngine, StubMarketData};

    fn request(context: Vec<ContextEntry>) -> TaskRequest {
        TaskRequest {
            task: TaskId::from("price"),
            subject: "AAPL".to_string(),
            instruction: "Fetch recent price data for AAPL.".to_string(),
            expected_output: "A summary of price data.".to_string(),
            plan: None,
            context,
        }
    }

    #[test]
    fn overrides_replace_role_and_goal() {
        let profile = AgentProfile::default_for(AgentKind::Price).with_overrides(Some(
            &ProfileConfig {
                kind: AgentKind::Price,
                role: Some("Custom Analyst".to_string()),
                goal: Some("Custom goal".to_string()),
                model: None,
            },
        ));
        assert_eq!(profile.role, "Custom Analyst");
        assert_eq!(profile.goal, "Custom goal");
        assert_eq!(profile.backstory, prompts::backstory(AgentKind::Price));
    }

    #[test]
    fn empty_role_is_rejected_at_construction() {
        let mut profile = AgentProfile::default_for(AgentKind::News);
        profile.role = "  ".to_string();
        let result = CapabilityAgent::new(profile, vec![], Arc::new(ScriptedEngine::echo()));
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[tokio::test]
    async fn perform_runs_tools_then_engine() {
        let engine = Arc::new(ScriptedEngine::echo());
        let market = Arc::new(StubMarketData::with_bars(sample_bars(&[10.0, 12.0])));
        let agent = CapabilityAgent::new(
            AgentProfile::default_for(AgentKind::Price),
            vec![Tool::PriceFetch {
                market: market.clone(),
                days: 30,
            }],
            engine.clone(),
        )
        .unwrap();

        let output = agent.perform(&request(vec![])).await.unwrap();

        assert_eq!(output, TaskOutput::Text("Price Analyst done".to_string()));
        assert_eq!(market.calls(), 1);
        let seen = engine.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tools, vec!["Fetch Price Data Tool".to_string()]);
        assert_eq!(seen[0].tool_outputs[0].payload["moving_average"], 11.0);
    }

    #[tokio::test]
    async fn recommendation_output_is_structured() {
        let engine = Arc::new(ScriptedEngine::replying(
            "```json\n{\"ticker\": \"AAPL\", \"action\": \"Hold\", \"explanation\": \"Flat\", \"references\": []}\n```",
        ));
        let agent = CapabilityAgent::new(
            AgentProfile::default_for(AgentKind::Recommendation),
            vec![],
            engine,
        )
        .unwrap();

        let output = agent.perform(&request(vec![])).await.unwrap();
        assert_eq!(output.as_json().unwrap()["action"], "Hold");
    }

    #[tokio::test]
    async fn engine_failure_propagates() {
        let agent = CapabilityAgent::new(
            AgentProfile::default_for(AgentKind::Sentiment),
            vec![],
            Arc::new(ScriptedEngine::failing("model overloaded")),
        )
        .unwrap();

        let result = agent.perform(&request(vec![])).await;
        assert!(matches!(result, Err(AgentError::Engine(_))));
    }

    #[tokio::test]
    async fn blank_completion_is_an_error() {
        let agent = CapabilityAgent::new(
            AgentProfile::default_for(AgentKind::Sentiment),
            vec![],
            Arc::new(ScriptedEngine::replying("   ")),
        )
        .unwrap();
        assert!(agent.perform(&request(vec![])).await.is_err());
    }

    #[tokio::test]
    async fn context_is_forwarded_to_engine() {
        let engine = Arc::new(ScriptedEngine::echo());
        let agent = CapabilityAgent::new(
            AgentProfile::default_for(AgentKind::Sentiment),
            vec![],
            engine.clone(),
        )
        .unwrap();
        let context = vec![ContextEntry {
            source: TaskId::from("news"),
            payload: TaskOutput::Text("Three upbeat articles".to_string()),
        }];

        agent.perform(&request(context.clone())).await.unwrap();
        assert_eq!(engine.requests()[0].context, context);
    }
}
