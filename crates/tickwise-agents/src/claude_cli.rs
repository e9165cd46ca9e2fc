use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tickwise_models::{AgentKind, AgentsConfig};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::engine::{CompletionRequest, EngineFactory, ReasoningEngine};
use crate::error::AgentError;
use crate::prompts::{render_system_prompt, render_user_prompt};

/// Configuration for a Claude CLI invocation.
#[derive(Debug, Clone)]
pub struct ClaudeCliConfig {
    pub model: String,
    pub timeout: Duration,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-latest".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Invoke the `claude` CLI with a system prompt and user prompt.
/// Returns the raw stdout text.
pub async fn invoke_claude(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<String, AgentError> {
    debug!(model = %config.model, "Invoking claude CLI");

    let result = tokio::time::timeout(config.timeout, async {
        Command::new("claude")
            .args([
                "-p",
                user_prompt,
                "--system-prompt",
                system_prompt,
                "--model",
                &config.model,
                "--output-format",
                "text",
            ])
            .kill_on_drop(true)
            .output()
            .await
    })
    .await
    .map_err(|_| AgentError::Timeout(config.timeout.as_secs()))?
    .map_err(|e| AgentError::Cli(format!("Failed to spawn claude: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        warn!(status = %result.status, stderr = %stderr, "Claude CLI failed");
        return Err(AgentError::Cli(format!(
            "claude exited {}: {}",
            result.status, stderr
        )));
    }

    let stdout = String::from_utf8_lossy(&result.stdout).to_string();
    if stdout.trim().is_empty() {
        return Err(AgentError::Cli("Claude returned empty response".to_string()));
    }

    Ok(stdout)
}

/// Check if the `claude` CLI is available on the system.
pub async fn check_cli_available() -> bool {
    match Command::new("claude").arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// Reasoning engine that shells out to the `claude` CLI.
#[derive(Debug, Clone)]
pub struct ClaudeCliEngine {
    config: ClaudeCliConfig,
}

impl ClaudeCliEngine {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            config: ClaudeCliConfig {
                model: model.into(),
                timeout,
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ReasoningEngine for ClaudeCliEngine {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AgentError> {
        let system_prompt = render_system_prompt(request);
        let user_prompt = render_user_prompt(request);
        invoke_claude(&system_prompt, &user_prompt, &self.config).await
    }
}

/// One CLI engine per agent kind, using the configured model for that kind.
#[derive(Debug, Clone)]
pub struct ClaudeEngineFactory {
    config: AgentsConfig,
}

impl ClaudeEngineFactory {
    pub fn new(config: AgentsConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.task_timeout_seconds)
    }

    /// Engine for the optional planning step.
    pub fn planner(&self) -> Arc<dyn ReasoningEngine> {
        Arc::new(ClaudeCliEngine::new(self.config.planner_model(), self.timeout()))
    }
}

impl EngineFactory for ClaudeEngineFactory {
    fn engine_for(&self, kind: AgentKind) -> Arc<dyn ReasoningEngine> {
        Arc::new(ClaudeCliEngine::new(self.config.model_for(kind), self.timeout()))
    }
}
