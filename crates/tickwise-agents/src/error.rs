use thiserror::Error;
use tickwise_models::TaskId;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Reasoning engine error: {0}")]
    Engine(String),

    #[error("Agent response parse error: {0}")]
    Parse(String),

    #[error("Agent timed out after {0} seconds")]
    Timeout(u64),

    #[error("Agent configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline has no tasks")]
    Empty,

    #[error("Duplicate task id: {0}")]
    DuplicateTask(TaskId),

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: TaskId, dependency: TaskId },

    #[error("Dependency cycle among tasks: {0}")]
    Cycle(String),

    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        task: TaskId,
        #[source]
        source: AgentError,
    },

    #[error("Task '{task}' timed out after {seconds} seconds")]
    TaskTimedOut { task: TaskId, seconds: u64 },
}

impl PipelineError {
    /// The task a failure originated from, if it came from execution.
    pub fn task(&self) -> Option<&TaskId> {
        match self {
            PipelineError::TaskFailed { task, .. } | PipelineError::TaskTimedOut { task, .. } => {
                Some(task)
            }
            PipelineError::UnknownDependency { task, .. } => Some(task),
            PipelineError::DuplicateTask(task) => Some(task),
            PipelineError::Empty | PipelineError::Cycle(_) => None,
        }
    }
}
