use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a task within one pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The single value a task produces once executed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TaskOutput {
    Structured(serde_json::Value),
    Text(String),
}

impl TaskOutput {
    /// Text rendering used when the output is handed to a reasoning engine.
    pub fn render(&self) -> String {
        match self {
            TaskOutput::Text(text) => text.clone(),
            TaskOutput::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            TaskOutput::Structured(value) => Some(value),
            TaskOutput::Text(_) => None,
        }
    }
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// An upstream task's output as seen by a downstream task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextEntry {
    pub source: TaskId,
    pub payload: TaskOutput,
}
