use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tickwise_models::{ContextEntry, TaskId, TaskOutput};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::TaskRequest;
use crate::engine::ReasoningEngine;
use crate::error::PipelineError;
use crate::parser::parse_plan;
use crate::prompts::planning_request;
use crate::task::Pipeline;

/// Runs a pipeline to completion. Mockable for testing.
#[async_trait]
pub trait PipelineRunner: Send + Sync {
    /// Execute every task and return the terminal task's output.
    async fn run(&self, pipeline: Pipeline) -> Result<TaskOutput, PipelineError>;
}

/// Drives a pipeline's tasks in dependency order, one at a time.
pub struct Orchestrator {
    task_timeout: Duration,
    planner: Option<Arc<dyn ReasoningEngine>>,
}

impl Orchestrator {
    pub fn new(task_timeout: Duration) -> Self {
        Self {
            task_timeout,
            planner: None,
        }
    }

    /// Ask `planner` for per-task notes before each run.
    pub fn with_planner(mut self, planner: Arc<dyn ReasoningEngine>) -> Self {
        self.planner = Some(planner);
        self
    }

    /// Annotate tasks with plan notes. Planning never reorders tasks, and a
    /// failed plan leaves the run unannotated.
    async fn plan(&self, pipeline: &Pipeline, order: &[usize]) -> HashMap<TaskId, String> {
        let Some(planner) = &self.planner else {
            return HashMap::new();
        };

        let steps: Vec<(TaskId, String, String)> = order
            .iter()
            .map(|&i| {
                let task = &pipeline.tasks()[i];
                (
                    task.id().clone(),
                    task.agent().role().to_string(),
                    task.description().to_string(),
                )
            })
            .collect();
        let request = planning_request(pipeline.subject(), &steps);

        let reply = match tokio::time::timeout(self.task_timeout, planner.complete(&request)).await
        {
            Ok(reply) => reply,
            Err(_) => {
                warn!(subject = %pipeline.subject(), "Planner timed out, running without a plan");
                return HashMap::new();
            }
        };

        match reply.and_then(|raw| parse_plan(&raw)) {
            Ok(plan) => {
                debug!(notes = plan.len(), "Plan ready");
                plan
            }
            Err(e) => {
                warn!(subject = %pipeline.subject(), error = %e, "Planning failed, running without a plan");
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl PipelineRunner for Orchestrator {
    async fn run(&self, pipeline: Pipeline) -> Result<TaskOutput, PipelineError> {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let order = pipeline.execution_order()?;
        info!(%run_id, subject = %pipeline.subject(), tasks = order.len(), "Starting pipeline");

        let mut plan = self.plan(&pipeline, &order).await;
        let mut outputs: HashMap<TaskId, TaskOutput> = HashMap::with_capacity(order.len());
        let mut terminal: Option<TaskId> = None;

        for &i in &order {
            let task = &pipeline.tasks()[i];

            let context = task
                .dependencies()
                .iter()
                .map(|dep| {
                    outputs
                        .get(dep)
                        .cloned()
                        .map(|payload| ContextEntry {
                            source: dep.clone(),
                            payload,
                        })
                        .ok_or_else(|| PipelineError::UnknownDependency {
                            task: task.id().clone(),
                            dependency: dep.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let request = TaskRequest {
                task: task.id().clone(),
                subject: pipeline.subject().to_string(),
                instruction: task.description().to_string(),
                expected_output: task.expected_output().to_string(),
                plan: plan.remove(task.id()),
                context,
            };

            let task_start = Instant::now();
            info!(%run_id, task = %task.id(), agent = %task.agent().role(), "Running task");

            let output =
                match tokio::time::timeout(self.task_timeout, task.agent().perform(&request)).await
                {
                    Ok(Ok(output)) => output,
                    Ok(Err(source)) => {
                        warn!(%run_id, task = %task.id(), error = %source, "Task failed");
                        return Err(PipelineError::TaskFailed {
                            task: task.id().clone(),
                            source,
                        });
                    }
                    Err(_) => {
                        warn!(%run_id, task = %task.id(), "Task timed out");
                        return Err(PipelineError::TaskTimedOut {
                            task: task.id().clone(),
                            seconds: self.task_timeout.as_secs(),
                        });
                    }
                };

            info!(
                %run_id,
                task = %task.id(),
                elapsed_ms = task_start.elapsed().as_millis(),
                "Task complete"
            );
            outputs.insert(task.id().clone(), output);
            terminal = Some(task.id().clone());
        }

        let result = terminal
            .and_then(|id| outputs.remove(&id))
            .ok_or(PipelineError::Empty)?;

        info!(
            %run_id,
            subject = %pipeline.subject(),
            elapsed_ms = start.elapsed().as_millis(),
            "Pipeline complete"
        );
        Ok(result)
    }
}
