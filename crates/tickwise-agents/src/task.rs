use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use tickwise_models::TaskId;

use crate::agent::Agent;
use crate::error::PipelineError;

/// One immutable unit of work.
#[derive(Clone)]
pub struct TaskDescriptor {
    id: TaskId,
    description: String,
    expected_output: String,
    agent: Arc<dyn Agent>,
    dependencies: Vec<TaskId>,
}

impl TaskDescriptor {
    pub fn new(
        id: impl Into<TaskId>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<dyn Agent>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            dependencies: Vec::new(),
        }
    }

    /// Declare `upstream` as a dependency. Its output becomes part of this
    /// task's context, in the order dependencies are declared.
    pub fn after(mut self, upstream: &TaskDescriptor) -> Self {
        self.dependencies.push(upstream.id.clone());
        self
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }
}

impl fmt::Debug for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDescriptor")
            .field("id", &self.id)
            .field("agent", &self.agent.role())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// A set of tasks about one subject, forming a dependency DAG.
#[derive(Debug, Clone)]
pub struct Pipeline {
    subject: String,
    tasks: Vec<TaskDescriptor>,
}

impl Pipeline {
    pub fn new(subject: impl Into<String>, tasks: Vec<TaskDescriptor>) -> Self {
        Self {
            subject: subject.into(),
            tasks,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    /// Resolve a topological execution order as indices into [`Pipeline::tasks`].
    ///
    /// Kahn's algorithm; among tasks that are ready at the same time the one
    /// declared first runs first, so the order is deterministic.
    pub fn execution_order(&self) -> Result<Vec<usize>, PipelineError> {
        if self.tasks.is_empty() {
            return Err(PipelineError::Empty);
        }

        let mut index: HashMap<&TaskId, usize> = HashMap::with_capacity(self.tasks.len());
        for (i, task) in self.tasks.iter().enumerate() {
            if index.insert(task.id(), i).is_some() {
                return Err(PipelineError::DuplicateTask(task.id().clone()));
            }
        }

        let mut pending = vec![0usize; self.tasks.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.tasks.len()];
        for (i, task) in self.tasks.iter().enumerate() {
            for dep in task.dependencies() {
                let &d = index.get(dep).ok_or_else(|| PipelineError::UnknownDependency {
                    task: task.id().clone(),
                    dependency: dep.clone(),
                })?;
                pending[i] += 1;
                dependents[d].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = (0..self.tasks.len()).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(self.tasks.len());

        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &dependent in &dependents[next] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != self.tasks.len() {
            let stuck = (0..self.tasks.len())
                .filter(|&i| pending[i] > 0)
                .map(|i| self.tasks[i].id().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(PipelineError::Cycle(stuck));
        }

        Ok(order)
    }

    /// Task ids in execution order.
    pub fn execution_ids(&self) -> Result<Vec<TaskId>, PipelineError> {
        Ok(self
            .execution_order()?
            .into_iter()
            .map(|i| self.tasks[i].id().clone())
            .collect())
    }
}
