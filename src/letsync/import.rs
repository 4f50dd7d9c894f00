use std::collections::HashMap;

use tracing::debug;

use super::schema::{Dependency, LetSystem};
use super::SYSTEM_TASK;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::model::{CauseEffectChain, Task, TaskId, TaskSet};
use crate::time::gcd;

/// A LET system translated into the internal model.
#[derive(Debug, Clone)]
pub struct ImportedSystem {
    /// The tasks of the system plus the synthetic system task.
    pub tasks: TaskSet,
    /// One chain per event chain, in store order.
    pub chains: Vec<CauseEffectChain>,
    /// Task names, indexed by task id.
    names: Vec<String>,
}

impl ImportedSystem {
    /// The name of the task with index `task`.
    pub fn name_of(&self, task: usize) -> &str {
        let id = self.tasks[task].id.0 as usize;
        self.names.get(id).map_or(SYSTEM_TASK, String::as_str)
    }

    /// The index of the task called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let id = self.names.iter().position(|n| n == name)?;
        self.tasks.index_of(TaskId(id as u32))
    }
}

/// Translate a LET system description.
///
/// Tasks are prioritized in `TaskStore` order. The system task
/// (id 0) runs before all of them with a period equal to the GCD of all
/// periods. Tasks with a non-zero activation offset are rejected
/// before anything else is looked at.
pub fn import(system: &LetSystem, config: &AnalysisConfig) -> AnalysisResult<ImportedSystem> {
    if let Some(t) = system.tasks.iter().find(|t| t.activation_offset != 0.0) {
        return Err(AnalysisError::unsupported(format!(
            "task {} has activation offset {}; only zero activation offsets are supported",
            t.name, t.activation_offset
        )));
    }
    config.validate()?;
    if system.tasks.is_empty() {
        return Err(AnalysisError::unsupported("the TaskStore is empty"));
    }

    let mut names = vec![SYSTEM_TASK.to_string()];
    let mut tasks = Vec::with_capacity(system.tasks.len() + 1);
    for t in &system.tasks {
        if names.contains(&t.name) {
            return Err(AnalysisError::unsupported(format!(
                "task name {} is not unique",
                t.name
            )));
        }
        let id = names.len() as u32;
        let task = Task::new(
            id,
            config.to_ticks(t.initial_offset)?,
            config.to_ticks(t.bcet)?,
            config.to_ticks(t.wcet)?,
            config.to_ticks(t.period)?,
            id,
        )
        .with_deadline(config.to_ticks(t.duration)?);
        names.push(t.name.clone());
        tasks.push(task);
    }
    let system_period = tasks.iter().map(|t| t.period).fold(0, gcd);
    tasks.push(Task::system(0, system_period));
    let tasks = TaskSet::new(tasks)?;

    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .filter_map(|(id, name)| Some((name.as_str(), tasks.index_of(TaskId(id as u32))?)))
        .collect();
    let resolve = |task: &str| {
        index
            .get(task)
            .copied()
            .ok_or_else(|| AnalysisError::unsupported(format!("unknown task {}", task)))
    };

    let dependencies: HashMap<&str, &Dependency> = system
        .dependencies
        .iter()
        .map(|d| (d.name.as_str(), d))
        .collect();
    for d in &system.dependencies {
        resolve(&d.source.task)?;
        resolve(&d.destination.task)?;
    }

    let mut chains = Vec::with_capacity(system.event_chains.len());
    for (k, ec) in system.event_chains.iter().enumerate() {
        let segments = ec.link.segments();
        let first = segments[0];
        let mut path = vec![resolve(&first.source.task)?];
        let mut previous = &first.source.task;
        for segment in segments {
            if !dependencies.contains_key(segment.name.as_str()) {
                return Err(AnalysisError::unsupported(format!(
                    "event chain {} uses unknown dependency {}",
                    ec.name, segment.name
                )));
            }
            if &segment.source.task != previous {
                return Err(AnalysisError::unsupported(format!(
                    "event chain {} is not contiguous at dependency {}",
                    ec.name, segment.name
                )));
            }
            path.push(resolve(&segment.destination.task)?);
            previous = &segment.destination.task;
        }
        debug!(chain = %ec.name, tasks = path.len(), "event chain imported");
        chains.push(CauseEffectChain::new(k as u32, path, &tasks)?);
    }

    Ok(ImportedSystem {
        tasks,
        chains,
        names,
    })
}
