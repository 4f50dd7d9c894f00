use auto_impl::auto_impl;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{AnalysisConfig, ExecutionModel};
use crate::model::Task;
use crate::time::Duration;

/// The source of per-job execution demand.
///
/// The dispatcher asks exactly once per released job, in release
/// order, so a deterministic source yields a reproducible schedule.
#[auto_impl(&mut, Box)]
pub trait ExecutionTimeSource {
    /// The execution demand of job `instance` of `task`, within
    /// `[task.bcet, task.wcet]`.
    fn execution_time(&mut self, task: &Task, instance: u64) -> Duration;
}

/// Every job runs for its full WCET.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstCase;

impl ExecutionTimeSource for WorstCase {
    fn execution_time(&mut self, task: &Task, _instance: u64) -> Duration {
        task.wcet
    }
}

/// Execution demand drawn uniformly from `[bcet, wcet]`.
#[derive(Debug, Clone)]
pub struct Uniform {
    rng: StdRng,
}

impl Uniform {
    pub fn seeded(seed: u64) -> Self {
        Uniform {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ExecutionTimeSource for Uniform {
    fn execution_time(&mut self, task: &Task, _instance: u64) -> Duration {
        if task.bcet >= task.wcet {
            task.wcet
        } else {
            self.rng.random_range(task.bcet..=task.wcet)
        }
    }
}

/// The execution-time source selected by `config`.
pub fn source_for(config: &AnalysisConfig) -> Box<dyn ExecutionTimeSource> {
    match config.execution {
        ExecutionModel::WorstCase => Box::new(WorstCase),
        ExecutionModel::Uniform => Box::new(Uniform::seeded(config.seed)),
    }
}
