use thiserror::Error;

use crate::model::{ChainId, TaskId};
use crate::time::Duration;

/// The simulation budget that was exhausted.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Budget {
    /// The hyperperiod does not fit into the time representation.
    Hyperperiod,
    /// The simulation horizon exceeds the configured maximum.
    Horizon,
    /// The estimated number of jobs exceeds the configured maximum.
    Jobs,
    /// The dispatcher processed more events than allowed.
    Events,
}

impl std::fmt::Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match self {
            Budget::Hyperperiod => "hyperperiod",
            Budget::Horizon => "horizon",
            Budget::Jobs => "job",
            Budget::Events => "event",
        };
        f.write_str(what)
    }
}

/// Error type returned by the analyses, the dispatcher, and the LET adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A regular task without any execution demand.
    #[error("task {task} has a WCET of zero")]
    DegenerateTask { task: TaskId },

    /// The response-time recurrence exceeded the deadline before converging.
    #[error("task {task} is unschedulable: response time exceeds deadline {deadline}")]
    Unschedulable { task: TaskId, deadline: Duration },

    /// A horizon, job, or event budget was exceeded.
    #[error("{budget} budget exhausted (limit {limit})")]
    ResourceExhausted { budget: Budget, limit: u64 },

    /// Structurally invalid or unsupported input.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// The synchronous-release bound fell below the simulated reaction time.
    #[error("chain {chain}: synchronous bound {kloda} is below the exact reaction time {exact}")]
    InvariantViolation {
        chain: ChainId,
        kloda: Duration,
        exact: Duration,
    },

    /// A chain analysis ran before the TDA assigned a response time.
    #[error("task {task} has no response-time bound")]
    MissingResponseTime { task: TaskId },

    /// The cancellation flag was raised.
    #[error("analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        AnalysisError::UnsupportedInput(msg.into())
    }

    /// Errors after which only the offending task set is discarded.
    pub fn discards_task_set(&self) -> bool {
        matches!(
            self,
            AnalysisError::DegenerateTask { .. } | AnalysisError::Unschedulable { .. }
        )
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
