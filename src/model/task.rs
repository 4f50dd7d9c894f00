use derive_more::{Display, From, Into};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::time::{Duration, Instant};

/// Unique identifier of a task within a task set.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(pub u32);

/// Distinguishes real workload from the synthetic task that models
/// system-level inputs and outputs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskKind {
    #[default]
    Regular,
    /// Zero-cost boundary task; exempt from the WCET check.
    System,
}

/// A periodic task with fixed priority and constrained deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Release offset of the first job.
    pub phase: Instant,
    pub bcet: Duration,
    pub wcet: Duration,
    pub period: Duration,
    /// Relative deadline.
    pub deadline: Duration,
    /// Lower values are scheduled first.
    pub priority: u32,
    /// Communication task between ECUs.
    pub message: bool,
    #[serde(default)]
    pub kind: TaskKind,
    /// Filled in by the TDA.
    #[serde(default)]
    pub response_time: Option<Duration>,
}

impl Task {
    /// A regular, non-message task with implicit deadline.
    pub fn new(
        id: u32,
        phase: Instant,
        bcet: Duration,
        wcet: Duration,
        period: Duration,
        priority: u32,
    ) -> Self {
        Task {
            id: TaskId(id),
            phase,
            bcet,
            wcet,
            period,
            deadline: period,
            priority,
            message: false,
            kind: TaskKind::Regular,
            response_time: None,
        }
    }

    /// The synthetic zero-cost task that stands for system inputs and
    /// outputs. It always runs first.
    pub fn system(id: u32, period: Duration) -> Self {
        Task {
            kind: TaskKind::System,
            ..Task::new(id, 0, 0, 0, period, 0)
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn as_message(mut self) -> Self {
        self.message = true;
        self
    }

    pub fn is_system(&self) -> bool {
        self.kind == TaskKind::System
    }

    /// Release time of the `k`-th job.
    pub fn release_of(&self, k: u64) -> Instant {
        self.phase + k * self.period
    }

    /// Absolute deadline of the `k`-th job.
    pub fn absolute_deadline_of(&self, k: u64) -> Instant {
        self.release_of(k) + self.deadline
    }

    /// The response-time bound, which must have been computed already.
    pub fn response_time_bound(&self) -> AnalysisResult<Duration> {
        self.response_time
            .ok_or(AnalysisError::MissingResponseTime { task: self.id })
    }

    /// Whether `self` is scheduled before `other`.
    pub fn has_higher_priority_than(&self, other: &Task) -> bool {
        self.priority < other.priority
    }
}

/// A set of tasks on one processor, kept in priority order.
///
/// Chains refer to tasks by their index in this set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSet {
    tasks: Vec<Task>,
}

impl TaskSet {
    /// Validate the tasks and order them by priority.
    pub fn new(mut tasks: Vec<Task>) -> AnalysisResult<Self> {
        if tasks.is_empty() {
            return Err(AnalysisError::unsupported("empty task set"));
        }
        for t in &tasks {
            if t.period == 0 {
                return Err(AnalysisError::unsupported(format!(
                    "task {} has a period of zero",
                    t.id
                )));
            }
            if t.bcet > t.wcet {
                return Err(AnalysisError::unsupported(format!(
                    "task {} has BCET {} above WCET {}",
                    t.id, t.bcet, t.wcet
                )));
            }
            if t.deadline > t.period {
                return Err(AnalysisError::unsupported(format!(
                    "task {} has deadline {} beyond its period {}",
                    t.id, t.deadline, t.period
                )));
            }
        }
        if let Some(id) = tasks.iter().map(|t| t.id).duplicates().next() {
            return Err(AnalysisError::unsupported(format!("duplicate task id {}", id)));
        }
        if let Some(p) = tasks.iter().map(|t| t.priority).duplicates().next() {
            return Err(AnalysisError::unsupported(format!("duplicate priority {}", p)));
        }
        tasks.sort_by_key(|t| t.priority);
        Ok(TaskSet { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// All tasks with strictly higher priority than the one at `index`.
    pub fn higher_priority(&self, index: usize) -> &[Task] {
        &self.tasks[..index]
    }

    /// The task scheduled last.
    pub fn lowest_priority(&self) -> &Task {
        // non-empty by construction
        &self.tasks[self.tasks.len() - 1]
    }

    pub fn max_phase(&self) -> Instant {
        self.tasks.iter().map(|t| t.phase).max().unwrap_or(0)
    }

    pub fn max_period(&self) -> Duration {
        self.tasks.iter().map(|t| t.period).max().unwrap_or(0)
    }

    /// A copy of the set with every phase set to zero, i.e., with a
    /// synchronous release of all tasks at time 0.
    pub fn synchronous(&self) -> TaskSet {
        TaskSet {
            tasks: self
                .tasks
                .iter()
                .map(|t| Task {
                    phase: 0,
                    ..t.clone()
                })
                .collect(),
        }
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }
}

impl std::ops::Index<usize> for TaskSet {
    type Output = Task;

    fn index(&self, index: usize) -> &Task {
        &self.tasks[index]
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
