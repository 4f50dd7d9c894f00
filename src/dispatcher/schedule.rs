use serde::Serialize;

use crate::time::{Duration, Instant};

/// A half-open interval `[start, end)` during which a job occupied the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionInterval {
    pub start: Instant,
    pub end: Instant,
}

impl ExecutionInterval {
    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// A completed job as observed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub instance: u64,
    pub release: Instant,
    /// Absolute deadline.
    pub deadline: Instant,
    /// The demand drawn for this job.
    pub execution_time: Duration,
    /// Non-empty; more than one interval only if the job was preempted.
    pub intervals: Vec<ExecutionInterval>,
}

impl JobRecord {
    /// First instant at which the job ran (its read instant).
    pub fn start(&self) -> Instant {
        self.intervals.first().map_or(self.release, |i| i.start)
    }

    /// Completion instant (its publish instant).
    pub fn end(&self) -> Instant {
        self.intervals.last().map_or(self.release, |i| i.end)
    }

    pub fn envelope(&self) -> JobEnvelope {
        JobEnvelope {
            instance: self.instance,
            release: self.release,
            start: self.start(),
            end: self.end(),
        }
    }

    pub fn missed_deadline(&self) -> bool {
        self.end() > self.deadline
    }
}

/// The outer bounds of a job's execution: it reads its inputs at
/// `start` and publishes its outputs at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobEnvelope {
    pub instance: u64,
    pub release: Instant,
    pub start: Instant,
    pub end: Instant,
}

/// Per task (by index in the task set), the completed jobs in instance order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Schedule {
    jobs: Vec<Vec<JobRecord>>,
}

impl Schedule {
    pub(super) fn new(jobs: Vec<Vec<JobRecord>>) -> Self {
        Schedule { jobs }
    }

    /// Completed jobs of the task with index `task`.
    pub fn jobs(&self, task: usize) -> &[JobRecord] {
        self.jobs.get(task).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The envelope view consumed by the latency analyses.
    pub fn envelopes(&self) -> Envelopes {
        Envelopes {
            per_task: self
                .jobs
                .iter()
                .map(|jobs| jobs.iter().map(JobRecord::envelope).collect())
                .collect(),
        }
    }

    pub fn job_count(&self) -> usize {
        self.jobs.iter().map(Vec::len).sum()
    }

    /// Number of completed jobs that finished after their deadline.
    pub fn deadline_misses(&self) -> usize {
        self.jobs
            .iter()
            .flatten()
            .filter(|j| j.missed_deadline())
            .count()
    }

    /// Fraction of completed jobs that missed their deadline.
    pub fn miss_ratio(&self) -> f64 {
        match self.job_count() {
            0 => 0.0,
            n => self.deadline_misses() as f64 / n as f64,
        }
    }

    /// The non-empty execution intervals of all tasks, sorted by start
    /// time. Zero-demand jobs occupy no processor time and are left out.
    pub fn timeline(&self) -> Vec<(usize, ExecutionInterval)> {
        let mut all: Vec<_> = self
            .jobs
            .iter()
            .enumerate()
            .flat_map(|(task, jobs)| {
                jobs.iter()
                    .flat_map(move |j| j.intervals.iter().map(move |i| (task, *i)))
            })
            .filter(|(_, i)| i.length() > 0)
            .collect();
        all.sort_by_key(|(task, i)| (i.start, i.end, *task));
        all
    }
}

/// Job envelopes per task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelopes {
    per_task: Vec<Vec<JobEnvelope>>,
}

impl Envelopes {
    /// Envelopes of the task with index `task`, in instance order.
    pub fn task(&self, task: usize) -> &[JobEnvelope] {
        self.per_task.get(task).map(Vec::as_slice).unwrap_or(&[])
    }
}
