/*! Event-driven simulation of fully-preemptive fixed-priority scheduling

The [Dispatcher] replays a periodic task set on a single processor and
records, for every completed job, the intervals during which it
executed. Time only advances from one event to the next: a job
release, or the projected completion of the running job. All events at
the same instant are applied before the next dispatching decision is
taken, so simultaneous releases never cause spurious preemptions.

The dispatcher is deterministic given its [ExecutionTimeSource]. It is
bounded by the simulation horizon, by an optional event budget, and it
polls an optional cancellation flag between event batches.
*/

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::error::{AnalysisError, AnalysisResult, Budget};
use crate::model::TaskSet;
use crate::time::{Duration, Instant};

mod event;
mod execution;
mod schedule;

use event::{EventKind, EventQueue};

pub use execution::{source_for, ExecutionTimeSource, Uniform, WorstCase};
pub use schedule::{Envelopes, ExecutionInterval, JobEnvelope, JobRecord, Schedule};

/// A released job that has not completed yet.
#[derive(Debug)]
struct PendingJob {
    instance: u64,
    release: Instant,
    demand: Duration,
    remaining: Duration,
    intervals: Vec<ExecutionInterval>,
    /// Start of the interval the job currently executes in.
    open_since: Option<Instant>,
}

impl PendingJob {
    fn new(instance: u64, release: Instant, demand: Duration) -> Self {
        PendingJob {
            instance,
            release,
            demand,
            remaining: demand,
            intervals: Vec::new(),
            open_since: None,
        }
    }

    /// Continue executing at `now`; an interval that ended exactly at
    /// `now` is reopened instead of starting a new one.
    fn resume(&mut self, now: Instant) {
        let start = match self.intervals.last() {
            Some(last) if last.end == now => self.intervals.pop().map_or(now, |i| i.start),
            _ => now,
        };
        self.open_since = Some(start);
    }

    fn suspend(&mut self, now: Instant) {
        if let Some(start) = self.open_since.take() {
            self.intervals.push(ExecutionInterval { start, end: now });
        }
    }

    fn into_record(mut self, now: Instant, relative_deadline: Duration) -> JobRecord {
        self.suspend(now);
        JobRecord {
            instance: self.instance,
            release: self.release,
            deadline: self.release + relative_deadline,
            execution_time: self.demand,
            intervals: self.intervals,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Running {
    task: usize,
    /// Last instant up to which `remaining` has been accounted.
    since: Instant,
    token: u64,
}

/// Simulates a [TaskSet] under fully-preemptive fixed-priority scheduling.
pub struct Dispatcher<'a, E: ExecutionTimeSource> {
    set: &'a TaskSet,
    execution: E,
    max_events: u64,
    cancel: Option<&'a AtomicBool>,
}

/// Mutable simulation state of one [Dispatcher::run].
struct State {
    ready: Vec<VecDeque<PendingJob>>,
    completed: Vec<Vec<JobRecord>>,
    next_instance: Vec<u64>,
    running: Option<Running>,
    tokens: u64,
}

impl<'a, E: ExecutionTimeSource> Dispatcher<'a, E> {
    pub fn new(set: &'a TaskSet, execution: E) -> Self {
        Dispatcher {
            set,
            execution,
            max_events: u64::MAX,
            cancel: None,
        }
    }

    /// Abort with [AnalysisError::ResourceExhausted] after `max_events` events.
    pub fn with_event_budget(mut self, max_events: u64) -> Self {
        self.max_events = max_events;
        self
    }

    /// Abort with [AnalysisError::Cancelled] once `flag` is raised.
    pub fn with_cancellation(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Dispatch jobs until `rounds` jobs of the lowest-priority task
    /// have completed or the next event lies beyond `horizon`.
    pub fn run(mut self, rounds: u64, horizon: Instant) -> AnalysisResult<Schedule> {
        let set = self.set;
        let n = set.len();
        let lowest = n - 1;
        let mut state = State {
            ready: (0..n).map(|_| VecDeque::new()).collect(),
            completed: vec![Vec::new(); n],
            next_instance: vec![0; n],
            running: None,
            tokens: 0,
        };
        if rounds == 0 {
            return Ok(Schedule::new(state.completed));
        }

        let mut events = EventQueue::default();
        for (i, t) in set.iter().enumerate() {
            if t.phase <= horizon {
                events.push(t.phase, EventKind::Release { task: i });
            }
        }

        let mut processed: u64 = 0;
        while let Some(now) = events.next_time() {
            if now > horizon {
                debug!(now, horizon, "simulation horizon reached");
                break;
            }
            if self.cancel.map_or(false, |f| f.load(Ordering::Relaxed)) {
                return Err(AnalysisError::Cancelled);
            }

            // account for the execution of the running job up to now
            if let Some(run) = state.running.as_mut() {
                if let Some(job) = state.ready[run.task].front_mut() {
                    job.remaining = job.remaining.saturating_sub(now - run.since);
                }
                run.since = now;
            }

            while let Some(event) = events.pop_at(now) {
                processed += 1;
                if processed > self.max_events {
                    return Err(AnalysisError::ResourceExhausted {
                        budget: Budget::Events,
                        limit: self.max_events,
                    });
                }
                match event.kind {
                    EventKind::Release { task } => {
                        let t = &set[task];
                        let k = state.next_instance[task];
                        state.next_instance[task] += 1;
                        let demand = self.execution.execution_time(t, k);
                        state.ready[task].push_back(PendingJob::new(k, t.release_of(k), demand));
                        let next = t.release_of(k + 1);
                        if next <= horizon {
                            events.push(next, EventKind::Release { task });
                        }
                    }
                    // completions are detected through the remaining demand
                    EventKind::Completion { token } => {
                        if state.running.map(|r| r.token) != Some(token) {
                            trace!(token, now, "stale completion after preemption");
                        }
                    }
                }
            }

            if let Some(run) = state.running {
                if state.ready[run.task].front().map_or(false, |j| j.remaining == 0) {
                    state.running = None;
                    if state.complete(set, run.task, now)
                        && run.task == lowest
                        && state.completed[lowest].len() as u64 >= rounds
                    {
                        return Ok(state.finish(now));
                    }
                }
            }

            if state.dispatch(set, now, lowest, rounds, &mut events) {
                return Ok(state.finish(now));
            }
        }

        debug!(jobs = state.completed.iter().map(Vec::len).sum::<usize>(), "event queue drained");
        Ok(Schedule::new(state.completed))
    }
}

impl State {
    /// Retire the front job of `task` at `now`.
    fn complete(&mut self, set: &TaskSet, task: usize, now: Instant) -> bool {
        match self.ready[task].pop_front() {
            Some(job) => {
                self.completed[task].push(job.into_record(now, set[task].deadline));
                true
            }
            None => false,
        }
    }

    /// Run the highest-priority pending job. Returns `true` once the
    /// lowest-priority task has completed enough jobs.
    fn dispatch(
        &mut self,
        set: &TaskSet,
        now: Instant,
        lowest: usize,
        rounds: u64,
        events: &mut EventQueue,
    ) -> bool {
        loop {
            // tasks are ordered by priority
            let best = match self.ready.iter().position(|q| !q.is_empty()) {
                Some(best) => best,
                None => return false,
            };
            if let Some(run) = self.running {
                if run.task == best {
                    return false;
                }
                // preemption
                if let Some(job) = self.ready[run.task].front_mut() {
                    job.suspend(now);
                }
                self.running = None;
            }

            let remaining = match self.ready[best].front_mut() {
                Some(job) => {
                    job.resume(now);
                    job.remaining
                }
                None => return false,
            };
            if remaining == 0 {
                // zero-demand jobs complete on the spot
                self.complete(set, best, now);
                if best == lowest && self.completed[lowest].len() as u64 >= rounds {
                    return true;
                }
                continue;
            }

            self.tokens += 1;
            self.running = Some(Running {
                task: best,
                since: now,
                token: self.tokens,
            });
            events.push(now + remaining, EventKind::Completion { token: self.tokens });
            return false;
        }
    }

    fn finish(self, now: Instant) -> Schedule {
        debug!(now, "lowest-priority task completed its rounds");
        Schedule::new(self.completed)
    }
}

#[cfg(test)]
mod tests;
