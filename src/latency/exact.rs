/*! Latencies observed in a simulated schedule

Jobs read at the start of their first execution interval and publish
at the end of their last one, so all walks operate on job envelopes
and link consecutive tasks with the rules of [crate::linker].
*/

use std::ops::RangeInclusive;

use crate::dispatcher::{Envelopes, JobEnvelope};
use crate::horizon::Horizon;
use crate::linker::{consumer_of, producer_of};
use crate::model::CauseEffectChain;
use crate::time::{Duration, Instant};

/// Follow the data of `job` (of the chain's first task) forward to the
/// first job of the last task that observes it.
fn forward(chain: &CauseEffectChain, envelopes: &Envelopes, job: &JobEnvelope) -> Option<JobEnvelope> {
    chain.task_indices()[1..]
        .iter()
        .try_fold(*job, |cur, next| {
            let jobs = envelopes.task(*next);
            consumer_of(jobs, &cur).map(|j| jobs[j])
        })
}

/// Follow the data read by `job` (of the chain's last task) back to
/// the job of the first task that produced it.
fn backward(chain: &CauseEffectChain, envelopes: &Envelopes, job: &JobEnvelope) -> Option<JobEnvelope> {
    let tasks = chain.task_indices();
    tasks[..tasks.len() - 1]
        .iter()
        .rev()
        .try_fold(*job, |cur, prev| {
            let jobs = envelopes.task(*prev);
            producer_of(jobs, &cur).map(|j| jobs[j])
        })
}

/// Maximum reaction time over all complete forward job chains that
/// start with a job of the first task released within `window`: from
/// that release until the first job of the last task that is affected
/// by it completes.
///
/// Returns `None` if no such job chain completes within the schedule.
pub fn reaction_time_within(
    chain: &CauseEffectChain,
    envelopes: &Envelopes,
    window: RangeInclusive<Instant>,
) -> Option<Duration> {
    envelopes
        .task(chain.first())
        .iter()
        .filter(|job| window.contains(&job.release))
        .filter_map(|job| forward(chain, envelopes, job).map(|last| last.end - job.release))
        .max()
}

/// Maximum reaction time over the whole schedule.
pub fn reaction_time(chain: &CauseEffectChain, envelopes: &Envelopes) -> Option<Duration> {
    reaction_time_within(chain, envelopes, 0..=Instant::MAX)
}

/// Maximum reaction time over the first-task jobs released in the
/// first hyperperiod after the largest phase.
///
/// Jobs released before all tasks have started see a partial system
/// and are not considered.
pub fn steady_state_reaction_time(
    chain: &CauseEffectChain,
    envelopes: &Envelopes,
    horizon: &Horizon,
) -> Option<Duration> {
    reaction_time_within(chain, envelopes, horizon.steady_state())
}

/// Maximum data age over all backward job chains that end in a job
/// of the last task released within `window`.
///
/// The data read by job `m` of the last task is in use until job
/// `m + 1` publishes its replacement, so the age is measured from the
/// release of the producing job of the first task until the end of
/// job `m + 1`.
pub fn data_age_within(
    chain: &CauseEffectChain,
    envelopes: &Envelopes,
    window: RangeInclusive<Instant>,
) -> Option<Duration> {
    envelopes
        .task(chain.last())
        .windows(2)
        .filter(|pair| window.contains(&pair[0].release))
        .filter_map(|pair| {
            backward(chain, envelopes, &pair[0]).map(|first| pair[1].end - first.release)
        })
        .max()
}

/// Maximum data age over the whole schedule.
pub fn data_age(chain: &CauseEffectChain, envelopes: &Envelopes) -> Option<Duration> {
    data_age_within(chain, envelopes, 0..=Instant::MAX)
}

/// Maximum data age over the steady-state window that starts one
/// hyperperiod after the largest phase and spans `span`, typically
/// the chain's pessimistic bound.
///
/// This window is expected, but not known, to contain the maximum.
pub fn reduced_data_age(
    chain: &CauseEffectChain,
    envelopes: &Envelopes,
    horizon: &Horizon,
    span: Duration,
) -> Option<Duration> {
    let start = horizon.max_phase + horizon.hyperperiod;
    data_age_within(chain, envelopes, start..=start.saturating_add(span))
}
