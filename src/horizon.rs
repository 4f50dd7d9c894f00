/*! Hyperperiod and simulation horizon

The dispatcher only needs to simulate a finite window: two full
hyperperiods after the largest phase, plus the longest chain latency
(so that every job chain starting in steady state completes), plus one
maximum period.
*/

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult, Budget};
use crate::model::TaskSet;
use crate::time::{checked_lcm, divide_with_ceil, Duration, Instant};

/// The simulation window of one task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Horizon {
    pub hyperperiod: Duration,
    pub max_phase: Instant,
    pub max_period: Duration,
    pub max_e2e_latency: Duration,
    /// End of the simulated window.
    pub length: Instant,
    /// Number of jobs of the lowest-priority task to dispatch.
    pub rounds: u64,
}

impl Horizon {
    /// Releases in the first hyperperiod after the largest phase, the
    /// point from which every task has started.
    pub fn steady_state(&self) -> RangeInclusive<Instant> {
        self.max_phase..=self.max_phase + self.hyperperiod
    }
}

/// The least common multiple of all task periods.
pub fn hyperperiod(set: &TaskSet) -> AnalysisResult<Duration> {
    set.iter().try_fold(1, |h, t| {
        checked_lcm(h, t.period).ok_or(AnalysisError::ResourceExhausted {
            budget: Budget::Hyperperiod,
            limit: u64::MAX,
        })
    })
}

/// Derive the simulation window of `set`, where `max_e2e_latency` is
/// the largest pessimistic chain bound of the set.
///
/// Fails with [AnalysisError::ResourceExhausted] if the window or the
/// number of jobs in it exceeds the configured budgets.
pub fn horizon(
    set: &TaskSet,
    max_e2e_latency: Duration,
    config: &AnalysisConfig,
) -> AnalysisResult<Horizon> {
    let exhausted = |budget, limit| AnalysisError::ResourceExhausted { budget, limit };

    let hyperperiod = hyperperiod(set)?;
    let max_phase = set.max_phase();
    let max_period = set.max_period();
    let length = hyperperiod
        .checked_mul(2)
        .and_then(|l| l.checked_add(max_phase))
        .and_then(|l| l.checked_add(max_e2e_latency))
        .and_then(|l| l.checked_add(max_period))
        .ok_or_else(|| exhausted(Budget::Horizon, config.max_horizon))?;
    if length > config.max_horizon {
        return Err(exhausted(Budget::Horizon, config.max_horizon));
    }

    let jobs: u64 = set.iter().map(|t| divide_with_ceil(length, t.period)).sum();
    if jobs > config.max_jobs {
        return Err(exhausted(Budget::Jobs, config.max_jobs));
    }

    Ok(Horizon {
        hyperperiod,
        max_phase,
        max_period,
        max_e2e_latency,
        length,
        rounds: divide_with_ceil(length, set.lowest_priority().period),
    })
}
