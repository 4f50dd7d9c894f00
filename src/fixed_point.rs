use std::iter;

use crate::time::{Duration, Service};

use thiserror::Error;

/// Error type returned when a fixed point search fails.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq, PartialOrd)]
pub enum SearchFailure {
    /// No fixed point found below the given divergence threshold.
    #[error("no fixed point less than {limit} found")]
    DivergenceLimitExceeded { limit: Duration },
}

pub type SearchResult = Result<Duration, SearchFailure>;

/// The sequence of iterates `x₀ = initial, xₙ₊₁ = workload(xₙ)`.
///
/// The sequence ends with the fixed point, or with the first iterate
/// that exceeds `divergence_limit`.
pub fn iterates<RHS>(
    initial: Duration,
    divergence_limit: Duration,
    workload: RHS,
) -> impl Iterator<Item = Duration>
where
    RHS: Fn(Duration) -> Service,
{
    iter::successors(Some(initial), move |assumed| {
        if *assumed > divergence_limit {
            return None;
        }
        let next = workload(*assumed);
        (next != *assumed).then_some(next)
    })
}

/// Conduct an iterative fixed point search starting at `initial` up
/// to a given divergence threshold.
///
/// `workload` must be monotone and `workload(initial) >= initial`
/// for the result to be the least fixed point.
pub fn search<RHS>(initial: Duration, divergence_limit: Duration, workload: RHS) -> SearchResult
where
    RHS: Fn(Duration) -> Service,
{
    let mut assumed_response_time = initial;
    while assumed_response_time <= divergence_limit {
        let response_time_bound = workload(assumed_response_time);
        if response_time_bound <= assumed_response_time {
            // we have converged
            return Ok(response_time_bound);
        } else {
            // continue iterating
            assumed_response_time = response_time_bound
        }
    }
    // if we get here, we failed to converge => no solution
    Err(SearchFailure::DivergenceLimitExceeded {
        limit: divergence_limit,
    })
}
