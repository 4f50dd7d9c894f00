use crate::error::AnalysisResult;
use crate::model::Task;
use crate::time::{divide_with_ceil, Duration, Instant};

/// The first release of `task` at or after `t`, assuming synchronous
/// releases at multiples of the period.
fn next_release(task: &Task, t: Instant) -> Instant {
    divide_with_ceil(t, task.period) * task.period
}

/// Latest completion of the job chain that starts with the job of
/// `chain[0]` released at `release`.
fn walk(chain: &[&Task], release: Instant) -> AnalysisResult<Instant> {
    let mut now = release;
    for hop in chain.windows(2) {
        let (producer, consumer) = (hop[0], hop[1]);
        let ready = if producer.has_higher_priority_than(consumer)
            && !producer.message
            && !consumer.message
        {
            // the consumer job released no earlier than the producer
            // job cannot start before the producer completes
            now
        } else {
            now + producer.response_time_bound()?
        };
        now = next_release(consumer, ready);
    }
    match chain.last() {
        Some(last) => Ok(now + last.response_time_bound()?),
        None => Ok(now),
    }
}

/// Reaction-time bound of Kloda et al. for synchronously released
/// tasks on one processor.
///
/// The phases of the tasks are ignored. The bound enumerates every
/// release of the first task within one hyperperiod, follows the job
/// chain that is triggered by it, and adds one period of the first
/// task for the external activation to be sampled.
pub fn kloda(chain: &[&Task], hyperperiod: Duration) -> AnalysisResult<Duration> {
    let first = match chain.first() {
        Some(first) => first,
        None => return Ok(0),
    };
    let mut worst = 0;
    let mut release = 0;
    while release < hyperperiod.max(1) {
        worst = worst.max(walk(chain, release)? - release);
        release += first.period;
    }
    Ok(first.period + worst)
}
