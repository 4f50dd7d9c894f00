use crate::error::AnalysisResult;
use crate::model::Task;
use crate::time::Duration;

/// Extra waiting of the data produced by `producer` before `consumer`
/// may pick it up.
///
/// If the consumer is scheduled first, or if the hop crosses a bus,
/// the consumer job released together with the producer job may
/// already have read its input, which costs one more producer
/// response time.
fn hop_penalty(producer: &Task, consumer: &Task) -> AnalysisResult<Duration> {
    if consumer.has_higher_priority_than(producer) || producer.message || consumer.message {
        producer.response_time_bound()
    } else {
        Ok(0)
    }
}

/// Maximum reaction time according to Dürr et al. (Theorem 5.4):
/// `T_1 + R_n + Σ_{i<n} max(R_i, T_{i+1} + p_i)`.
pub fn reaction_time(chain: &[&Task]) -> AnalysisResult<Duration> {
    let (first, last) = match (chain.first(), chain.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(0),
    };
    let mut bound = first.period + last.response_time_bound()?;
    for hop in chain.windows(2) {
        let (producer, consumer) = (hop[0], hop[1]);
        let wait = consumer.period + hop_penalty(producer, consumer)?;
        bound += producer.response_time_bound()?.max(wait);
    }
    Ok(bound)
}

/// Maximum data age according to Dürr et al. (Theorem 5.10):
/// `R_n + Σ_{i<n} (T_i + p_i)`.
pub fn data_age(chain: &[&Task]) -> AnalysisResult<Duration> {
    let last = match chain.last() {
        Some(last) => last,
        None => return Ok(0),
    };
    let mut bound = last.response_time_bound()?;
    for hop in chain.windows(2) {
        let (producer, consumer) = (hop[0], hop[1]);
        bound += producer.period + hop_penalty(producer, consumer)?;
    }
    Ok(bound)
}
