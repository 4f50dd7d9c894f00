/*! Linking of producer and consumer job instances

A consumer job reads its inputs when it starts and a producer job
publishes its outputs when it completes. The job a consumer reads from
is the *closest preceding* producer job: the one whose publish instant
is the greatest value not after the consumer's read instant. Its
forward dual, [first_reader], yields the first consumer job that sees a
given publication.

Both functions assume that publish and read instants are
non-decreasing in instance order, which holds for the jobs of a single
task on a uniprocessor.
*/

use crate::dispatcher::JobEnvelope;
use crate::time::Instant;

/// Index of the producer whose publish instant is the greatest one
/// `<= read`, or `None` if every producer publishes after `read`.
pub fn closest_preceding<T, P>(producers: &[T], read: Instant, publish: P) -> Option<usize>
where
    P: Fn(&T) -> Instant,
{
    producers
        .partition_point(|p| publish(p) <= read)
        .checked_sub(1)
}

/// Index of the first consumer whose read instant is `>= published`,
/// or `None` if no consumer reads that late.
pub fn first_reader<T, R>(consumers: &[T], published: Instant, read: R) -> Option<usize>
where
    R: Fn(&T) -> Instant,
{
    let idx = consumers.partition_point(|c| read(c) < published);
    (idx < consumers.len()).then_some(idx)
}

/// [closest_preceding] over job envelopes.
pub fn producer_of(producers: &[JobEnvelope], consumer: &JobEnvelope) -> Option<usize> {
    closest_preceding(producers, consumer.start, |p| p.end)
}

/// [first_reader] over job envelopes.
pub fn consumer_of(consumers: &[JobEnvelope], producer: &JobEnvelope) -> Option<usize> {
    first_reader(consumers, producer.end, |c| c.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(instance: u64, start: Instant, end: Instant) -> JobEnvelope {
        JobEnvelope {
            instance,
            release: start,
            start,
            end,
        }
    }

    #[test]
    fn freshest_data_not_from_the_future() {
        let producers = vec![env(0, 0, 2), env(1, 10, 12), env(2, 20, 22)];
        assert_eq!(producer_of(&producers, &env(0, 1, 3)), None);
        assert_eq!(producer_of(&producers, &env(0, 2, 5)), Some(0));
        assert_eq!(producer_of(&producers, &env(0, 11, 15)), Some(0));
        assert_eq!(producer_of(&producers, &env(0, 12, 15)), Some(1));
        assert_eq!(producer_of(&producers, &env(0, 99, 100)), Some(2));
    }

    #[test]
    fn first_consumer_that_sees_the_data() {
        let consumers = vec![env(0, 2, 5), env(1, 12, 15), env(2, 22, 25)];
        assert_eq!(consumer_of(&consumers, &env(0, 0, 2)), Some(0));
        assert_eq!(consumer_of(&consumers, &env(0, 0, 3)), Some(1));
        assert_eq!(consumer_of(&consumers, &env(0, 0, 23)), None);
    }

    #[test]
    fn rules_are_dual() {
        let producers = vec![env(0, 0, 1), env(1, 3, 4), env(2, 6, 7), env(3, 9, 10)];
        let consumers = vec![env(0, 2, 5), env(1, 8, 11)];
        for (j, p) in producers.iter().enumerate() {
            if let Some(c) = consumer_of(&consumers, p) {
                // the consumer reads data at least as fresh as `p`
                assert!(producer_of(&producers, &consumers[c]).unwrap() >= j);
            }
        }
    }
}
