use crate::error::AnalysisResult;
use crate::model::{InterconnectedChain, LocalSegment, Segment};
use crate::time::Duration;

/// Sum the segments of `chain`, using `local` for local segments and
/// `T + R` for communication tasks. The last local segment is passed
/// `true` as its second argument.
fn compose<F>(chain: &InterconnectedChain, local: F) -> AnalysisResult<Duration>
where
    F: Fn(&LocalSegment, bool) -> Duration,
{
    let last_local = chain
        .segments
        .iter()
        .rposition(|s| matches!(s, Segment::Local(_)));
    chain
        .segments
        .iter()
        .enumerate()
        .map(|(i, s)| match s {
            Segment::Local(l) => Ok(local(l, Some(i) == last_local)),
            Segment::Communication(t) => t.response_time_bound().map(|r| t.period + r),
        })
        .sum()
}

/// Reaction time of a chain spanning several ECUs.
pub fn reaction_time(chain: &InterconnectedChain) -> AnalysisResult<Duration> {
    compose(chain, |l, _| l.our_react)
}

/// Data age of a chain spanning several ECUs.
pub fn data_age(chain: &InterconnectedChain) -> AnalysisResult<Duration> {
    compose(chain, |l, _| l.our_age)
}

/// Like [data_age], but with the reduced age for all local segments
/// except the last one.
pub fn reduced_data_age(chain: &InterconnectedChain) -> AnalysisResult<Duration> {
    compose(chain, |l, last| if last { l.our_age } else { l.our_red_age })
}
