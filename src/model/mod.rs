/*! Tasks, task sets, and cause-effect chains

A [TaskSet] owns its [Task]s in priority order. A [CauseEffectChain]
stores indices into that set, so a chain is only meaningful together
with the set it was built for. Analyses write their results into the
chain's [ChainLatencies]; the TDA writes [Task::response_time]. Nothing
else is mutated.
*/

mod chain;
mod task;

pub use chain::{
    CauseEffectChain, ChainId, ChainLatencies, InterconnectedChain, LocalSegment, Segment,
};
pub use task::{Task, TaskId, TaskKind, TaskSet};

#[cfg(test)]
mod tests;
