use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskId, TaskSet};
use crate::error::{AnalysisError, AnalysisResult};
use crate::time::Duration;

/// Identifier of a cause-effect chain.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChainId(pub u32);

/// The end-to-end latency bounds of a chain, one per analysis.
///
/// Each field is written only by the analysis that owns it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLatencies {
    pub davare: Option<Duration>,
    pub duerr_age: Option<Duration>,
    pub duerr_react: Option<Duration>,
    pub kloda: Option<Duration>,
    pub our_age: Option<Duration>,
    pub our_red_age: Option<Duration>,
    pub our_react: Option<Duration>,
    pub inter_our_age: Option<Duration>,
    pub inter_our_red_age: Option<Duration>,
    pub inter_our_react: Option<Duration>,
}

/// An ordered sequence of tasks of one task set, where each task
/// consumes the data produced by its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CauseEffectChain {
    pub id: ChainId,
    /// Indices into the owning [TaskSet].
    tasks: Vec<usize>,
    pub latencies: ChainLatencies,
}

impl CauseEffectChain {
    /// Build a chain from task indices of `set`.
    pub fn new(id: u32, tasks: Vec<usize>, set: &TaskSet) -> AnalysisResult<Self> {
        let id = ChainId(id);
        if tasks.is_empty() {
            return Err(AnalysisError::unsupported(format!("chain {} is empty", id)));
        }
        if let Some(bad) = tasks.iter().find(|i| **i >= set.len()) {
            return Err(AnalysisError::unsupported(format!(
                "chain {} refers to task index {} of a set with {} tasks",
                id,
                bad,
                set.len()
            )));
        }
        Ok(CauseEffectChain {
            id,
            tasks,
            latencies: ChainLatencies::default(),
        })
    }

    /// Build a chain from task ids of `set`.
    pub fn from_ids<I>(id: u32, ids: I, set: &TaskSet) -> AnalysisResult<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let tasks = ids
            .into_iter()
            .map(|tid| {
                set.index_of(TaskId(tid)).ok_or_else(|| {
                    AnalysisError::unsupported(format!("chain {} refers to unknown task {}", id, tid))
                })
            })
            .collect::<AnalysisResult<Vec<_>>>()?;
        CauseEffectChain::new(id, tasks, set)
    }

    pub fn task_indices(&self) -> &[usize] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Resolve the chain against its task set.
    pub fn resolve<'a>(&self, set: &'a TaskSet) -> Vec<&'a Task> {
        self.tasks.iter().map(|i| &set[*i]).collect()
    }

    pub fn first(&self) -> usize {
        self.tasks[0]
    }

    pub fn last(&self) -> usize {
        self.tasks[self.tasks.len() - 1]
    }
}

/// The already analyzed part of an interconnected chain that runs on
/// a single ECU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalSegment {
    /// Copies of the segment's tasks, response times included.
    pub tasks: Vec<Task>,
    pub our_react: Duration,
    pub our_age: Duration,
    pub our_red_age: Duration,
}

impl LocalSegment {
    /// Capture an analyzed local chain.
    pub fn from_chain(chain: &CauseEffectChain, set: &TaskSet) -> AnalysisResult<Self> {
        let missing = || {
            AnalysisError::unsupported(format!("local chain {} has not been simulated", chain.id))
        };
        Ok(LocalSegment {
            tasks: chain.resolve(set).into_iter().cloned().collect(),
            our_react: chain.latencies.our_react.ok_or_else(missing)?,
            our_age: chain.latencies.our_age.ok_or_else(missing)?,
            our_red_age: chain.latencies.our_red_age.ok_or_else(missing)?,
        })
    }
}

/// One part of an interconnected chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Segment {
    Local(LocalSegment),
    /// A message task transmitting between two ECUs.
    Communication(Task),
}

/// A chain spanning several ECUs: local chains joined by communication tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterconnectedChain {
    pub id: ChainId,
    pub segments: Vec<Segment>,
    pub latencies: ChainLatencies,
}

impl InterconnectedChain {
    pub fn new(id: u32, segments: Vec<Segment>) -> AnalysisResult<Self> {
        let id = ChainId(id);
        if !segments.iter().any(|s| matches!(s, Segment::Local(_))) {
            return Err(AnalysisError::unsupported(format!(
                "interconnected chain {} has no local segment",
                id
            )));
        }
        Ok(InterconnectedChain {
            id,
            segments,
            latencies: ChainLatencies::default(),
        })
    }

    /// All tasks in chain order, communication tasks included.
    pub fn flattened(&self) -> Vec<&Task> {
        self.segments
            .iter()
            .flat_map(|s| match s {
                Segment::Local(l) => l.tasks.iter().collect::<Vec<_>>(),
                Segment::Communication(t) => vec![t],
            })
            .collect()
    }
}
