//! Typed form of the LET system and schedule documents.
//!
//! Field names follow the JSON documents exactly; times are in the
//! document's unit, see [crate::AnalysisConfig::time_scale].

use serde::{Deserialize, Serialize};

/// A task as described in a `TaskStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetTask {
    pub name: String,
    pub initial_offset: f64,
    /// Only zero is supported.
    pub activation_offset: f64,
    /// LET duration, used as relative deadline.
    pub duration: f64,
    pub period: f64,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    pub wcet: f64,
    pub bcet: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acet: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRef {
    pub task: String,
    pub port: String,
}

/// A named data dependency between two task ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub source: PortRef,
    pub destination: PortRef,
}

/// A linked list of segments, the wire shape of event chains and
/// their instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainLink<S> {
    pub segment: S,
    /// Absent at the end of the chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successor: Option<Box<ChainLink<S>>>,
}

impl<S> ChainLink<S> {
    /// Link `segments` in order; `None` if there are none.
    pub fn from_segments(segments: Vec<S>) -> Option<Self> {
        segments.into_iter().rev().fold(None, |successor, segment| {
            Some(ChainLink {
                segment,
                successor: successor.map(Box::new),
            })
        })
    }

    /// The segments in chain order.
    pub fn segments(&self) -> Vec<&S> {
        let mut segments = vec![&self.segment];
        let mut next = self.successor.as_deref();
        while let Some(link) = next {
            segments.push(&link.segment);
            next = link.successor.as_deref();
        }
        segments
    }
}

/// An entry of the `EventChainStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventChain {
    pub name: String,
    #[serde(flatten)]
    pub link: ChainLink<Dependency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub name: String,
    pub event_chain: String,
    pub relation: String,
    pub time: f64,
}

/// An entry of the `SystemInputStore` or `SystemOutputStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPort {
    pub name: String,
}

/// A LET system description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LetSystem {
    #[serde(rename = "TaskStore", default)]
    pub tasks: Vec<LetTask>,
    #[serde(rename = "DependencyStore", default)]
    pub dependencies: Vec<Dependency>,
    #[serde(rename = "EventChainStore", default)]
    pub event_chains: Vec<EventChain>,
    #[serde(rename = "ConstraintStore", default)]
    pub constraints: Vec<Constraint>,
    #[serde(rename = "SystemInputStore", default)]
    pub system_inputs: Vec<SystemPort>,
    #[serde(rename = "SystemOutputStore", default)]
    pub system_outputs: Vec<SystemPort>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    pub start_time: f64,
    pub end_time: f64,
}

/// One job of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInstance {
    pub instance: u64,
    pub period_start_time: f64,
    /// Read instant: start of the first execution interval.
    pub let_start_time: f64,
    /// Publish instant: end of the last execution interval.
    pub let_end_time: f64,
    pub period_end_time: f64,
    pub execution_time: f64,
    pub execution_intervals: Vec<TimeInterval>,
}

/// All jobs of one task, an entry of the `TaskInstancesStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInstances {
    pub name: String,
    pub initial_offset: f64,
    pub value: Vec<TaskInstance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceEvent {
    pub task: String,
    pub port: String,
    pub task_instance: u64,
    pub timestamp: f64,
}

/// A consumer job together with the producer job it reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyInstance {
    /// The consumer's instance number.
    pub instance: u64,
    pub receive_event: InstanceEvent,
    pub send_event: InstanceEvent,
}

/// All instances of one dependency, an entry of the `DependencyInstancesStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyInstances {
    pub name: String,
    pub value: Vec<DependencyInstance>,
}

/// A dependency instance as a segment of an event-chain instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedDependencyInstance {
    pub name: String,
    #[serde(flatten)]
    pub instance: DependencyInstance,
}

/// An entry of the `EventChainInstanceStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventChainInstance {
    pub name: String,
    #[serde(flatten)]
    pub link: ChainLink<NamedDependencyInstance>,
}

/// A LET system together with its computed schedule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LetSchedule {
    #[serde(flatten)]
    pub system: LetSystem,
    #[serde(rename = "TaskInstancesStore", default)]
    pub task_instances: Vec<TaskInstances>,
    #[serde(rename = "DependencyInstancesStore", default)]
    pub dependency_instances: Vec<DependencyInstances>,
    #[serde(rename = "EventChainInstanceStore", default)]
    pub event_chain_instances: Vec<EventChainInstance>,
}
