/*! Import and export of LET system descriptions

A LET system lists tasks, named dependencies between task ports, and
event chains built from those dependencies. [schedule_system] analyzes
such a system and returns it together with the task, dependency and
event-chain instances of its simulated schedule, linked with the same
rules the exact latency analysis uses.

The synthetic task [SYSTEM_TASK] stands for the system's inputs and
outputs. It is injected on import and omitted from the exported task
instances.
*/

mod export;
mod import;
pub mod schema;

pub use export::{describe, reaction_times_from_export, schedule_system};
pub use import::{import, ImportedSystem};
pub use schema::{LetSchedule, LetSystem};

/// Name of the synthetic system task.
pub const SYSTEM_TASK: &str = "__system";
/// Port of the system task that feeds external inputs into a chain.
pub const SYSTEM_INPUT: &str = "SystemInput";
/// Port of the system task that consumes a chain's outputs.
pub const SYSTEM_OUTPUT: &str = "SystemOutput";
