/*! End-to-end timing analysis of cause-effect chains

This crate bounds the worst-case response times of periodic tasks under
fully-preemptive fixed-priority scheduling on a uniprocessor, simulates
their exact job-level behavior, and derives end-to-end latency bounds
(reaction time and data age) for cause-effect chains, i.e., sequences of
tasks that pass data from one to the next.

The analyses build on one another:

1. [fixed_priority] computes response-time bounds (TDA).
2. [latency] derives the analytic chain bounds (Davare, Dürr, Kloda).
3. [horizon] sizes a finite simulation window.
4. [dispatcher] simulates the task set within that window.
5. [latency] derives exact bounds from the simulated [dispatcher::Schedule],
   linking jobs as described in [linker].

[analysis] runs this pipeline over whole task sets, and [letsync]
translates from and to the LET system description format.

## Citations

- M. Günzel, K.-H. Chen, N. Ueter, G. von der Brüggen, M. Dürr, and J.-J. Chen, “Timing Analysis of Asynchronized Distributed Cause-Effect Chains”, *Proceedings of the 27th IEEE Real-Time and Embedded Technology and Applications Symposium (RTAS 2021)*.
- M. Dürr, G. von der Brüggen, K.-H. Chen, and J.-J. Chen, “End-to-End Timing Analysis of Sporadic Cause-Effect Chains in Distributed Systems”, *ACM TECS* 18(5s), 2019.
- A. Davare et al., “Period Optimization for Hard Real-Time Distributed Automotive Systems”, *DAC 2007*.
- T. Kloda, A. Bertout, and Y. Sorel, “Latency Analysis for Data Chains of Real-Time Periodic Tasks”, *ETFA 2018*.
*/

pub mod analysis;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fixed_point;
pub mod fixed_priority;
pub mod horizon;
pub mod latency;
pub mod letsync;
pub mod linker;
pub mod model;
pub mod time;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult};

#[cfg(test)]
mod tests {
    use crate::model::{CauseEffectChain, Task, TaskSet};
    use crate::time::Duration;

    /// A zero-phase task with `bcet == wcet` and implicit deadline.
    pub fn task(id: u32, wcet: Duration, period: Duration, priority: u32) -> Task {
        Task::new(id, 0, wcet, wcet, period, priority)
    }

    /// A(period=10, C=2, prio 0) → B(period=10, C=3, prio 1).
    pub fn scenario_ab() -> (TaskSet, Vec<CauseEffectChain>) {
        let set = TaskSet::new(vec![task(1, 2, 10, 0), task(2, 3, 10, 1)]).unwrap();
        let chain = CauseEffectChain::new(0, vec![0, 1], &set).unwrap();
        (set, vec![chain])
    }
}
