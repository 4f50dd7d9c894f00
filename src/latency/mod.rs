/*! End-to-end latency bounds for cause-effect chains

Two kinds of analyses are provided:

- analytic bounds, which only need the response-time bounds of the
  tasks: [davare], [duerr] and [kloda];
- bounds observed in a simulated schedule: [exact], and their
  composition across ECUs in [interconnected].

For every chain of a schedulable task set, the Kloda bound is never
below the exact reaction time. [crate::analysis] checks this.

## Citations

- A. Davare et al., “Period Optimization for Hard Real-Time Distributed Automotive Systems”, *DAC 2007*.
- M. Dürr, G. von der Brüggen, K.-H. Chen, and J.-J. Chen, “End-to-End Timing Analysis of Sporadic Cause-Effect Chains in Distributed Systems”, *ACM TECS* 18(5s), 2019.
- T. Kloda, A. Bertout, and Y. Sorel, “Latency Analysis for Data Chains of Real-Time Periodic Tasks”, *ETFA 2018*.
*/

mod davare;
pub mod duerr;
pub mod exact;
pub mod interconnected;
mod kloda;

pub use davare::davare;
pub use kloda::kloda;

use crate::error::AnalysisResult;
use crate::model::{CauseEffectChain, TaskSet};

/// Compute the Davare and Dürr bounds of `chain` and store them.
pub fn analytic_bounds(chain: &mut CauseEffectChain, set: &TaskSet) -> AnalysisResult<()> {
    let tasks = chain.resolve(set);
    let davare = davare(&tasks)?;
    let duerr_react = duerr::reaction_time(&tasks)?;
    let duerr_age = duerr::data_age(&tasks)?;
    chain.latencies.davare = Some(davare);
    chain.latencies.duerr_react = Some(duerr_react);
    chain.latencies.duerr_age = Some(duerr_age);
    Ok(())
}
