/*! Response-time analysis for fully-preemptive fixed-priority scheduling

This module provides the classic time-demand analysis (TDA) for
periodic tasks with constrained deadlines on a dedicated uniprocessor.

## Citation

The recurrence is the one given in:

- M. Joseph and P. Pandya, “Finding Response Times in a Real-Time System”, *The Computer Journal*, 29(5), pp. 390--395, 1986.

 */

mod tda;

pub use tda::{analyze_task_set, interference, response_time, response_time_iterates};
