use tracing::trace;

use crate::error::{AnalysisError, AnalysisResult};
use crate::fixed_point;
use crate::model::{Task, TaskSet};
use crate::time::{divide_with_ceil, Duration, Service};

/// Processor demand of `higher_priority` in any interval of length `delta`.
pub fn interference(higher_priority: &[Task], delta: Duration) -> Service {
    higher_priority
        .iter()
        .map(|t| divide_with_ceil(delta, t.period) * t.wcet)
        .sum()
}

fn check_degenerate(task: &Task) -> AnalysisResult<()> {
    if task.wcet == 0 && !task.is_system() {
        Err(AnalysisError::DegenerateTask { task: task.id })
    } else {
        Ok(())
    }
}

/// Bound the worst-case response time of `task`, given all tasks of
/// strictly higher priority.
///
/// Fails with [AnalysisError::DegenerateTask] if the task has no
/// execution demand and with [AnalysisError::Unschedulable] as soon as
/// the recurrence exceeds the task's deadline.
pub fn response_time(task: &Task, higher_priority: &[Task]) -> AnalysisResult<Duration> {
    check_degenerate(task)?;
    if task.is_system() {
        return Ok(0);
    }
    let rhs = |r: Duration| task.wcet + interference(higher_priority, r);
    fixed_point::search(task.wcet, task.deadline, rhs).map_err(|_| AnalysisError::Unschedulable {
        task: task.id,
        deadline: task.deadline,
    })
}

/// The iterates `R₀, R₁, …` of the recurrence for `task`, ending at
/// the fixed point or at the first iterate beyond the deadline.
pub fn response_time_iterates(
    task: &Task,
    higher_priority: &[Task],
) -> AnalysisResult<Vec<Duration>> {
    check_degenerate(task)?;
    let rhs = |r: Duration| task.wcet + interference(higher_priority, r);
    Ok(fixed_point::iterates(task.wcet, task.deadline, rhs).collect())
}

/// Run the TDA for every task of `set` in priority order and store
/// the bounds. The first failing task aborts the analysis.
pub fn analyze_task_set(set: &mut TaskSet) -> AnalysisResult<()> {
    for i in 0..set.len() {
        let rt = response_time(&set[i], set.higher_priority(i))?;
        trace!(task = %set[i].id, response_time = rt, "TDA converged");
        set.tasks_mut()[i].response_time = Some(rt);
    }
    Ok(())
}
