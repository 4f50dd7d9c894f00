use std::sync::atomic::AtomicBool;

use crate::dispatcher::{Dispatcher, ExecutionInterval, Uniform, WorstCase};
use crate::error::{AnalysisError, Budget};
use crate::model::{Task, TaskSet};

use crate::tests::{scenario_ab, task};

fn iv(start: u64, end: u64) -> ExecutionInterval {
    ExecutionInterval { start, end }
}

#[test]
fn scenario_repeats_every_period() {
    let (set, _) = scenario_ab();
    let schedule = Dispatcher::new(&set, WorstCase).run(6, 57).unwrap();

    let a = schedule.jobs(0);
    let b = schedule.jobs(1);
    assert_eq!(a[0].intervals, vec![iv(0, 2)]);
    assert_eq!(b[0].intervals, vec![iv(2, 5)]);
    for (k, job) in b.iter().enumerate() {
        let base = 10 * k as u64;
        assert_eq!(job.instance, k as u64);
        assert_eq!(job.release, base);
        assert_eq!(a[k].intervals, vec![iv(base, base + 2)]);
        assert_eq!(job.intervals, vec![iv(base + 2, base + 5)]);
    }
    assert_eq!(schedule.deadline_misses(), 0);
}

#[test]
fn stops_after_rounds_of_lowest_priority_task() {
    let (set, _) = scenario_ab();
    let schedule = Dispatcher::new(&set, WorstCase).run(2, 57).unwrap();
    assert_eq!(schedule.jobs(1).len(), 2);
    assert_eq!(schedule.jobs(0).len(), 2);
    assert_eq!(schedule.jobs(1)[1].end(), 15);
}

#[test]
fn stops_at_horizon() {
    let (set, _) = scenario_ab();
    let schedule = Dispatcher::new(&set, WorstCase).run(1000, 25).unwrap();
    assert_eq!(schedule.jobs(0).len(), 3);
    assert_eq!(schedule.jobs(1).len(), 3);

    // the job running across the horizon is not reported
    let schedule = Dispatcher::new(&set, WorstCase).run(1000, 24).unwrap();
    assert_eq!(schedule.jobs(0).len(), 3);
    assert_eq!(schedule.jobs(1).len(), 2);
}

#[test]
fn preemption_splits_intervals() {
    let set = TaskSet::new(vec![task(1, 2, 5, 0), task(2, 4, 20, 1)]).unwrap();
    let schedule = Dispatcher::new(&set, WorstCase).run(1, 20).unwrap();

    let lo = &schedule.jobs(1)[0];
    assert_eq!(lo.intervals, vec![iv(2, 5), iv(7, 8)]);
    assert_eq!(lo.envelope().start, 2);
    assert_eq!(lo.envelope().end, 8);
    assert_eq!(lo.execution_time, 4);

    let hi: Vec<_> = schedule.jobs(0).iter().map(|j| j.intervals.clone()).collect();
    assert_eq!(hi[0], vec![iv(0, 2)]);
    assert_eq!(hi[1], vec![iv(5, 7)]);
}

#[test]
fn timeline_has_no_overlaps() {
    let set = TaskSet::new(vec![task(1, 1, 4, 0), task(2, 2, 6, 1), task(3, 3, 12, 2)]).unwrap();
    let schedule = Dispatcher::new(&set, WorstCase).run(5, 60).unwrap();
    let timeline = schedule.timeline();
    for pair in timeline.windows(2) {
        assert!(pair[0].1.end <= pair[1].1.start, "{:?}", pair);
    }
    assert_eq!(schedule.deadline_misses(), 0);
}

#[test]
fn zero_demand_jobs_complete_instantly() {
    let set = TaskSet::new(vec![Task::system(0, 5), task(1, 2, 10, 1), task(2, 3, 10, 2)]).unwrap();
    let schedule = Dispatcher::new(&set, WorstCase).run(2, 20).unwrap();
    let sys = schedule.jobs(0);
    assert_eq!(sys[0].intervals, vec![iv(0, 0)]);
    assert_eq!(sys[1].intervals, vec![iv(5, 5)]);
    assert_eq!(schedule.jobs(1)[0].intervals, vec![iv(0, 2)]);
    assert_eq!(schedule.jobs(2)[0].intervals, vec![iv(2, 5)]);
}

#[test]
fn same_seed_same_schedule() {
    let set = TaskSet::new(vec![
        Task::new(1, 0, 1, 3, 10, 0),
        Task::new(2, 0, 2, 5, 20, 1),
        Task::new(3, 0, 1, 6, 40, 2),
    ])
    .unwrap();
    let first = Dispatcher::new(&set, Uniform::seeded(42)).run(10, 400).unwrap();
    let second = Dispatcher::new(&set, Uniform::seeded(42)).run(10, 400).unwrap();
    assert_eq!(first, second);
    for (i, t) in set.iter().enumerate() {
        for job in first.jobs(i) {
            assert!(t.bcet <= job.execution_time && job.execution_time <= t.wcet);
            let executed: u64 = job.intervals.iter().map(|i| i.length()).sum();
            assert_eq!(executed, job.execution_time);
        }
    }
}

#[test]
fn event_budget_is_enforced() {
    let (set, _) = scenario_ab();
    assert_eq!(
        Dispatcher::new(&set, WorstCase)
            .with_event_budget(3)
            .run(6, 57),
        Err(AnalysisError::ResourceExhausted {
            budget: Budget::Events,
            limit: 3
        })
    );
}

#[test]
fn cancellation_is_honored() {
    let (set, _) = scenario_ab();
    let flag = AtomicBool::new(true);
    assert_eq!(
        Dispatcher::new(&set, WorstCase)
            .with_cancellation(&flag)
            .run(6, 57),
        Err(AnalysisError::Cancelled)
    );
}

#[test]
fn phases_delay_first_release() {
    let set = TaskSet::new(vec![Task::new(1, 3, 2, 2, 10, 0), task(2, 3, 10, 1)]).unwrap();
    let schedule = Dispatcher::new(&set, WorstCase).run(2, 20).unwrap();
    assert_eq!(schedule.jobs(1)[0].intervals, vec![iv(0, 3)]);
    assert_eq!(schedule.jobs(0)[0].release, 3);
    assert_eq!(schedule.jobs(0)[0].intervals, vec![iv(3, 5)]);
}

#[test]
fn zero_demand_jobs_do_not_split_intervals() {
    // the system job at 5 preempts L for no time at all
    let set = TaskSet::new(vec![Task::system(0, 5), task(1, 4, 20, 1)]).unwrap();
    let schedule = Dispatcher::new(&set, WorstCase).run(1, 20).unwrap();
    assert_eq!(schedule.jobs(1)[0].intervals, vec![iv(0, 4)]);

    let set = TaskSet::new(vec![Task::system(0, 5), task(1, 7, 20, 1)]).unwrap();
    let schedule = Dispatcher::new(&set, WorstCase).run(1, 20).unwrap();
    assert_eq!(schedule.jobs(1)[0].intervals, vec![iv(0, 7)]);
    assert_eq!(schedule.timeline(), vec![(1, iv(0, 7))]);
}
