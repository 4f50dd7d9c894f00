use crate::error::AnalysisError;
use crate::model::{CauseEffectChain, InterconnectedChain, Segment, Task, TaskSet};

use crate::tests::{scenario_ab, task};

fn rejects(tasks: Vec<Task>) -> bool {
    matches!(TaskSet::new(tasks), Err(AnalysisError::UnsupportedInput(_)))
}

#[test]
fn task_sets_are_validated() {
    assert!(rejects(Vec::new()));
    assert!(rejects(vec![task(1, 1, 0, 0)]));
    assert!(rejects(vec![Task::new(1, 0, 3, 2, 10, 0)]));
    assert!(rejects(vec![task(1, 1, 10, 0).with_deadline(11)]));
    assert!(rejects(vec![task(1, 1, 10, 0), task(1, 1, 10, 1)]));
    assert!(rejects(vec![task(1, 1, 10, 0), task(2, 1, 10, 0)]));
}

#[test]
fn task_sets_are_ordered_by_priority() {
    let set = TaskSet::new(vec![task(1, 1, 10, 5), task(2, 1, 20, 2), task(3, 1, 40, 9)]).unwrap();
    let ids: Vec<u32> = set.iter().map(|t| t.id.0).collect();
    assert_eq!(ids, vec![2, 1, 3]);
    assert_eq!(set.lowest_priority().id.0, 3);
    assert_eq!(set.higher_priority(2).len(), 2);
    assert_eq!(set.max_period(), 40);
}

#[test]
fn jobs_of_a_task() {
    let t = Task::new(1, 3, 1, 2, 10, 0).with_deadline(8);
    assert_eq!(t.release_of(0), 3);
    assert_eq!(t.release_of(2), 23);
    assert_eq!(t.absolute_deadline_of(2), 31);
}

#[test]
fn chains_refer_to_their_set() {
    let (set, chains) = scenario_ab();
    assert_eq!(chains[0].first(), 0);
    assert_eq!(chains[0].last(), 1);
    assert_eq!(chains[0].resolve(&set)[1].id.0, 2);

    assert!(CauseEffectChain::new(1, vec![], &set).is_err());
    assert!(CauseEffectChain::new(1, vec![0, 2], &set).is_err());
    assert!(CauseEffectChain::from_ids(1, [2, 3], &set).is_err());
    let reversed = CauseEffectChain::from_ids(1, [2, 1], &set).unwrap();
    assert_eq!(reversed.task_indices(), &[1, 0]);
}

#[test]
fn interconnected_chains_need_a_local_segment() {
    let msg = task(9, 1, 20, 0).as_message();
    assert!(InterconnectedChain::new(0, vec![Segment::Communication(msg)]).is_err());
}

#[test]
fn synchronous_copy_drops_phases() {
    let set = TaskSet::new(vec![
        Task::new(1, 7, 1, 2, 10, 1),
        Task::new(2, 3, 1, 1, 5, 0),
    ])
    .unwrap();
    let sync = set.synchronous();
    assert_eq!(sync.max_phase(), 0);
    assert_eq!(set.max_phase(), 7);
    assert_eq!(sync[0].id, set[0].id);
    assert_eq!(sync[1].wcet, 2);
    assert_eq!(sync[1].release_of(2), 20);
}
