/*! The end-to-end analysis pipeline

For every task set: the TDA, the analytic chain bounds, the simulation
of one horizon, the exact chain bounds, and the Kloda bound together
with its cross-check against the exact reaction time. Task sets that
fail the TDA are dropped with all their chains.
*/

use std::sync::atomic::AtomicBool;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{AnalysisConfig, InvariantPolicy};
use crate::dispatcher::{source_for, Dispatcher, Schedule};
use crate::error::{AnalysisError, AnalysisResult};
use crate::fixed_priority;
use crate::horizon::{self, Horizon};
use crate::latency::{self, exact, interconnected};
use crate::model::{CauseEffectChain, ChainId, InterconnectedChain, TaskSet};
use crate::time::Duration;

/// A task set that passed the TDA, with its analyzed chains.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedTaskSet {
    /// The tasks, with response-time bounds.
    pub tasks: TaskSet,
    pub chains: Vec<CauseEffectChain>,
    /// Absent if the set has no chains and thus was not simulated.
    pub horizon: Option<Horizon>,
    pub schedule: Option<Schedule>,
    /// Chains whose reduced data age differs from the full one.
    pub reduced_age_diverged: Vec<ChainId>,
}

/// Analyze one task set and its chains.
///
/// The run owns its tasks and chains; nothing is shared with other runs.
pub fn analyze_task_set(
    mut tasks: TaskSet,
    mut chains: Vec<CauseEffectChain>,
    config: &AnalysisConfig,
    cancel: Option<&AtomicBool>,
) -> AnalysisResult<AnalyzedTaskSet> {
    fixed_priority::analyze_task_set(&mut tasks)?;
    for chain in chains.iter_mut() {
        latency::analytic_bounds(chain, &tasks)?;
    }

    let mut analyzed = AnalyzedTaskSet {
        tasks,
        chains,
        horizon: None,
        schedule: None,
        reduced_age_diverged: Vec::new(),
    };
    if analyzed.chains.is_empty() {
        return Ok(analyzed);
    }

    let max_e2e = analyzed
        .chains
        .iter()
        .filter_map(|c| c.latencies.davare)
        .max()
        .unwrap_or(0);
    let (window, schedule) = simulate(&analyzed.tasks, max_e2e, config, cancel)?;
    let envelopes = schedule.envelopes();

    // The Kloda bound presumes a synchronous release, so phased sets
    // are checked against a zero-phase replay.
    let synchronous = if analyzed.tasks.max_phase() == 0 {
        None
    } else {
        debug!(max_phase = window.max_phase, "replaying with synchronous releases");
        let (sync_window, sync_schedule) =
            simulate(&analyzed.tasks.synchronous(), max_e2e, config, cancel)?;
        Some((sync_window, sync_schedule.envelopes()))
    };

    for chain in analyzed.chains.iter_mut() {
        let span = chain.latencies.davare.unwrap_or(max_e2e);
        chain.latencies.our_react = exact::steady_state_reaction_time(chain, &envelopes, &window);
        chain.latencies.our_age = exact::data_age(chain, &envelopes);
        chain.latencies.our_red_age = exact::reduced_data_age(chain, &envelopes, &window, span);
        if chain.latencies.our_red_age != chain.latencies.our_age {
            warn!(
                chain = %chain.id,
                our_age = ?chain.latencies.our_age,
                our_red_age = ?chain.latencies.our_red_age,
                "reduced data age diverges from the full search"
            );
            analyzed.reduced_age_diverged.push(chain.id);
        }

        let kloda = latency::kloda(&chain.resolve(&analyzed.tasks), window.hyperperiod)?;
        chain.latencies.kloda = Some(kloda);
        let synchronous_react = match &synchronous {
            Some((sync_window, sync_envelopes)) => {
                exact::steady_state_reaction_time(chain, sync_envelopes, sync_window)
            }
            None => chain.latencies.our_react,
        };
        check_kloda(chain.id, kloda, synchronous_react, config.invariant_policy)?;
    }

    info!(
        tasks = analyzed.tasks.len(),
        chains = analyzed.chains.len(),
        jobs = schedule.job_count(),
        miss_ratio = schedule.miss_ratio(),
        "task set analyzed"
    );
    analyzed.horizon = Some(window);
    analyzed.schedule = Some(schedule);
    Ok(analyzed)
}

/// Size the simulation window of `tasks` and dispatch them over it.
pub fn simulate(
    tasks: &TaskSet,
    max_e2e_latency: Duration,
    config: &AnalysisConfig,
    cancel: Option<&AtomicBool>,
) -> AnalysisResult<(Horizon, Schedule)> {
    let window = horizon::horizon(tasks, max_e2e_latency, config)?;
    debug!(
        hyperperiod = window.hyperperiod,
        horizon = window.length,
        rounds = window.rounds,
        "simulating task set"
    );
    let mut dispatcher =
        Dispatcher::new(tasks, source_for(config)).with_event_budget(config.max_events);
    if let Some(flag) = cancel {
        dispatcher = dispatcher.with_cancellation(flag);
    }
    let schedule = dispatcher.run(window.rounds, window.length)?;
    Ok((window, schedule))
}

/// The synchronous-release bound must cover the exact reaction time
/// of the synchronously released set.
fn check_kloda(
    chain: ChainId,
    kloda: Duration,
    exact: Option<Duration>,
    policy: InvariantPolicy,
) -> AnalysisResult<()> {
    let exact = match exact {
        Some(exact) if exact > kloda => exact,
        _ => return Ok(()),
    };
    let violation = AnalysisError::InvariantViolation { chain, kloda, exact };
    match policy {
        InvariantPolicy::Enforce => Err(violation),
        InvariantPolicy::Log => {
            error!(%violation, "continuing despite invariant violation");
            Ok(())
        }
    }
}

/// Analyze a batch of task sets.
///
/// Task sets for which the TDA fails are dropped together with their
/// chains; every other error aborts the batch.
pub fn analyze_task_sets<I>(
    inputs: I,
    config: &AnalysisConfig,
    cancel: Option<&AtomicBool>,
) -> AnalysisResult<Vec<AnalyzedTaskSet>>
where
    I: IntoIterator<Item = (TaskSet, Vec<CauseEffectChain>)>,
{
    inputs
        .into_iter()
        .enumerate()
        .filter_map(
            |(i, (tasks, chains))| match analyze_task_set(tasks, chains, config, cancel) {
                Ok(analyzed) => Some(Ok(analyzed)),
                Err(e) if e.discards_task_set() => {
                    warn!(task_set = i, error = %e, "discarding task set");
                    None
                }
                Err(e) => Some(Err(e)),
            },
        )
        .collect()
}

/// Compute the analytic and the composed exact bounds of chains that
/// span several ECUs.
///
/// The local segments must stem from analyzed task sets and the
/// communication tasks must carry response-time bounds.
pub fn analyze_interconnected(chains: &mut [InterconnectedChain]) -> AnalysisResult<()> {
    for chain in chains.iter_mut() {
        let tasks = chain.flattened();
        let davare = latency::davare(&tasks)?;
        let duerr_react = latency::duerr::reaction_time(&tasks)?;
        let duerr_age = latency::duerr::data_age(&tasks)?;
        let react = interconnected::reaction_time(chain)?;
        let age = interconnected::data_age(chain)?;
        let red_age = interconnected::reduced_data_age(chain)?;

        let l = &mut chain.latencies;
        l.davare = Some(davare);
        l.duerr_react = Some(duerr_react);
        l.duerr_age = Some(duerr_age);
        l.inter_our_react = Some(react);
        l.inter_our_age = Some(age);
        l.inter_our_red_age = Some(red_age);
        debug!(chain = %chain.id, react, age, "interconnected chain analyzed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionModel;
    use crate::model::{LocalSegment, Segment, Task};
    use crate::tests::{scenario_ab, task};

    #[test]
    fn scenario_end_to_end() {
        let (set, chains) = scenario_ab();
        let analyzed = analyze_task_set(set, chains, &AnalysisConfig::default(), None).unwrap();
        let l = analyzed.chains[0].latencies;
        assert_eq!(l.davare, Some(27));
        assert_eq!(l.duerr_react, Some(25));
        assert_eq!(l.duerr_age, Some(15));
        assert_eq!(l.kloda, Some(15));
        assert_eq!(l.our_react, Some(5));
        assert_eq!(l.our_age, Some(15));
        assert_eq!(l.our_red_age, Some(15));
        assert!(analyzed.reduced_age_diverged.is_empty());

        let window = analyzed.horizon.unwrap();
        assert_eq!(window.length, 57);
        assert_eq!(window.rounds, 6);
        let schedule = analyzed.schedule.unwrap();
        assert_eq!(schedule.jobs(1).len(), 6);
        assert_eq!(schedule.deadline_misses(), 0);
    }

    #[test]
    fn degenerate_sets_are_discarded() {
        let good = scenario_ab();
        let bad_set = TaskSet::new(vec![task(1, 2, 10, 0), task(2, 0, 10, 1)]).unwrap();
        let bad_chain = CauseEffectChain::new(0, vec![0, 1], &bad_set).unwrap();
        let unschedulable = TaskSet::new(vec![task(1, 6, 10, 0), task(2, 6, 10, 1)]).unwrap();

        let retained = analyze_task_sets(
            vec![(bad_set, vec![bad_chain]), good, (unschedulable, Vec::new())],
            &AnalysisConfig::default(),
            None,
        )
        .unwrap();
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].chains[0].latencies.our_react, Some(5));
    }

    #[test]
    fn budget_errors_abort_the_batch() {
        let config = AnalysisConfig {
            max_horizon: 10,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            analyze_task_sets(vec![scenario_ab()], &config, None),
            Err(AnalysisError::ResourceExhausted { .. })
        ));
    }

    #[test]
    fn sets_without_chains_are_not_simulated() {
        let (set, _) = scenario_ab();
        let analyzed = analyze_task_set(set, Vec::new(), &AnalysisConfig::default(), None).unwrap();
        assert!(analyzed.schedule.is_none());
        assert_eq!(analyzed.tasks[1].response_time, Some(5));
    }

    #[test]
    fn cancellation_aborts() {
        let (set, chains) = scenario_ab();
        let flag = AtomicBool::new(true);
        assert_eq!(
            analyze_task_set(set, chains, &AnalysisConfig::default(), Some(&flag)).unwrap_err(),
            AnalysisError::Cancelled
        );
    }

    #[test]
    fn uniform_execution_keeps_the_ordering() {
        let set = TaskSet::new(vec![
            Task::new(1, 0, 1, 3, 10, 0),
            Task::new(2, 0, 2, 4, 20, 1),
            Task::new(3, 0, 1, 5, 40, 2),
        ])
        .unwrap();
        let chain = CauseEffectChain::new(0, vec![2, 0, 1], &set).unwrap();
        let config = AnalysisConfig::default()
            .with_execution(ExecutionModel::Uniform)
            .with_seed(7);
        let analyzed = analyze_task_set(set, vec![chain], &config, None).unwrap();
        let l = analyzed.chains[0].latencies;
        assert!(l.kloda.unwrap() >= l.our_react.unwrap());
        assert!(l.davare.unwrap() >= l.our_age.unwrap());
    }

    #[test]
    fn invariant_policy() {
        assert_eq!(
            check_kloda(ChainId(3), 4, Some(5), InvariantPolicy::Enforce),
            Err(AnalysisError::InvariantViolation {
                chain: ChainId(3),
                kloda: 4,
                exact: 5
            })
        );
        assert_eq!(check_kloda(ChainId(3), 4, Some(5), InvariantPolicy::Log), Ok(()));
        assert_eq!(check_kloda(ChainId(3), 5, Some(5), InvariantPolicy::Enforce), Ok(()));
        assert_eq!(check_kloda(ChainId(3), 4, None, InvariantPolicy::Enforce), Ok(()));
    }

    #[test]
    fn late_consumer_phase_is_not_a_violation() {
        let set = TaskSet::new(vec![
            Task::new(1, 0, 1, 1, 10, 0),
            Task::new(2, 50, 1, 1, 10, 1),
        ])
        .unwrap();
        let chain = CauseEffectChain::new(0, vec![0, 1], &set).unwrap();
        let config = AnalysisConfig::default().with_invariant_policy(InvariantPolicy::Enforce);
        let analyzed = analyze_task_set(set, vec![chain], &config, None).unwrap();
        let l = analyzed.chains[0].latencies;
        assert_eq!(analyzed.horizon.unwrap().steady_state(), 50..=60);
        // A runs [50, 51), B reads at 51 and publishes at 52
        assert_eq!(l.our_react, Some(2));
        assert_eq!(l.kloda, Some(12));
    }

    #[test]
    fn phased_sets_are_checked_synchronously() {
        let set = TaskSet::new(vec![
            Task::new(1, 0, 1, 1, 10, 0),
            Task::new(2, 5, 1, 1, 100, 1),
            Task::new(3, 4, 1, 1, 100, 2),
        ])
        .unwrap();
        let chain = CauseEffectChain::new(0, vec![0, 1, 2], &set).unwrap();
        let analyzed = analyze_task_set(set, vec![chain], &AnalysisConfig::default(), None).unwrap();
        let l = analyzed.chains[0].latencies;
        // with phases, the data of A at 10 waits for B at 105 and C at 204
        assert_eq!(l.our_react, Some(195));
        assert_eq!(l.kloda, Some(103));

        // the synchronous replay stays within the bound
        let sync = analyzed.tasks.synchronous();
        let (window, schedule) = simulate(&sync, 0, &AnalysisConfig::default(), None).unwrap();
        let react = exact::steady_state_reaction_time(
            &analyzed.chains[0],
            &schedule.envelopes(),
            &window,
        );
        assert_eq!(react, Some(93));
    }

    #[test]
    fn reduced_age_divergence_is_recorded() {
        // B's releases at 75, 85 and 95 miss the oldest data, read by
        // the job released at 55
        let set = TaskSet::new(vec![
            Task::new(1, 0, 1, 1, 7, 0),
            Task::new(2, 5, 1, 1, 10, 1),
        ])
        .unwrap();
        let chain = CauseEffectChain::new(4, vec![0, 1], &set).unwrap();
        let analyzed = analyze_task_set(set, vec![chain], &AnalysisConfig::default(), None).unwrap();
        let l = analyzed.chains[0].latencies;
        assert_eq!(l.davare, Some(20));
        assert_eq!(l.our_age, Some(17));
        assert_eq!(l.our_red_age, Some(16));
        assert_eq!(analyzed.reduced_age_diverged, vec![ChainId(4)]);
    }

    #[test]
    fn interconnected_pipeline() {
        let (set, chains) = scenario_ab();
        let analyzed = analyze_task_set(set, chains, &AnalysisConfig::default(), None).unwrap();
        let segment = LocalSegment::from_chain(&analyzed.chains[0], &analyzed.tasks).unwrap();

        let mut msg = task(7, 1, 20, 0).as_message();
        msg.response_time = Some(1);
        let mut chains = vec![InterconnectedChain::new(
            0,
            vec![
                Segment::Local(segment.clone()),
                Segment::Communication(msg),
                Segment::Local(segment),
            ],
        )
        .unwrap()];
        analyze_interconnected(&mut chains).unwrap();

        let l = chains[0].latencies;
        assert_eq!(l.inter_our_react, Some(5 + 21 + 5));
        assert_eq!(l.inter_our_age, Some(15 + 21 + 15));
        assert_eq!(l.inter_our_red_age, Some(15 + 21 + 15));
        // A, B, msg, A, B
        assert_eq!(l.davare, Some(27 + 21 + 27));
    }
}
