use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use super::import::{import, ImportedSystem};
use super::schema::{
    ChainLink, Constraint, Dependency, DependencyInstance, DependencyInstances, EventChain,
    EventChainInstance, InstanceEvent, LetSchedule, LetSystem, LetTask, NamedDependencyInstance,
    PortRef, SystemPort, TaskInstance, TaskInstances, TimeInterval,
};
use super::{SYSTEM_INPUT, SYSTEM_OUTPUT, SYSTEM_TASK};
use crate::analysis::{analyze_task_set, simulate, AnalyzedTaskSet};
use crate::config::AnalysisConfig;
use crate::dispatcher::{Envelopes, Schedule};
use crate::error::{AnalysisError, AnalysisResult, Budget};
use crate::linker::{first_reader, producer_of};
use crate::model::{CauseEffectChain, Task, TaskSet};
use crate::time::{checked_lcm, gcd, Duration};

/// Analyze a LET system and attach its schedule.
///
/// The result carries the input stores, the instances of every
/// task, dependency and event chain, and one reaction-time constraint
/// per event chain.
pub fn schedule_system(system: &LetSystem, config: &AnalysisConfig) -> AnalysisResult<LetSchedule> {
    let imported = import(system, config)?;
    let AnalyzedTaskSet {
        tasks,
        chains,
        schedule,
        ..
    } = analyze_task_set(imported.tasks.clone(), imported.chains.clone(), config, None)?;
    let schedule = match schedule {
        Some(schedule) => schedule,
        None => simulate(&tasks, 0, config, None)?.1,
    };
    let envelopes = schedule.envelopes();

    let dependency_instances = system
        .dependencies
        .iter()
        .map(|d| dependency_instances(d, &imported, &envelopes, config))
        .collect::<AnalysisResult<Vec<_>>>()?;
    let by_name: HashMap<&str, &DependencyInstances> = dependency_instances
        .iter()
        .map(|d| (d.name.as_str(), d))
        .collect();
    let event_chain_instances: Vec<EventChainInstance> = system
        .event_chains
        .iter()
        .flat_map(|ec| event_chain_instances(ec, &by_name))
        .collect();

    let mut constraints = system.constraints.clone();
    for (ec, chain) in system.event_chains.iter().zip(&chains) {
        if let Some(react) = chain.latencies.our_react {
            let constraint = reaction_constraint(&ec.name, config.from_ticks(react));
            constraints.retain(|c| c.name != constraint.name);
            constraints.push(constraint);
        }
    }

    info!(
        tasks = system.tasks.len(),
        chain_instances = event_chain_instances.len(),
        "LET schedule computed"
    );
    Ok(LetSchedule {
        system: LetSystem {
            constraints,
            ..system.clone()
        },
        task_instances: task_instances(&imported, &tasks, &schedule, config),
        dependency_instances,
        event_chain_instances,
    })
}

fn reaction_constraint(chain: &str, time: f64) -> Constraint {
    Constraint {
        name: format!("{}-reaction-time", chain),
        event_chain: chain.to_string(),
        relation: "<=".to_string(),
        time,
    }
}

fn task_instances(
    imported: &ImportedSystem,
    tasks: &TaskSet,
    schedule: &Schedule,
    config: &AnalysisConfig,
) -> Vec<TaskInstances> {
    let t = |ticks| config.from_ticks(ticks);
    tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| !task.is_system())
        .map(|(i, task)| TaskInstances {
            name: imported.name_of(i).to_string(),
            initial_offset: t(task.phase),
            value: schedule
                .jobs(i)
                .iter()
                .map(|job| TaskInstance {
                    instance: job.instance,
                    period_start_time: t(job.release),
                    let_start_time: t(job.start()),
                    let_end_time: t(job.end()),
                    period_end_time: t(job.release + task.period),
                    execution_time: t(job.execution_time),
                    execution_intervals: job
                        .intervals
                        .iter()
                        .map(|iv| TimeInterval {
                            start_time: t(iv.start),
                            end_time: t(iv.end),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Pair every consumer job with the closest preceding producer job.
fn dependency_instances(
    dependency: &Dependency,
    imported: &ImportedSystem,
    envelopes: &Envelopes,
    config: &AnalysisConfig,
) -> AnalysisResult<DependencyInstances> {
    let index = |task: &str| {
        imported
            .index_of(task)
            .ok_or_else(|| AnalysisError::unsupported(format!("unknown task {}", task)))
    };
    let producers = envelopes.task(index(&dependency.source.task)?);
    let consumers = envelopes.task(index(&dependency.destination.task)?);

    let value = consumers
        .iter()
        .filter_map(|consumer| {
            let producer = producers[producer_of(producers, consumer)?];
            Some(DependencyInstance {
                instance: consumer.instance,
                receive_event: InstanceEvent {
                    task: dependency.destination.task.clone(),
                    port: dependency.destination.port.clone(),
                    task_instance: consumer.instance,
                    timestamp: config.from_ticks(consumer.start),
                },
                send_event: InstanceEvent {
                    task: dependency.source.task.clone(),
                    port: dependency.source.port.clone(),
                    task_instance: producer.instance,
                    timestamp: config.from_ticks(producer.end),
                },
            })
        })
        .collect();
    Ok(DependencyInstances {
        name: dependency.name.clone(),
        value,
    })
}

/// One instance per instance of the chain's first dependency, extended
/// by the first instance of each successor dependency that sends from
/// the current receiving job or a later one. Instances that cannot be
/// completed are dropped.
fn event_chain_instances(
    chain: &EventChain,
    store: &HashMap<&str, &DependencyInstances>,
) -> Vec<EventChainInstance> {
    let segments = chain.link.segments();
    let lists = match segments
        .iter()
        .map(|s| store.get(s.name.as_str()).map(|d| d.value.as_slice()))
        .collect::<Option<Vec<_>>>()
    {
        Some(lists) => lists,
        None => return Vec::new(),
    };
    let named = |name: &str, instance: &DependencyInstance| NamedDependencyInstance {
        name: name.to_string(),
        instance: instance.clone(),
    };

    let instances: Vec<_> = lists[0]
        .iter()
        .enumerate()
        .filter_map(|(i, head)| {
            let mut linked = vec![named(&segments[0].name, head)];
            let mut current = head;
            for (segment, list) in segments[1..].iter().zip(&lists[1..]) {
                let next = first_reader(*list, current.receive_event.task_instance, |d| {
                    d.send_event.task_instance
                })?;
                current = &list[next];
                linked.push(named(&segment.name, current));
            }
            Some(EventChainInstance {
                name: format!("{}-{}", chain.name, i),
                link: ChainLink::from_segments(linked)?,
            })
        })
        .collect();
    debug!(
        chain = %chain.name,
        complete = instances.len(),
        dropped = lists[0].len() - instances.len(),
        "event chain instances"
    );
    instances
}

/// Recompute the maximum reaction time of every event chain from the
/// instance stores of an exported schedule.
///
/// Each chain instance is caused by the jobs of the first task that
/// its first dependency instance covers, i.e., those after the
/// producer of the previous instance up to its own producer. The
/// reaction time runs from the release of the earliest of them that
/// lies in the first hyperperiod after the largest initial offset to
/// the end of the chain's last job.
pub fn reaction_times_from_export(
    schedule: &LetSchedule,
    config: &AnalysisConfig,
) -> AnalysisResult<BTreeMap<String, f64>> {
    let jobs: HashMap<&str, &TaskInstances> = schedule
        .task_instances
        .iter()
        .map(|t| (t.name.as_str(), t))
        .collect();
    let mut system_period = 0;
    let mut hyperperiod = 1;
    let mut max_phase = 0;
    for t in &schedule.system.tasks {
        let period = config.to_ticks(t.period)?;
        system_period = gcd(system_period, period);
        hyperperiod = checked_lcm(hyperperiod, period).ok_or(AnalysisError::ResourceExhausted {
            budget: Budget::Hyperperiod,
            limit: u64::MAX,
        })?;
        max_phase = max_phase.max(config.to_ticks(t.initial_offset)?);
    }
    let steady_state = max_phase..=max_phase.saturating_add(hyperperiod);

    let job = |task: &str, instance: u64| {
        jobs.get(task)
            .and_then(|t| t.value.iter().find(|j| j.instance == instance))
            .ok_or_else(|| {
                AnalysisError::unsupported(format!("no instance {} of task {}", instance, task))
            })
    };
    let release = |task: &str, instance: u64| {
        if task == SYSTEM_TASK {
            Ok(instance * system_period)
        } else {
            job(task, instance).and_then(|j| config.to_ticks(j.period_start_time))
        }
    };
    let completion = |event: &InstanceEvent| {
        if event.task == SYSTEM_TASK {
            config.to_ticks(event.timestamp)
        } else {
            job(&event.task, event.task_instance).and_then(|j| config.to_ticks(j.let_end_time))
        }
    };

    let mut reactions = BTreeMap::new();
    for chain in &schedule.system.event_chains {
        let prefix = format!("{}-", chain.name);
        let mut previous: Option<u64> = None;
        let mut worst: Option<Duration> = None;
        for instance in schedule.event_chain_instances.iter().filter(|i| {
            i.name
                .strip_prefix(&prefix)
                .map_or(false, |n| n.parse::<u64>().is_ok())
        }) {
            let segments = instance.link.segments();
            let head = &segments[0].instance.send_event;
            let cause = previous.map_or(0, |p| p + 1);
            previous = Some(head.task_instance);

            let mut first_release = None;
            for k in cause..=head.task_instance {
                let r = release(&head.task, k)?;
                if steady_state.contains(&r) {
                    first_release = Some(r);
                    break;
                }
            }
            // no new data reaches this instance within the steady state
            let first_release = match first_release {
                Some(r) => r,
                None => continue,
            };
            let last = &segments[segments.len() - 1].instance.receive_event;
            let reaction = completion(last)?.saturating_sub(first_release);
            worst = Some(worst.map_or(reaction, |w| w.max(reaction)));
        }
        if let Some(worst) = worst {
            reactions.insert(chain.name.clone(), config.from_ticks(worst));
        }
    }
    Ok(reactions)
}

fn task_name(task: &Task) -> String {
    if task.is_system() {
        SYSTEM_TASK.to_string()
    } else {
        format!("task{}", task.id)
    }
}

/// Describe an analyzed task set as a LET system.
///
/// Every hop of every chain becomes a dependency `dep_<chain>_<from>_<to>`,
/// every chain an event chain `chain_<id>` with a reaction-time
/// constraint if its exact reaction time is known. Chains of a single
/// task have no dependencies and are left out.
pub fn describe(tasks: &TaskSet, chains: &[CauseEffectChain], config: &AnalysisConfig) -> LetSystem {
    let t = |ticks| config.from_ticks(ticks);
    let mut system = LetSystem {
        tasks: tasks
            .iter()
            .filter(|task| !task.is_system())
            .map(|task| LetTask {
                name: task_name(task),
                initial_offset: t(task.phase),
                activation_offset: 0.0,
                duration: t(task.deadline),
                period: t(task.period),
                inputs: vec!["in".to_string()],
                outputs: vec!["out".to_string()],
                wcet: t(task.wcet),
                bcet: t(task.bcet),
                acet: Some((t(task.bcet) + t(task.wcet)) / 2.0),
                distribution: Some("Uniform".to_string()),
            })
            .collect(),
        ..LetSystem::default()
    };

    for chain in chains {
        let path = chain.resolve(tasks);
        let dependencies: Vec<Dependency> = path
            .windows(2)
            .map(|hop| Dependency {
                name: format!("dep_{}_{}_{}", chain.id, hop[0].id, hop[1].id),
                source: PortRef {
                    task: task_name(hop[0]),
                    port: (if hop[0].is_system() { SYSTEM_INPUT } else { "out" }).to_string(),
                },
                destination: PortRef {
                    task: task_name(hop[1]),
                    port: (if hop[1].is_system() { SYSTEM_OUTPUT } else { "in" }).to_string(),
                },
            })
            .collect();
        system.dependencies.extend(dependencies.iter().cloned());
        let link = match ChainLink::from_segments(dependencies) {
            Some(link) => link,
            None => {
                debug!(chain = %chain.id, "single-task chain left out");
                continue;
            }
        };
        let name = format!("chain_{}", chain.id);
        if let Some(react) = chain.latencies.our_react {
            system.constraints.push(reaction_constraint(&name, t(react)));
        }
        system.event_chains.push(EventChain { name, link });
    }

    let uses = |port: &str| {
        system
            .dependencies
            .iter()
            .any(|d| d.source.port == port || d.destination.port == port)
    };
    let (input, output) = (uses(SYSTEM_INPUT), uses(SYSTEM_OUTPUT));
    if input {
        system.system_inputs.push(SystemPort {
            name: SYSTEM_INPUT.to_string(),
        });
    }
    if output {
        system.system_outputs.push(SystemPort {
            name: SYSTEM_OUTPUT.to_string(),
        });
    }
    system
}
