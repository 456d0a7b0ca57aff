// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The execution-plan DAG scheduler (§4.7): dispatches a set of
//! [`PipelineExecution`]s, each waiting for its parents to reach a
//! terminal state before running its own chain of pipelines.

use crate::executor::{run_pipeline, PipelineOutcome};
use metalus_core::{
    ConfigError, ExecutionId, PipelineContext, PipelineDefId, PipelineExecution, PipelineListener, PipelineManager,
    SecurityManager, StepId, StepRegistry, Value,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::watch;

/// Terminal state of a single execution (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalState {
    Complete {
        globals: HashMap<String, Value>,
        pipeline_parameters: HashMap<String, Value>,
    },
    Paused {
        step: StepId,
        message: Option<String>,
    },
    Errored {
        step: StepId,
        message: String,
    },
    /// A parent terminated non-COMPLETE; this execution was never dispatched.
    Skipped,
}

/// The plan's overall result: COMPLETE iff every execution is COMPLETE,
/// otherwise the first non-complete terminal state in topological order
/// (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Complete,
    Paused {
        execution: ExecutionId,
        step: StepId,
        message: Option<String>,
    },
    Errored {
        execution: ExecutionId,
        step: StepId,
        message: String,
    },
    Skipped {
        execution: ExecutionId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanReport {
    pub states: HashMap<ExecutionId, TerminalState>,
    pub outcome: PlanOutcome,
}

/// Runs a fixed set of [`PipelineExecution`]s to their terminal states
/// (§4.7). The `pipelineManager` and step registry are shared read-only
/// across every execution (§5); `defaultGlobals` seed every execution's
/// context before its own `globals` override is applied.
pub struct ExecutionPlanScheduler {
    executions: Vec<PipelineExecution>,
    pipeline_manager: Arc<PipelineManager>,
    step_registry: Arc<StepRegistry>,
    default_globals: HashMap<String, Value>,
    default_listener: Arc<dyn PipelineListener>,
    default_security_manager: Arc<dyn SecurityManager>,
    step_packages: Vec<String>,
}

impl ExecutionPlanScheduler {
    pub fn new(
        executions: Vec<PipelineExecution>,
        pipeline_manager: Arc<PipelineManager>,
        step_registry: Arc<StepRegistry>,
        default_globals: HashMap<String, Value>,
        default_listener: Arc<dyn PipelineListener>,
        default_security_manager: Arc<dyn SecurityManager>,
        step_packages: Vec<String>,
    ) -> Self {
        Self {
            executions,
            pipeline_manager,
            step_registry,
            default_globals,
            default_listener,
            default_security_manager,
            step_packages,
        }
    }

    /// Build a scheduler from a parsed [`metalus_config::Application`]
    /// (§6): merges the pipeline library with every execution's inline
    /// pipelines, converts each `ExecutionDef` into a core
    /// [`PipelineExecution`], and seeds plan-level default globals.
    pub fn from_application(
        application: &metalus_config::Application,
        default_listener: Arc<dyn PipelineListener>,
        default_security_manager: Arc<dyn SecurityManager>,
        step_registry: Arc<StepRegistry>,
        step_packages: Vec<String>,
    ) -> Result<Self, ConfigError> {
        application.validate()?;

        let mut manager = PipelineManager::new();
        for pipeline in &application.pipelines {
            manager.insert(pipeline.clone());
        }

        let mut executions = Vec::with_capacity(application.executions.len());
        for exec_def in &application.executions {
            let mut pipeline_ids: Vec<_> = exec_def.pipeline_ids.iter().map(|id| PipelineDefId::new(id.as_str())).collect();
            for inline in &exec_def.pipelines {
                manager.insert(inline.clone());
                pipeline_ids.push(inline.id.clone());
            }

            let parents = exec_def.parents.iter().map(|id| ExecutionId::new(id.as_str())).collect::<Vec<_>>();
            let mut execution = PipelineExecution::new(ExecutionId::new(exec_def.id.as_str()), pipeline_ids)
                .with_parents(parents);
            execution.globals = exec_def.globals.clone();
            execution.pipeline_parameters = exec_def.pipeline_parameters.clone();
            executions.push(execution);
        }

        Ok(Self::new(
            executions,
            Arc::new(manager),
            step_registry,
            application.globals.clone(),
            default_listener,
            default_security_manager,
            step_packages,
        ))
    }

    /// Re-parse `application` and return a fresh, unstarted scheduler
    /// sharing this scheduler's collaborators (§4.7 Refresh). This
    /// scheduler holds no persistent run state between calls to
    /// [`Self::run`], so the "no in-flight executions" precondition is
    /// satisfied trivially by construction rather than by a runtime guard.
    pub fn refresh(&self, application: &metalus_config::Application) -> Result<Self, ConfigError> {
        Self::from_application(
            application,
            self.default_listener.clone(),
            self.default_security_manager.clone(),
            self.step_registry.clone(),
            self.step_packages.clone(),
        )
    }

    /// Validate the parent graph is acyclic (§4.7 Startup).
    fn validate_acyclic(&self) -> Result<Vec<ExecutionId>, ConfigError> {
        topological_order(&self.executions)
    }

    /// Run every execution to completion and report the plan's outcome.
    ///
    /// Each execution waits on a [`watch`] channel per parent rather than a
    /// [`tokio::sync::Notify`]: a `watch` receiver always observes the most
    /// recently sent value even if it subscribes after the send, so a child
    /// task spawned (and possibly polled) after its parent has already
    /// finished still sees the parent's terminal state instead of waiting on
    /// a wakeup that already fired.
    pub async fn run(&self) -> Result<PlanReport, ConfigError> {
        let order = self.validate_acyclic()?;

        let mut own_channels = Vec::with_capacity(self.executions.len());
        let mut receivers: HashMap<ExecutionId, watch::Receiver<Option<TerminalState>>> = HashMap::new();
        for execution in &self.executions {
            let (tx, rx) = watch::channel(None);
            receivers.insert(execution.id.clone(), rx);
            own_channels.push((execution.clone(), tx));
        }

        let states: Arc<Mutex<HashMap<ExecutionId, TerminalState>>> = Arc::new(Mutex::new(HashMap::new()));

        let mut handles = Vec::with_capacity(own_channels.len());
        for (execution, own_tx) in own_channels {
            let states = states.clone();
            let parent_rxs: Vec<(ExecutionId, watch::Receiver<Option<TerminalState>>)> = execution
                .parents
                .iter()
                .filter_map(|parent| receivers.get(parent).map(|rx| (parent.clone(), rx.clone())))
                .collect();
            let pipeline_manager = self.pipeline_manager.clone();
            let step_registry = self.step_registry.clone();
            let default_globals = self.default_globals.clone();
            let default_listener = self.default_listener.clone();
            let default_security_manager = self.default_security_manager.clone();
            let step_packages = self.step_packages.clone();

            handles.push(tokio::spawn(async move {
                let mut parent_states = HashMap::with_capacity(parent_rxs.len());
                for (parent_id, mut rx) in parent_rxs {
                    loop {
                        let observed = rx.borrow().clone();
                        if let Some(terminal) = observed {
                            parent_states.insert(parent_id, terminal);
                            break;
                        }
                        if rx.changed().await.is_err() {
                            break;
                        }
                    }
                }

                let terminal = run_execution(
                    &execution,
                    &parent_states,
                    &pipeline_manager,
                    &step_registry,
                    &default_globals,
                    &default_listener,
                    &default_security_manager,
                    &step_packages,
                );

                states.lock().insert(execution.id.clone(), terminal.clone());
                let _ = own_tx.send(Some(terminal));
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }

        let states = states.lock().clone();
        let outcome = plan_outcome(&order, &states);
        Ok(PlanReport { states, outcome })
    }
}

#[allow(clippy::too_many_arguments)]
fn run_execution(
    execution: &PipelineExecution,
    parent_states: &HashMap<ExecutionId, TerminalState>,
    pipeline_manager: &Arc<PipelineManager>,
    step_registry: &Arc<StepRegistry>,
    default_globals: &HashMap<String, Value>,
    default_listener: &Arc<dyn PipelineListener>,
    default_security_manager: &Arc<dyn SecurityManager>,
    step_packages: &[String],
) -> TerminalState {
    for parent in &execution.parents {
        match parent_states.get(parent) {
            Some(TerminalState::Complete { .. }) => {}
            Some(_) | None => return TerminalState::Skipped,
        }
    }

    let mut globals = default_globals.clone();
    globals.extend(execution.globals.clone());

    for parent in &execution.parents {
        if let Some(TerminalState::Complete {
            globals: parent_globals,
            pipeline_parameters: parent_params,
        }) = parent_states.get(parent)
        {
            let mut merged = BTreeMap::new();
            merged.insert(
                "globals".to_string(),
                Value::Map(parent_globals.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            );
            merged.insert(
                "pipelineParameters".to_string(),
                Value::Map(parent_params.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            );
            globals.insert(parent.to_string(), Value::Map(merged));
        }
    }

    let listener = execution.pipeline_listener.clone().unwrap_or_else(|| default_listener.clone());
    let security_manager = execution
        .security_manager
        .clone()
        .unwrap_or_else(|| default_security_manager.clone());

    let mut ctx = PipelineContext::new(
        globals,
        pipeline_manager.clone(),
        security_manager,
        listener,
        step_registry.clone(),
        step_packages.to_vec(),
    );
    ctx.strip_reserved_globals();

    for pipeline_id in &execution.pipelines {
        let Some(pipeline) = pipeline_manager.get(pipeline_id) else {
            return TerminalState::Errored {
                step: StepId::new(""),
                message: format!("execution '{}' references unknown pipeline '{pipeline_id}'", execution.id),
            };
        };
        match run_pipeline(&execution.id, pipeline, &mut ctx) {
            PipelineOutcome::Complete => continue,
            PipelineOutcome::Paused { step, message } => return TerminalState::Paused { step, message },
            PipelineOutcome::Errored { step, message } => return TerminalState::Errored { step, message },
        }
    }

    TerminalState::Complete {
        globals: ctx.globals,
        pipeline_parameters: execution.pipeline_parameters.clone(),
    }
}

/// Kahn's algorithm over the executions' `parents` edges; returns
/// [`ConfigError::CyclicExecutionGraph`] if any execution is left
/// unvisited after the queue drains.
fn topological_order(executions: &[PipelineExecution]) -> Result<Vec<ExecutionId>, ConfigError> {
    let mut children: HashMap<&ExecutionId, Vec<&ExecutionId>> = HashMap::new();
    let mut in_degree: HashMap<&ExecutionId, usize> = HashMap::new();
    for execution in executions {
        in_degree.entry(&execution.id).or_insert(0);
        for parent in &execution.parents {
            children.entry(parent).or_default().push(&execution.id);
            *in_degree.entry(&execution.id).or_insert(0) += 1;
        }
    }

    let mut queue: Vec<&ExecutionId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    queue.sort();

    let mut order = Vec::with_capacity(executions.len());
    let mut cursor = 0;
    while cursor < queue.len() {
        let id = queue[cursor];
        cursor += 1;
        order.push(id.clone());
        if let Some(kids) = children.get(id) {
            let mut ready = Vec::new();
            for child in kids {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(*child);
                    }
                }
            }
            ready.sort();
            queue.extend(ready);
        }
    }

    if order.len() == executions.len() {
        Ok(order)
    } else {
        Err(ConfigError::CyclicExecutionGraph)
    }
}

fn plan_outcome(order: &[ExecutionId], states: &HashMap<ExecutionId, TerminalState>) -> PlanOutcome {
    for id in order {
        match states.get(id) {
            Some(TerminalState::Complete { .. }) | None => continue,
            Some(TerminalState::Paused { step, message }) => {
                return PlanOutcome::Paused {
                    execution: id.clone(),
                    step: step.clone(),
                    message: message.clone(),
                };
            }
            Some(TerminalState::Errored { step, message }) => {
                return PlanOutcome::Errored {
                    execution: id.clone(),
                    step: step.clone(),
                    message: message.clone(),
                };
            }
            Some(TerminalState::Skipped) => {
                return PlanOutcome::Skipped { execution: id.clone() };
            }
        }
    }
    PlanOutcome::Complete
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
