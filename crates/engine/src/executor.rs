// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pipeline executor (§4.4): a step-graph interpreter running one
//! pipeline's START → RUNNING → {COMPLETE | PAUSED | ERRORED} state machine
//! against a shared [`PipelineContext`].
//!
//! Modeled as an infallible function returning [`PipelineOutcome`] rather
//! than a `Result`: a step raising a structured pause/error, or any other
//! exception escaping a step body, is folded into a terminal pipeline state
//! instead of unwinding the call stack.

use crate::resolver::resolve_parameter;
use crate::step_group::{self, StepGroupOutcome};
use metalus_core::{
    ExecutionId, MappingError, Parameter, Pipeline, PipelineContext, PipelineDefId, PipelineStep,
    PipelineStepResponse, StepId, StepInvocationError, StepStopKind, StepType,
};
use std::collections::BTreeMap;

/// Terminal state of a single pipeline run (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Complete,
    Paused { step: StepId, message: Option<String> },
    Errored { step: StepId, message: String },
}

/// The result of running one step's body, independent of how it was
/// produced (registry invocation or a step-group), unifying the
/// pause/error folding logic below.
enum StepOutcome {
    Response(PipelineStepResponse),
    Paused(Option<String>),
    Errored(String),
}

/// Run `pipeline` to completion (or to its first pause/error) against
/// `ctx`, starting at its first declared step (§4.4: START → RUNNING).
pub fn run_pipeline(execution: &ExecutionId, pipeline: &Pipeline, ctx: &mut PipelineContext) -> PipelineOutcome {
    ctx.pipeline_listener.pipeline_started(execution, &pipeline.id);

    let Some(mut step) = pipeline.first_step() else {
        ctx.pipeline_listener.pipeline_finished(execution, &pipeline.id);
        return PipelineOutcome::Complete;
    };

    loop {
        ctx.pipeline_listener.step_started(execution, &pipeline.id, &step.id);

        let outcome = match resolve_execute_if_empty(step, ctx, &pipeline.id) {
            Ok(Some(response)) => StepOutcome::Response(response),
            Ok(None) => run_step(execution, pipeline, step, ctx),
            Err(e) => StepOutcome::Errored(e.to_string()),
        };

        match outcome {
            StepOutcome::Response(response) => {
                ctx.pipeline_listener.step_finished(execution, &pipeline.id, &step.id, &response);
                ctx.set_step_result(pipeline.id.clone(), step.id.clone(), response.clone());

                match next_step(pipeline, step, &response) {
                    Ok(Some(next_id)) => match pipeline.get_step(&next_id) {
                        Some(next) => step = next,
                        None => {
                            let message = format!("step '{}' references unknown next step '{next_id}'", step.id);
                            ctx.pipeline_listener.pipeline_errored(execution, &pipeline.id, &step.id, &message);
                            return PipelineOutcome::Errored { step: step.id.clone(), message };
                        }
                    },
                    Ok(None) => {
                        ctx.pipeline_listener.pipeline_finished(execution, &pipeline.id);
                        return PipelineOutcome::Complete;
                    }
                    Err(message) => {
                        ctx.pipeline_listener.pipeline_errored(execution, &pipeline.id, &step.id, &message);
                        return PipelineOutcome::Errored { step: step.id.clone(), message };
                    }
                }
            }
            StepOutcome::Paused(message) => {
                ctx.pipeline_listener.pipeline_paused(execution, &pipeline.id, &step.id);
                return PipelineOutcome::Paused {
                    step: step.id.clone(),
                    message,
                };
            }
            StepOutcome::Errored(message) => {
                ctx.pipeline_listener.pipeline_errored(execution, &pipeline.id, &step.id, &message);
                return PipelineOutcome::Errored {
                    step: step.id.clone(),
                    message,
                };
            }
        }
    }
}

/// Resolve `step.executeIfEmpty`; if its resolved value is non-empty, the
/// step body is skipped and that value becomes the stored result (§4.4).
fn resolve_execute_if_empty(
    step: &PipelineStep,
    ctx: &PipelineContext,
    pipeline_id: &PipelineDefId,
) -> Result<Option<PipelineStepResponse>, MappingError> {
    let Some(guard) = &step.execute_if_empty else {
        return Ok(None);
    };
    let resolved = resolve_parameter(guard, ctx, pipeline_id)?;
    if resolved.is_empty_value() {
        Ok(None)
    } else {
        Ok(Some(PipelineStepResponse::wrap(Some(resolved))))
    }
}

/// Resolve a step's params and invoke its body: a registered step body via
/// the registry, or an embedded pipeline via the step-group executor.
fn run_step(execution: &ExecutionId, pipeline: &Pipeline, step: &PipelineStep, ctx: &PipelineContext) -> StepOutcome {
    if step.is_step_group() {
        return match step_group::run_step_group(execution, &pipeline.id, step, ctx) {
            StepGroupOutcome::Response(response) => StepOutcome::Response(response),
            StepGroupOutcome::Paused(message) => StepOutcome::Paused(message),
            StepGroupOutcome::Errored(message) => StepOutcome::Errored(message),
        };
    }

    let Some(step_ref) = step.step_body_ref() else {
        return StepOutcome::Errored(format!("step '{}' has no step body reference", step.id));
    };

    let args = match resolve_args(&step.params, ctx, &pipeline.id) {
        Ok(args) => args,
        Err(e) => return StepOutcome::Errored(e.to_string()),
    };

    let callable = match ctx.parameter_mapper.resolve(&ctx.step_packages, step_ref, &args) {
        Ok(callable) => callable,
        Err(e) => return StepOutcome::Errored(e.to_string()),
    };

    match callable.invoke(args, ctx) {
        Ok(response) => StepOutcome::Response(response),
        Err(StepInvocationError::Mapping(e)) => StepOutcome::Errored(e.to_string()),
        Err(StepInvocationError::Fatal(e)) => StepOutcome::Errored(e.to_string()),
        Err(StepInvocationError::Step(step_error)) => match step_error.kind {
            StepStopKind::Pause => StepOutcome::Paused(step_error.message),
            StepStopKind::Error => StepOutcome::Errored(step_error.message.unwrap_or_else(|| "step error".to_string())),
        },
    }
}

/// Resolve every declared param, applying the security hook to each final
/// value (§4.3).
pub(crate) fn resolve_args(
    params: &[Parameter],
    ctx: &PipelineContext,
    pipeline_id: &PipelineDefId,
) -> Result<BTreeMap<String, metalus_core::Value>, MappingError> {
    let mut args = BTreeMap::new();
    for param in params {
        let resolved = resolve_parameter(param, ctx, pipeline_id)?;
        let secured = ctx.security_manager.secure_parameter(&param.name, resolved);
        args.insert(param.name.clone(), secured);
    }
    Ok(args)
}

/// Compute the next step id per §4.4's `nextStepId` rules; `Ok(None)` means
/// the pipeline completes.
fn next_step(
    pipeline: &Pipeline,
    step: &PipelineStep,
    response: &PipelineStepResponse,
) -> Result<Option<StepId>, String> {
    let _ = pipeline;
    match step.step_type {
        StepType::Branch => {
            let primary = response.primary().and_then(metalus_core::Value::as_str).ok_or_else(|| {
                format!("branch step '{}' primaryReturn is not a string", step.id)
            })?;
            let target = step.branch_target(primary).ok_or_else(|| {
                format!("branch step '{}' has no param named '{primary}'", step.id)
            })?;
            let next = target.value.as_str().ok_or_else(|| {
                format!("branch step '{}' target param '{primary}' is not a string", step.id)
            })?;
            Ok(Some(StepId::new(next)))
        }
        _ => Ok(step.next_step_id.clone()),
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
