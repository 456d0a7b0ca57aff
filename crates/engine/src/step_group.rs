// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The step-group executor (§4.5): runs an embedded pipeline in an
//! isolated child context and projects its outcome back into the parent
//! step's result.

use crate::executor::{run_pipeline, PipelineOutcome};
use crate::resolver::{resolve_parameter, response_to_value};
use metalus_core::{
    ExecutionId, Pipeline, PipelineContext, PipelineDefId, PipelineStep, PipelineStepResponse, StepGroupRef,
    Value,
};
use std::collections::BTreeMap;

pub enum StepGroupOutcome {
    Response(PipelineStepResponse),
    Paused(Option<String>),
    Errored(String),
}

const PIPELINE_MAPPINGS_PARAM: &str = "pipelineMappings";

/// Run the pipeline embedded in `step` (by id or inline) against a fresh
/// child context, then project its terminal state into the owning step's
/// result (§4.5).
pub fn run_step_group(
    execution: &ExecutionId,
    outer_pipeline: &PipelineDefId,
    step: &PipelineStep,
    ctx: &PipelineContext,
) -> StepGroupOutcome {
    let group_ref = match &step.engine_meta {
        metalus_core::EngineMeta::StepGroup(r) => r,
        metalus_core::EngineMeta::StepBody(_) => {
            return StepGroupOutcome::Errored(format!(
                "step '{}' is typed step-group but has no embedded pipeline reference",
                step.id
            ));
        }
    };

    let embedded = match group_ref {
        StepGroupRef::ById { pipeline_id } => match ctx.pipeline_manager.get(pipeline_id) {
            Some(pipeline) => pipeline.clone(),
            None => {
                return StepGroupOutcome::Errored(format!(
                    "step '{}' references unknown embedded pipeline '{pipeline_id}'",
                    step.id
                ));
            }
        },
        StepGroupRef::Inline { pipeline } => (**pipeline).clone(),
    };

    let child_globals = match resolve_child_globals(step, ctx, outer_pipeline) {
        Ok(globals) => globals,
        Err(e) => return StepGroupOutcome::Errored(e.to_string()),
    };

    let mut child_ctx = PipelineContext::new(
        child_globals,
        ctx.pipeline_manager.clone(),
        ctx.security_manager.clone(),
        ctx.pipeline_listener.clone(),
        ctx.parameter_mapper.clone(),
        ctx.step_packages.clone(),
    );

    match run_pipeline(execution, &embedded, &mut child_ctx) {
        PipelineOutcome::Complete => StepGroupOutcome::Response(project_result(&embedded, &child_ctx)),
        PipelineOutcome::Paused { message, .. } => StepGroupOutcome::Paused(message),
        PipelineOutcome::Errored { message, .. } => StepGroupOutcome::Errored(message),
    }
}

/// Resolve `pipelineMappings`: the child's entire globals, replacing any
/// parent globals rather than merging with them (§4.5).
fn resolve_child_globals(
    step: &PipelineStep,
    ctx: &PipelineContext,
    outer_pipeline: &PipelineDefId,
) -> Result<std::collections::HashMap<String, Value>, metalus_core::MappingError> {
    let Some(mappings) = step.params.iter().find(|p| p.name == PIPELINE_MAPPINGS_PARAM) else {
        return Ok(std::collections::HashMap::new());
    };
    let resolved = resolve_parameter(mappings, ctx, outer_pipeline)?;
    Ok(resolved
        .as_map()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .collect())
}

/// Project the child's final context into a `PipelineStepResponse` (§4.5):
/// `primaryReturn` is the designated `stepGroupResult` step's result, or
/// the entire child parameters map when unspecified; `namedReturns` maps
/// every step id to its result.
fn project_result(embedded: &Pipeline, child_ctx: &PipelineContext) -> PipelineStepResponse {
    let results = child_ctx.pipeline_results(&embedded.id);

    let primary_return = match &embedded.step_group_result {
        Some(step_id) => results
            .and_then(|steps| steps.get(step_id))
            .and_then(PipelineStepResponse::primary)
            .cloned()
            .unwrap_or_else(Value::absent),
        None => {
            let mut whole = BTreeMap::new();
            if let Some(steps) = results {
                for (id, response) in steps {
                    whole.insert(id.to_string(), response_to_value(response));
                }
            }
            Value::Map(whole)
        }
    };

    let mut named_returns = BTreeMap::new();
    if let Some(steps) = results {
        for (id, response) in steps {
            named_returns.insert(id.to_string(), response_to_value(response));
        }
    }

    PipelineStepResponse::new(Some(primary_return), Some(named_returns))
}

#[cfg(test)]
#[path = "step_group_tests.rs"]
mod tests;
