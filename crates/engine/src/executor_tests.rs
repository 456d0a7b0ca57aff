// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use metalus_core::{
    AuditTrail, EngineMeta, NoopSecurityManager, Overload, ParamKind, ParamSpec, ParameterType, PipelineCategory,
    PipelineManager, StepError, StepRegistry, StepType,
};
use std::sync::Arc;

fn test_context(registry: StepRegistry) -> PipelineContext {
    PipelineContext::new(
        std::collections::HashMap::new(),
        Arc::new(PipelineManager::new()),
        Arc::new(NoopSecurityManager),
        Arc::new(AuditTrail::new()),
        Arc::new(registry),
        vec!["pkg".to_string()],
    )
}

fn identity_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.register_step(
        "pkg",
        "Value.identity",
        Overload::new(vec![ParamSpec::new("input", ParamKind::Any)], |args, _ctx| {
            Ok(PipelineStepResponse::wrap(args.get("input").cloned()))
        }),
    );
    registry
}

fn identity_step(id: &str, input: metalus_core::Value, next: Option<&str>) -> PipelineStep {
    PipelineStep {
        id: StepId::new(id),
        display_name: None,
        description: None,
        step_type: StepType::Pipeline,
        params: vec![metalus_core::Parameter::new("input", ParameterType::Text, input)],
        engine_meta: EngineMeta::StepBody("Value.identity".to_string()),
        next_step_id: next.map(StepId::new),
        execute_if_empty: None,
    }
}

fn pipeline(id: &str, steps: Vec<PipelineStep>) -> Pipeline {
    Pipeline {
        id: PipelineDefId::new(id),
        name: id.to_string(),
        category: PipelineCategory::Pipeline,
        steps,
        step_group_result: None,
    }
}

#[test]
fn a_linear_pipeline_runs_to_completion() {
    let steps = vec![
        identity_step("s1", metalus_core::Value::Int(1), Some("s2")),
        identity_step("s2", metalus_core::Value::Int(2), None),
    ];
    let pipeline = pipeline("p1", steps);
    let mut ctx = test_context(identity_registry());

    let outcome = run_pipeline(&ExecutionId::new("e1"), &pipeline, &mut ctx);
    assert_eq!(outcome, PipelineOutcome::Complete);
    assert_eq!(
        ctx.step_result(&pipeline.id, &StepId::new("s2")).and_then(|r| r.primary()),
        Some(&metalus_core::Value::Int(2))
    );
}

/// S2 — Branch.
#[test]
fn branch_step_routes_by_matching_parameter_name() {
    let branch_step = PipelineStep {
        id: StepId::new("s1"),
        display_name: None,
        description: None,
        step_type: StepType::Branch,
        params: vec![
            metalus_core::Parameter::text("left", "s2"),
            metalus_core::Parameter::text("right", "s3"),
        ],
        engine_meta: EngineMeta::StepBody("Branch.choose".to_string()),
        next_step_id: None,
        execute_if_empty: None,
    };
    let s2 = identity_step("s2", metalus_core::Value::String("reached-s2".into()), None);
    let s3 = identity_step("s3", metalus_core::Value::String("reached-s3".into()), None);

    let mut registry = identity_registry();
    registry.register_step(
        "pkg",
        "Branch.choose",
        Overload::new(vec![], |_args, _ctx| {
            Ok(PipelineStepResponse::wrap(Some(metalus_core::Value::String("left".into()))))
        }),
    );

    let pipeline = pipeline("p1", vec![branch_step, s2, s3]);
    let mut ctx = test_context(registry);

    let outcome = run_pipeline(&ExecutionId::new("e1"), &pipeline, &mut ctx);
    assert_eq!(outcome, PipelineOutcome::Complete);
    assert!(ctx.step_result(&pipeline.id, &StepId::new("s2")).is_some());
    assert!(ctx.step_result(&pipeline.id, &StepId::new("s3")).is_none());
}

#[test]
fn execute_if_empty_short_circuits_with_the_resolved_value() {
    let mut step = identity_step("s1", metalus_core::Value::Int(0), None);
    step.execute_if_empty = Some(metalus_core::Parameter::text("guard", "preseeded"));

    let pipeline = pipeline("p1", vec![step]);
    let mut ctx = test_context(identity_registry());

    run_pipeline(&ExecutionId::new("e1"), &pipeline, &mut ctx);
    assert_eq!(
        ctx.step_result(&pipeline.id, &StepId::new("s1")).and_then(|r| r.primary()),
        Some(&metalus_core::Value::String("preseeded".into()))
    );
}

#[test]
fn execute_if_empty_does_not_skip_when_resolved_value_is_empty() {
    let mut step = identity_step("s1", metalus_core::Value::Int(9), None);
    step.execute_if_empty = Some(metalus_core::Parameter::text("guard", ""));

    let pipeline = pipeline("p1", vec![step]);
    let mut ctx = test_context(identity_registry());

    run_pipeline(&ExecutionId::new("e1"), &pipeline, &mut ctx);
    assert_eq!(
        ctx.step_result(&pipeline.id, &StepId::new("s1")).and_then(|r| r.primary()),
        Some(&metalus_core::Value::Int(9))
    );
}

#[test]
fn step_raising_a_pause_stops_the_pipeline_paused() {
    let mut registry = StepRegistry::new();
    registry.register_step(
        "pkg",
        "Flow.pause",
        Overload::new(vec![], |_args, _ctx| Err(StepError::pause("waiting on input".to_string()).into())),
    );
    let step = PipelineStep {
        id: StepId::new("s1"),
        display_name: None,
        description: None,
        step_type: StepType::Pipeline,
        params: vec![],
        engine_meta: EngineMeta::StepBody("Flow.pause".to_string()),
        next_step_id: None,
        execute_if_empty: None,
    };
    let pipeline = pipeline("p1", vec![step]);
    let mut ctx = test_context(registry);

    let outcome = run_pipeline(&ExecutionId::new("e1"), &pipeline, &mut ctx);
    assert_eq!(
        outcome,
        PipelineOutcome::Paused {
            step: StepId::new("s1"),
            message: Some("waiting on input".to_string()),
        }
    );
}

#[test]
fn step_raising_an_error_stops_the_pipeline_errored() {
    let mut registry = StepRegistry::new();
    registry.register_step(
        "pkg",
        "Flow.fail",
        Overload::new(vec![], |_args, _ctx| Err(StepError::error("boom".to_string()).into())),
    );
    let step = PipelineStep {
        id: StepId::new("s1"),
        display_name: None,
        description: None,
        step_type: StepType::Pipeline,
        params: vec![],
        engine_meta: EngineMeta::StepBody("Flow.fail".to_string()),
        next_step_id: None,
        execute_if_empty: None,
    };
    let pipeline = pipeline("p1", vec![step]);
    let mut ctx = test_context(registry);

    let outcome = run_pipeline(&ExecutionId::new("e1"), &pipeline, &mut ctx);
    match outcome {
        PipelineOutcome::Errored { step, message } => {
            assert_eq!(step, StepId::new("s1"));
            assert_eq!(message, "boom");
        }
        other => panic!("expected Errored, got {other:?}"),
    }
}

#[test]
fn dangling_next_step_id_is_reported_as_errored() {
    let step = identity_step("s1", metalus_core::Value::Int(1), Some("ghost"));
    let pipeline = pipeline("p1", vec![step]);
    let mut ctx = test_context(identity_registry());

    let outcome = run_pipeline(&ExecutionId::new("e1"), &pipeline, &mut ctx);
    assert!(matches!(outcome, PipelineOutcome::Errored { .. }));
}

#[test]
fn empty_pipeline_completes_immediately() {
    let pipeline = pipeline("p1", vec![]);
    let mut ctx = test_context(identity_registry());
    assert_eq!(run_pipeline(&ExecutionId::new("e1"), &pipeline, &mut ctx), PipelineOutcome::Complete);
}
