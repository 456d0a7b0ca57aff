// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use metalus_core::{
    AuditTrail, EngineMeta, NoopSecurityManager, Overload, ParamKind, ParamSpec, Parameter, ParameterType,
    PipelineCategory, PipelineManager, StepError, StepId, StepRegistry, StepType,
};
use std::sync::Arc;

fn outer_context(registry: StepRegistry) -> PipelineContext {
    PipelineContext::new(
        std::collections::HashMap::new(),
        Arc::new(PipelineManager::new()),
        Arc::new(NoopSecurityManager),
        Arc::new(AuditTrail::new()),
        Arc::new(registry),
        vec!["pkg".to_string()],
    )
}

fn echo_registry() -> StepRegistry {
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

fn identity_step(id: &str, input_value: Value) -> PipelineStep {
    PipelineStep {
        id: StepId::new(id),
        display_name: None,
        description: None,
        step_type: StepType::Pipeline,
        params: vec![Parameter::new("input", ParameterType::Text, input_value)],
        engine_meta: EngineMeta::StepBody("Value.identity".to_string()),
        next_step_id: None,
        execute_if_empty: None,
    }
}

fn step_group_step(id: &str, mappings: Option<Value>, embedded: Pipeline) -> PipelineStep {
    let mut params = vec![];
    if let Some(mappings) = mappings {
        params.push(Parameter::new("pipelineMappings", ParameterType::Object, mappings));
    }
    PipelineStep {
        id: StepId::new(id),
        display_name: None,
        description: None,
        step_type: StepType::StepGroup,
        params,
        engine_meta: EngineMeta::StepGroup(StepGroupRef::Inline {
            pipeline: Box::new(embedded),
        }),
        next_step_id: None,
        execute_if_empty: None,
    }
}

#[test]
fn step_group_result_becomes_primary_return() {
    let embedded = Pipeline {
        id: PipelineDefId::new("inner"),
        name: "inner".to_string(),
        category: PipelineCategory::StepGroup,
        steps: vec![identity_step("s1", Value::Int(7))],
        step_group_result: Some(StepId::new("s1")),
    };
    let step = step_group_step("group", None, embedded);
    let ctx = outer_context(echo_registry());

    match run_step_group(&ExecutionId::new("e1"), &PipelineDefId::new("outer"), &step, &ctx) {
        StepGroupOutcome::Response(response) => assert_eq!(response.primary(), Some(&Value::Int(7))),
        _ => panic!("expected a response"),
    }
}

#[test]
fn missing_step_group_result_returns_the_whole_parameters_map() {
    let embedded = Pipeline {
        id: PipelineDefId::new("inner"),
        name: "inner".to_string(),
        category: PipelineCategory::StepGroup,
        steps: vec![identity_step("s1", Value::Int(7))],
        step_group_result: None,
    };
    let step = step_group_step("group", None, embedded);
    let ctx = outer_context(echo_registry());

    match run_step_group(&ExecutionId::new("e1"), &PipelineDefId::new("outer"), &step, &ctx) {
        StepGroupOutcome::Response(response) => {
            let primary = response.primary().unwrap();
            assert!(primary.as_map().unwrap().contains_key("s1"));
        }
        _ => panic!("expected a response"),
    }
}

#[test]
fn child_globals_come_only_from_pipeline_mappings() {
    let embedded = Pipeline {
        id: PipelineDefId::new("inner"),
        name: "inner".to_string(),
        category: PipelineCategory::StepGroup,
        steps: vec![identity_step("s1", Value::String("!configuredKey".into()))],
        step_group_result: Some(StepId::new("s1")),
    };
    let mut mappings = std::collections::BTreeMap::new();
    mappings.insert("configuredKey".to_string(), Value::String("mapped-value".into()));
    let step = step_group_step("group", Some(Value::Map(mappings)), embedded);

    let mut ctx = outer_context(echo_registry());
    ctx.globals.insert("configuredKey".to_string(), Value::String("outer-value".into()));

    match run_step_group(&ExecutionId::new("e1"), &PipelineDefId::new("outer"), &step, &ctx) {
        StepGroupOutcome::Response(response) => {
            assert_eq!(response.primary(), Some(&Value::String("mapped-value".into())));
        }
        _ => panic!("expected a response"),
    }
}

#[test]
fn pause_in_child_becomes_pause_of_the_outer_step() {
    let mut registry = StepRegistry::new();
    registry.register_step(
        "pkg",
        "Flow.pause",
        Overload::new(vec![], |_args, _ctx| Err(StepError::pause("waiting".to_string()).into())),
    );
    let embedded_step = PipelineStep {
        id: StepId::new("s1"),
        display_name: None,
        description: None,
        step_type: StepType::Pipeline,
        params: vec![],
        engine_meta: EngineMeta::StepBody("Flow.pause".to_string()),
        next_step_id: None,
        execute_if_empty: None,
    };
    let embedded = Pipeline {
        id: PipelineDefId::new("inner"),
        name: "inner".to_string(),
        category: PipelineCategory::StepGroup,
        steps: vec![embedded_step],
        step_group_result: None,
    };
    let step = step_group_step("group", None, embedded);
    let ctx = outer_context(registry);

    match run_step_group(&ExecutionId::new("e1"), &PipelineDefId::new("outer"), &step, &ctx) {
        StepGroupOutcome::Paused(message) => assert_eq!(message, Some("waiting".to_string())),
        _ => panic!("expected a pause"),
    }
}

#[test]
fn unknown_embedded_pipeline_by_id_errors() {
    let step = PipelineStep {
        id: StepId::new("group"),
        display_name: None,
        description: None,
        step_type: StepType::StepGroup,
        params: vec![],
        engine_meta: EngineMeta::StepGroup(StepGroupRef::ById {
            pipeline_id: PipelineDefId::new("ghost"),
        }),
        next_step_id: None,
        execute_if_empty: None,
    };
    let ctx = outer_context(echo_registry());

    match run_step_group(&ExecutionId::new("e1"), &PipelineDefId::new("outer"), &step, &ctx) {
        StepGroupOutcome::Errored(_) => {}
        _ => panic!("expected an error"),
    }
}
