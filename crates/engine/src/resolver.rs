// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The sigil-prefixed parameter resolver (§4.3): the expression language
//! that maps a [`Parameter`] to a concrete [`Value`] against a
//! [`PipelineContext`].

use metalus_core::{MappingError, Parameter, PipelineContext, PipelineDefId, PipelineStepResponse, Value};
use std::collections::BTreeMap;

/// Resolve `param.value` against `ctx`, applying default substitution and
/// className projection (§3, §4.3). Does not apply the security hook —
/// callers resolving a step's top-level arguments must do that themselves
/// (§4.3: "every resolved **final** argument").
pub fn resolve_parameter(
    param: &Parameter,
    ctx: &PipelineContext,
    current_pipeline: &PipelineDefId,
) -> Result<Value, MappingError> {
    let mut resolved = resolve_value(&param.value, ctx, current_pipeline)?;

    if resolved.is_absent() {
        if let Some(default) = &param.default_value {
            resolved = default.clone();
        }
    }

    if let Some(class_name) = &param.class_name {
        if let Some(fields) = resolved.as_map() {
            resolved = ctx.parameter_mapper.construct(class_name, fields.clone(), ctx)?;
        }
    }

    Ok(resolved)
}

/// Evaluate a single `Value`, recursively resolving every leaf string
/// (§4.3: sigils, dotted paths, embedded concatenation, typed-object and
/// list descriptors, plain maps/lists).
pub fn resolve_value(
    value: &Value,
    ctx: &PipelineContext,
    current_pipeline: &PipelineDefId,
) -> Result<Value, MappingError> {
    match value {
        Value::String(s) => resolve_string(s, ctx, current_pipeline),
        Value::List(items) => {
            let mut resolved = Vec::with_capacity(items.len());
            for item in items {
                resolved.push(resolve_value(item, ctx, current_pipeline)?);
            }
            Ok(Value::List(resolved))
        }
        Value::Map(map) => resolve_map(map, ctx, current_pipeline),
        other => Ok(other.clone()),
    }
}

fn resolve_map(
    map: &BTreeMap<String, Value>,
    ctx: &PipelineContext,
    current_pipeline: &PipelineDefId,
) -> Result<Value, MappingError> {
    if map.contains_key("className") && map.contains_key("object") {
        return resolve_typed_object_descriptor(map, ctx, current_pipeline);
    }
    if let Some(Value::List(_)) = map.get("value") {
        return resolve_list_descriptor(map, ctx, current_pipeline);
    }
    let mut resolved = BTreeMap::new();
    for (key, v) in map {
        resolved.insert(key.clone(), resolve_value(v, ctx, current_pipeline)?);
    }
    Ok(Value::Map(resolved))
}

/// `{className, object}` — recursively resolve every leaf in `object`, then
/// construct via the registry (§4.3).
fn resolve_typed_object_descriptor(
    map: &BTreeMap<String, Value>,
    ctx: &PipelineContext,
    current_pipeline: &PipelineDefId,
) -> Result<Value, MappingError> {
    let class_name = map
        .get("className")
        .and_then(Value::as_str)
        .ok_or_else(|| MappingError::UnknownClass(String::new()))?;
    let object = map.get("object").cloned().unwrap_or_else(|| Value::Map(BTreeMap::new()));
    let resolved_object = resolve_value(&object, ctx, current_pipeline)?;
    let fields = resolved_object.as_map().cloned().unwrap_or_default();
    ctx.parameter_mapper.construct(class_name, fields, ctx)
}

/// `{value: [...], className?}` — resolve each element; project each to
/// `className` if present (§4.3).
fn resolve_list_descriptor(
    map: &BTreeMap<String, Value>,
    ctx: &PipelineContext,
    current_pipeline: &PipelineDefId,
) -> Result<Value, MappingError> {
    let class_name = map.get("className").and_then(Value::as_str);
    let items = map.get("value").and_then(Value::as_list).unwrap_or(&[]);
    let mut resolved_items = Vec::with_capacity(items.len());
    for item in items {
        let mut resolved = resolve_value(item, ctx, current_pipeline)?;
        if let Some(cn) = class_name {
            if let Some(fields) = resolved.as_map().cloned() {
                resolved = ctx.parameter_mapper.construct(cn, fields, ctx)?;
            }
        }
        resolved_items.push(resolved);
    }
    Ok(Value::List(resolved_items))
}

const SIGILS: [char; 5] = ['!', '$', '@', '#', '&'];

/// A leaf string: either a whole-value sigil expression, a string
/// containing `${...}` embeds, or a literal (§4.3).
fn resolve_string(s: &str, ctx: &PipelineContext, current_pipeline: &PipelineDefId) -> Result<Value, MappingError> {
    if s.contains("${") {
        return Ok(Value::String(render_concatenation(s, ctx, current_pipeline)?));
    }
    if s.chars().next().is_some_and(|c| SIGILS.contains(&c)) {
        return evaluate_bare_expression(s, ctx, current_pipeline);
    }
    Ok(Value::String(s.to_string()))
}

/// Evaluate `expr`: if it starts with a sigil, dispatch to the
/// corresponding source; otherwise treat it as a literal (used both for the
/// whole-value form and for a single `${expr}` embed).
fn evaluate_bare_expression(
    expr: &str,
    ctx: &PipelineContext,
    current_pipeline: &PipelineDefId,
) -> Result<Value, MappingError> {
    let Some(sigil) = expr.chars().next() else {
        return Ok(Value::absent());
    };
    if !SIGILS.contains(&sigil) {
        return Ok(Value::String(expr.to_string()));
    }
    let rest = &expr[sigil.len_utf8()..];
    if rest.is_empty() {
        return Ok(Value::absent());
    }
    let segments: Vec<&str> = rest.split('.').collect();

    match sigil {
        '!' => {
            let base = ctx.global(segments[0]).cloned().unwrap_or_else(Value::absent);
            Ok(descend(base, &segments[1..]))
        }
        '$' | '@' | '#' => {
            let Some((response, remaining)) = lookup_step_response(ctx, current_pipeline, &segments) else {
                return Ok(Value::absent());
            };
            let base = match sigil {
                '$' => response_to_value(response),
                '@' => response.primary_return.clone().unwrap_or_else(Value::absent),
                '#' => named_returns_to_value(response),
                _ => unreachable!("matched above"),
            };
            Ok(descend(base, remaining))
        }
        '&' => {
            let pipeline_id = PipelineDefId::new(segments[0]);
            Ok(match ctx.pipeline_manager.get(&pipeline_id) {
                Some(pipeline) => pipeline_reference_value(pipeline),
                None => Value::absent(),
            })
        }
        _ => Ok(Value::absent()),
    }
}

/// Resolve `$`/`@`/`#`'s addressing: `stepId[.path]` within the current
/// pipeline, or `pipelineId.stepId[.path]` cross-pipeline (§4.3). The
/// source is ambiguous about how these two forms are distinguished; this
/// resolver tries the current pipeline first and only falls back to
/// treating the leading segment as a pipeline id when that lookup misses.
fn lookup_step_response<'ctx>(
    ctx: &'ctx PipelineContext,
    current_pipeline: &PipelineDefId,
    segments: &[&str],
) -> Option<(&'ctx PipelineStepResponse, Vec<&'ctx str>)> {
    if segments.is_empty() {
        return None;
    }
    if let Some(response) = ctx
        .pipeline_results(current_pipeline)
        .and_then(|steps| steps.get(segments[0]))
    {
        return Some((response, segments[1..].to_vec()));
    }
    if segments.len() >= 2 {
        let pipeline_id = PipelineDefId::new(segments[0]);
        if let Some(response) = ctx
            .pipeline_results(&pipeline_id)
            .and_then(|steps| steps.get(segments[1]))
        {
            return Some((response, segments[2..].to_vec()));
        }
    }
    None
}

pub(crate) fn response_to_value(response: &PipelineStepResponse) -> Value {
    let mut map = BTreeMap::new();
    map.insert(
        "primaryReturn".to_string(),
        response.primary_return.clone().unwrap_or_else(Value::absent),
    );
    map.insert("namedReturns".to_string(), named_returns_to_value(response));
    Value::Map(map)
}

pub(crate) fn named_returns_to_value(response: &PipelineStepResponse) -> Value {
    match &response.named_returns {
        Some(named) => Value::Map(named.clone()),
        None => Value::absent(),
    }
}

/// `&` has no native `Value` variant for a `Pipeline`; project a minimal
/// reference the caller can still pattern-match by name. Step-group
/// execution (§4.5) resolves embedded pipelines directly via
/// `pipelineManager`, bypassing this projection.
fn pipeline_reference_value(pipeline: &metalus_core::Pipeline) -> Value {
    let mut fields = BTreeMap::new();
    fields.insert("id".to_string(), Value::String(pipeline.id.to_string()));
    fields.insert("name".to_string(), Value::String(pipeline.name.clone()));
    Value::Object(metalus_core::TypedObject {
        class_name: "Pipeline".to_string(),
        fields,
    })
}

/// Dotted-path descent with auto-unwrap-once-per-segment (§4.3): absence at
/// any segment terminates the walk with absence.
fn descend(mut value: Value, segments: &[&str]) -> Value {
    for segment in segments {
        value = match value.get_field(segment) {
            Some(v) => v.clone(),
            None => return Value::absent(),
        };
    }
    value
}

/// Render every `${expr}` segment in `s`, stringifying scalar results.
/// Non-scalar results leave the literal `${expr}` text untouched and emit a
/// warning (§4.3).
fn render_concatenation(s: &str, ctx: &PipelineContext, current_pipeline: &PipelineDefId) -> Result<String, MappingError> {
    let mut output = String::new();
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let inner = &after[..end];
                let value = evaluate_bare_expression(inner, ctx, current_pipeline)?;
                if value.is_scalar() {
                    output.push_str(&value.to_string());
                } else {
                    tracing::warn!(expr = inner, "embedded expression resolved to a non-scalar value");
                    output.push_str("${");
                    output.push_str(inner);
                    output.push('}');
                }
                rest = &after[end + 1..];
            }
            None => {
                output.push_str("${");
                rest = after;
                break;
            }
        }
    }
    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
