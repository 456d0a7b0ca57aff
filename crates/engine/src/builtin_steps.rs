// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small set of dependency-free step bodies registered under the
//! `"metalus"` package so the crate runs and tests end to end without an
//! external step-library crate (§1: real data-processing steps are
//! out of scope).

use metalus_core::{Overload, ParamKind, ParamSpec, PipelineStepResponse, StepRegistry, Value};

/// The package name every built-in step is registered under.
pub const PACKAGE: &str = "metalus";

/// A [`StepRegistry`] pre-loaded with `Log.print`, `Value.identity`, and
/// `Value.concat`.
pub fn default_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    register(&mut registry);
    registry
}

/// Register the built-in steps into an existing registry, so a driver can
/// layer its own step library's packages alongside them.
pub fn register(registry: &mut StepRegistry) {
    registry.register_step(
        PACKAGE,
        "Log.print",
        Overload::new(vec![ParamSpec::new("message", ParamKind::Any)], |args, _ctx| {
            let message = args.get("message").cloned().unwrap_or_else(Value::absent);
            tracing::info!(%message, "Log.print");
            Ok(PipelineStepResponse::wrap(Some(message)))
        }),
    );

    registry.register_step(
        PACKAGE,
        "Value.identity",
        Overload::new(vec![ParamSpec::new("input", ParamKind::Any)], |args, _ctx| {
            Ok(PipelineStepResponse::wrap(args.get("input").cloned()))
        }),
    );

    registry.register_step(
        PACKAGE,
        "Value.concat",
        Overload::new(
            vec![ParamSpec::new("values", ParamKind::List), ParamSpec::new("separator", ParamKind::String).optional(Value::String(String::new()))],
            |args, _ctx| {
                let separator = args.get("separator").and_then(Value::as_str).unwrap_or("");
                let joined = args
                    .get("values")
                    .and_then(Value::as_list)
                    .map(|items| items.iter().map(ToString::to_string).collect::<Vec<_>>().join(separator))
                    .unwrap_or_default();
                Ok(PipelineStepResponse::wrap(Some(Value::String(joined))))
            },
        ),
    );
}

#[cfg(test)]
#[path = "builtin_steps_tests.rs"]
mod tests;
