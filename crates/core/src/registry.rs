// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step registry: resolves `Object.function` references to callable step
//! bodies (§4.2).
//!
//! Dynamic dispatch-by-name is replaced with a compile-time registered table
//! keyed by `(package, Object, function)`, each entry holding argument
//! descriptors and a typed adapter that projects [`Value`] into native
//! arguments — overload resolution becomes explicit metadata instead of
//! reflective search (§9).

use crate::context::PipelineContext;
use crate::error::MappingError;
use crate::response::PipelineStepResponse;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The declared shape of a single overload parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(mut self, default: Value) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }

    /// The injected `pipelineContext` argument recognized by §4.2.
    pub fn pipeline_context() -> Self {
        Self::new("pipelineContext", ParamKind::PipelineContext)
    }
}

/// Declared parameter type, used for assignability scoring during overload
/// resolution (§4.2) and (when `validateStepParameterTypes` is enabled)
/// for the resolver's runtime type check (§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
    Object(String),
    /// Accepts any runtime value; always assignable.
    Any,
    /// The injected execution context; never sourced from the argument map.
    PipelineContext,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Bool => write!(f, "bool"),
            ParamKind::Int => write!(f, "int"),
            ParamKind::Float => write!(f, "float"),
            ParamKind::String => write!(f, "string"),
            ParamKind::List => write!(f, "list"),
            ParamKind::Map => write!(f, "map"),
            ParamKind::Object(name) => write!(f, "{name}"),
            ParamKind::Any => write!(f, "any"),
            ParamKind::PipelineContext => write!(f, "pipelineContext"),
        }
    }
}

/// Whether `value`'s runtime type may be assigned to a parameter declared as
/// `kind`. Best-effort: object-typed parameters accept any typed-object or
/// map (constructors re-project as needed).
pub fn assignable(value: &Value, kind: &ParamKind) -> bool {
    match kind {
        ParamKind::Any | ParamKind::PipelineContext => true,
        ParamKind::Bool => matches!(value, Value::Bool(_)),
        ParamKind::Int => matches!(value, Value::Int(_)),
        ParamKind::Float => matches!(value, Value::Float(_) | Value::Int(_)),
        ParamKind::String => matches!(value, Value::String(_)),
        ParamKind::List => matches!(value, Value::List(_)),
        ParamKind::Map => matches!(value, Value::Map(_) | Value::Object(_)),
        ParamKind::Object(_) => matches!(value, Value::Object(_) | Value::Map(_)),
    }
}

type InvokeFn =
    dyn Fn(&BTreeMap<String, Value>, &PipelineContext) -> Result<PipelineStepResponse, StepInvocationError>
        + Send
        + Sync;

/// One overload of a step body or constructor: a parameter signature plus
/// the native function it projects arguments into.
#[derive(Clone)]
pub struct Overload {
    pub params: Vec<ParamSpec>,
    invoke: Arc<InvokeFn>,
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload").field("params", &self.params).finish()
    }
}

impl Overload {
    pub fn new<F>(params: Vec<ParamSpec>, invoke: F) -> Self
    where
        F: Fn(&BTreeMap<String, Value>, &PipelineContext) -> Result<PipelineStepResponse, StepInvocationError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            params,
            invoke: Arc::new(invoke),
        }
    }

    /// Count of declared parameters whose name is present in `arg_map` and
    /// whose runtime value is assignable to the declared type.
    ///
    /// §9 Open Question: the source checks `arg_map.contains_key(name)`
    /// twice per parameter in this filter. That duplication is preserved
    /// here rather than simplified away, per the spec's explicit
    /// instruction to keep the original behavior.
    fn assignable_match_count(&self, arg_map: &BTreeMap<String, Value>) -> usize {
        self.params
            .iter()
            .filter(|p| {
                p.kind == ParamKind::PipelineContext
                    || (arg_map.contains_key(&p.name)
                        && arg_map.contains_key(&p.name)
                        && arg_map
                            .get(&p.name)
                            .map(|v| assignable(v, &p.kind))
                            .unwrap_or(false))
            })
            .count()
    }
}

/// Errors raised while constructing the final argument vector for a step
/// invocation, or by the step body itself.
#[derive(Debug)]
pub enum StepInvocationError {
    Mapping(MappingError),
    Step(crate::error::StepError),
    Fatal(crate::error::FatalError),
}

impl fmt::Display for StepInvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepInvocationError::Mapping(e) => write!(f, "{e}"),
            StepInvocationError::Step(e) => write!(f, "{e}"),
            StepInvocationError::Fatal(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StepInvocationError {}

impl From<MappingError> for StepInvocationError {
    fn from(e: MappingError) -> Self {
        StepInvocationError::Mapping(e)
    }
}

impl From<crate::error::StepError> for StepInvocationError {
    fn from(e: crate::error::StepError) -> Self {
        StepInvocationError::Step(e)
    }
}

impl From<crate::error::FatalError> for StepInvocationError {
    fn from(e: crate::error::FatalError) -> Self {
        StepInvocationError::Fatal(e)
    }
}

/// A resolved, directly-invokable step body or constructor, with defaults
/// for omitted parameters already known.
#[derive(Debug, Clone)]
pub struct ResolvedCallable {
    overload: Overload,
}

impl ResolvedCallable {
    /// Invoke the callable. `args` need not include parameters that have a
    /// declared default, nor `pipelineContext` (injected automatically,
    /// §4.2).
    pub fn invoke(
        &self,
        args: BTreeMap<String, Value>,
        ctx: &PipelineContext,
    ) -> Result<PipelineStepResponse, StepInvocationError> {
        let mut full_args = args;
        for param in &self.overload.params {
            if param.kind == ParamKind::PipelineContext {
                continue;
            }
            if !full_args.contains_key(&param.name) {
                if let Some(default) = &param.default {
                    full_args.insert(param.name.clone(), default.clone());
                } else if param.required {
                    return Err(StepInvocationError::Mapping(MappingError::MissingRequiredField {
                        class_name: String::new(),
                        field: param.name.clone(),
                    }));
                }
            }
        }
        (self.overload.invoke)(&full_args, ctx)
    }
}

/// A namespace-keyed table of step bodies and constructors. `stepPackages`
/// (§3, §4.2) is the list of namespace prefixes searched in order for the
/// first one containing the referenced `Object`.
#[derive(Default, Clone)]
pub struct StepRegistry {
    /// package -> Object -> function -> overloads
    steps: BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<Overload>>>>,
    /// className -> constructor overloads
    constructors: BTreeMap<String, Vec<Overload>>,
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("packages", &self.steps.keys().collect::<Vec<_>>())
            .field("classes", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step body overload under `package`, `"Object.function"`.
    pub fn register_step(&mut self, package: &str, reference: &str, overload: Overload) {
        let (object, function) = split_reference(reference);
        self.steps
            .entry(package.to_string())
            .or_default()
            .entry(object)
            .or_default()
            .entry(function)
            .or_default()
            .push(overload);
    }

    /// Register a constructor overload for a fully-qualified class name.
    pub fn register_constructor(&mut self, class_name: &str, overload: Overload) {
        self.constructors
            .entry(class_name.to_string())
            .or_default()
            .push(overload);
    }

    /// Resolve `"Object.function"` against the given package search order
    /// and argument map, applying the overload-selection rule of §4.2.
    pub fn resolve(
        &self,
        packages: &[String],
        reference: &str,
        arg_map: &BTreeMap<String, Value>,
    ) -> Result<ResolvedCallable, MappingError> {
        let (object, function) = split_reference(reference);
        for package in packages {
            let Some(objects) = self.steps.get(package) else {
                continue;
            };
            let Some(functions) = objects.get(&object) else {
                continue;
            };
            let Some(overloads) = functions.get(&function) else {
                return Err(MappingError::NoMatchingOverload(reference.to_string()));
            };
            return select_overload(overloads, arg_map, reference);
        }
        Err(MappingError::NoMatchingOverload(reference.to_string()))
    }

    /// Resolve a constructor for `class_name`, applying the same
    /// overload-selection rule (§4.1, §4.2).
    pub fn resolve_constructor(
        &self,
        class_name: &str,
        arg_map: &BTreeMap<String, Value>,
    ) -> Result<ResolvedCallable, MappingError> {
        let overloads = self
            .constructors
            .get(class_name)
            .ok_or_else(|| MappingError::UnknownClass(class_name.to_string()))?;
        select_overload(overloads, arg_map, class_name)
    }

    /// Project a `(className, fields)` pair into a typed-object `Value` via
    /// the registered constructor (§4.1, §4.3).
    pub fn construct(
        &self,
        class_name: &str,
        fields: BTreeMap<String, Value>,
        ctx: &PipelineContext,
    ) -> Result<Value, MappingError> {
        let callable = self.resolve_constructor(class_name, &fields)?;
        match callable.invoke(fields, ctx) {
            Ok(response) => Ok(response.primary_return.unwrap_or_else(Value::absent)),
            Err(StepInvocationError::Mapping(e)) => Err(e),
            Err(StepInvocationError::Step(_) | StepInvocationError::Fatal(_)) => {
                Err(MappingError::UnknownClass(class_name.to_string()))
            }
        }
    }
}

fn select_overload(
    overloads: &[Overload],
    arg_map: &BTreeMap<String, Value>,
    reference: &str,
) -> Result<ResolvedCallable, MappingError> {
    let mut best: Option<(usize, &Overload)> = None;
    for overload in overloads {
        let score = overload.assignable_match_count(arg_map);
        match best {
            Some((best_score, _)) if score <= best_score => {}
            _ => best = Some((score, overload)),
        }
    }
    let (_, overload) = best.ok_or_else(|| MappingError::NoMatchingOverload(reference.to_string()))?;
    Ok(ResolvedCallable {
        overload: overload.clone(),
    })
}

fn split_reference(reference: &str) -> (String, String) {
    match reference.split_once('.') {
        Some((object, function)) => (object.to_string(), function.to_string()),
        None => (reference.to_string(), String::new()),
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
