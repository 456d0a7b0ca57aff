// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-execution mutable state threaded through the executor (§4.6).

use crate::ids::{PipelineDefId, StepId};
use crate::listener::PipelineListener;
use crate::pipeline::Pipeline;
use crate::registry::StepRegistry;
use crate::response::PipelineStepResponse;
use crate::security::SecurityManager;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Global keys seeded by the driver that must not survive into the final,
/// externally-observable context (§4.6, §6).
pub const RESERVED_GLOBAL_KEYS: [&str; 3] = [
    "applicationJson",
    "applicationConfigPath",
    "applicationConfigurationLoader",
];

/// Read-only lookup of pipelines by id, shared across every execution in a
/// plan (§4.6: "the `pipelineManager` and step registry are read-only after
/// construction and freely shared").
#[derive(Debug, Default, Clone)]
pub struct PipelineManager {
    pipelines: HashMap<PipelineDefId, Pipeline>,
}

impl PipelineManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pipeline: Pipeline) {
        self.pipelines.insert(pipeline.id.clone(), pipeline);
    }

    pub fn get(&self, id: &PipelineDefId) -> Option<&Pipeline> {
        self.pipelines.get(id)
    }
}

impl FromIterator<Pipeline> for PipelineManager {
    fn from_iter<I: IntoIterator<Item = Pipeline>>(iter: I) -> Self {
        let mut manager = Self::new();
        for pipeline in iter {
            manager.insert(pipeline);
        }
        manager
    }
}

/// Per-execution mutable state: globals, per-pipeline step results, audits,
/// and the shared, read-only policy collaborators (§4.6).
///
/// Thread-safety contract (§4.6, §5): within one execution the executor is
/// single-threaded, so `globals`/`parameters` are mutated sequentially with
/// no internal locking here. Cross-execution sharing happens only through
/// the `Arc`-wrapped read-only collaborators and via snapshot copies at
/// parent-completion time (§4.7), never through a shared `PipelineContext`.
#[derive(Clone)]
pub struct PipelineContext {
    pub globals: HashMap<String, Value>,
    parameters: HashMap<PipelineDefId, HashMap<StepId, PipelineStepResponse>>,
    pub pipeline_manager: Arc<PipelineManager>,
    pub security_manager: Arc<dyn SecurityManager>,
    pub pipeline_listener: Arc<dyn PipelineListener>,
    pub parameter_mapper: Arc<StepRegistry>,
    pub step_packages: Vec<String>,
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("globals", &self.globals)
            .field("parameters", &self.parameters)
            .field("step_packages", &self.step_packages)
            .finish()
    }
}

impl PipelineContext {
    pub fn new(
        globals: HashMap<String, Value>,
        pipeline_manager: Arc<PipelineManager>,
        security_manager: Arc<dyn SecurityManager>,
        pipeline_listener: Arc<dyn PipelineListener>,
        parameter_mapper: Arc<StepRegistry>,
        step_packages: Vec<String>,
    ) -> Self {
        Self {
            globals,
            parameters: HashMap::new(),
            pipeline_manager,
            security_manager,
            pipeline_listener,
            parameter_mapper,
            step_packages,
        }
    }

    /// Strip the driver's reserved seeding keys (§4.6, §6).
    pub fn strip_reserved_globals(&mut self) {
        for key in RESERVED_GLOBAL_KEYS {
            self.globals.remove(key);
        }
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Record a step's result, keyed by the pipeline it ran in.
    pub fn set_step_result(
        &mut self,
        pipeline: PipelineDefId,
        step: StepId,
        response: PipelineStepResponse,
    ) {
        self.parameters.entry(pipeline).or_default().insert(step, response);
    }

    pub fn step_result(&self, pipeline: &PipelineDefId, step: &StepId) -> Option<&PipelineStepResponse> {
        self.parameters.get(pipeline).and_then(|steps| steps.get(step))
    }

    /// All step results recorded so far for `pipeline`, in no particular
    /// order — used by the resolver's `@stepId` / `#stepId.field` sigils
    /// when scanning the current pipeline (§4.3).
    pub fn pipeline_results(&self, pipeline: &PipelineDefId) -> Option<&HashMap<StepId, PipelineStepResponse>> {
        self.parameters.get(pipeline)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
