// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A node in the execution-plan DAG: a chain of pipelines sharing one
//! [`PipelineContext`](crate::context::PipelineContext) (§3, §4.7).

use crate::ids::{ExecutionId, PipelineDefId};
use crate::listener::PipelineListener;
use crate::security::SecurityManager;
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One node of the execution plan. Runs its `pipelines` in order ("chaining",
/// §4.4) against a single context, after waiting for every id in `parents`
/// to reach a terminal state (§4.7).
#[derive(Clone)]
pub struct PipelineExecution {
    pub id: ExecutionId,
    pub pipelines: Vec<PipelineDefId>,
    pub parents: HashSet<ExecutionId>,
    /// Overrides merged over the plan-level defaults when this execution's
    /// context is seeded (§6: "Overrides fall back to the plan-level
    /// defaults when absent").
    pub globals: HashMap<String, Value>,
    pub pipeline_parameters: HashMap<String, Value>,
    pub pipeline_listener: Option<Arc<dyn PipelineListener>>,
    pub security_manager: Option<Arc<dyn SecurityManager>>,
    pub step_mapper: Option<String>,
}

impl std::fmt::Debug for PipelineExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecution")
            .field("id", &self.id)
            .field("pipelines", &self.pipelines)
            .field("parents", &self.parents)
            .field("globals", &self.globals)
            .field("pipeline_parameters", &self.pipeline_parameters)
            .field("step_mapper", &self.step_mapper)
            .finish()
    }
}

impl PipelineExecution {
    pub fn new(id: ExecutionId, pipelines: Vec<PipelineDefId>) -> Self {
        Self {
            id,
            pipelines,
            parents: HashSet::new(),
            globals: HashMap::new(),
            pipeline_parameters: HashMap::new(),
            pipeline_listener: None,
            security_manager: None,
            step_mapper: None,
        }
    }

    pub fn with_parents(mut self, parents: impl IntoIterator<Item = ExecutionId>) -> Self {
        self.parents = parents.into_iter().collect();
        self
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
