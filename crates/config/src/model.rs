// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Application JSON shape (§6): globals, the execution list, an
//! optional pipeline library, and policy descriptors. Only `serde` data
//! types plus enough validation to raise [`ConfigError`] early — no
//! expression language lives here (§1: "application JSON parsing... just
//! states the shape").

use metalus_core::{ConfigError, Pipeline, Value};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A `{className, parameters}` reference to a pluggable collaborator
/// (`pipelineListener`, `securityManager`, `stepMapper`), resolved by the
/// driver against its own registry of known implementations (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

impl Descriptor {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            parameters: HashMap::new(),
        }
    }
}

/// One node of the execution-plan DAG as declared in the application JSON
/// (§6). `pipeline_ids` refers into the application's pipeline library;
/// `pipelines` inlines the definitions directly. Overrides fall back to the
/// plan-level defaults when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionDef {
    pub id: String,
    #[serde(default, rename = "pipelineIds")]
    pub pipeline_ids: Vec<String>,
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub globals: HashMap<String, Value>,
    #[serde(default, rename = "pipelineParameters")]
    pub pipeline_parameters: HashMap<String, Value>,
    #[serde(default, rename = "pipelineListener")]
    pub pipeline_listener: Option<Descriptor>,
    #[serde(default, rename = "securityManager")]
    pub security_manager: Option<Descriptor>,
    #[serde(default, rename = "stepMapper")]
    pub step_mapper: Option<Descriptor>,
}

/// Top-level application configuration (§6).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub globals: HashMap<String, Value>,
    pub executions: Vec<ExecutionDef>,
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
    #[serde(default, rename = "pipelineListener")]
    pub pipeline_listener: Option<Descriptor>,
    #[serde(default, rename = "securityManager")]
    pub security_manager: Option<Descriptor>,
    #[serde(default, rename = "stepMapper")]
    pub step_mapper: Option<Descriptor>,
    #[serde(default, rename = "sparkConf")]
    pub spark_conf: HashMap<String, Value>,
}

impl Application {
    /// Structural validation raised at plan construction (§7: "ConfigError
    /// — surface at plan construction; plan does not start"). Does not
    /// evaluate any expression — only checks id uniqueness and that the
    /// parent graph is a well-formed DAG over known execution ids.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut pipeline_ids = HashSet::new();
        for pipeline in &self.pipelines {
            if !pipeline_ids.insert(pipeline.id.as_str()) {
                return Err(ConfigError::DuplicatePipelineId(pipeline.id.to_string()));
            }
            pipeline.validate_unique_step_ids()?;
        }

        let mut execution_ids = HashSet::new();
        for execution in &self.executions {
            if !execution_ids.insert(execution.id.as_str()) {
                return Err(ConfigError::DuplicateExecutionId(execution.id.clone()));
            }
        }
        for execution in &self.executions {
            for parent in &execution.parents {
                if !execution_ids.contains(parent.as_str()) {
                    return Err(ConfigError::UnknownParent(execution.id.clone(), parent.clone()));
                }
            }
        }

        self.validate_acyclic()
    }

    /// Kahn's algorithm over the `parents` edges; any execution left
    /// unvisited after the queue drains participates in a cycle (§4.7).
    fn validate_acyclic(&self) -> Result<(), ConfigError> {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for execution in &self.executions {
            in_degree.entry(execution.id.as_str()).or_insert(0);
            for parent in &execution.parents {
                children.entry(parent.as_str()).or_default().push(execution.id.as_str());
                *in_degree.entry(execution.id.as_str()).or_insert(0) += 1;
            }
        }

        let mut queue: Vec<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut visited = 0;
        while let Some(id) = queue.pop() {
            visited += 1;
            if let Some(kids) = children.get(id) {
                for child in kids {
                    if let Some(degree) = in_degree.get_mut(child) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push(child);
                        }
                    }
                }
            }
        }

        if visited == self.executions.len() {
            Ok(())
        } else {
            Err(ConfigError::CyclicExecutionGraph)
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
