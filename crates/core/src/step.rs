// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step definitions within a pipeline (§3: PipelineStep).

use crate::ids::{PipelineDefId, StepId};
use crate::param::Parameter;
use serde::{Deserialize, Serialize};

/// What kind of flow-control a [`PipelineStep`] performs (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepType {
    /// Runs its body, then advances to `nextStepId`.
    Pipeline,
    /// Inspects the step's primary return and branches via its `params` (§4.4).
    Branch,
    /// Runs an embedded pipeline in an isolated child context (§4.5).
    StepGroup,
    /// Splits execution into concurrent sub-paths (engine-level flow control).
    Fork,
    /// Rejoins previously forked sub-paths.
    Join,
}

/// A reference to a step body, resolved by the registry as `Object.function`
/// (§4.2), or an embedded/by-id pipeline reference for step-group steps
/// (§4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EngineMeta {
    /// `"Object.function"` — resolved against `stepPackages` (§4.2).
    StepBody(String),
    /// Step-group body: either an inline pipeline or a reference by id.
    StepGroup(StepGroupRef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepGroupRef {
    ById { pipeline_id: PipelineDefId },
    Inline { pipeline: Box<crate::pipeline::Pipeline> },
}

/// A single step in a [`crate::pipeline::Pipeline`]'s step graph (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub id: StepId,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(rename = "engineMeta")]
    pub engine_meta: EngineMeta,
    #[serde(default, rename = "nextStepId")]
    pub next_step_id: Option<StepId>,
    #[serde(default, rename = "executeIfEmpty")]
    pub execute_if_empty: Option<Parameter>,
}

impl PipelineStep {
    /// `Object.function` reference, if this step invokes a registered step
    /// body rather than a step-group.
    pub fn step_body_ref(&self) -> Option<&str> {
        match &self.engine_meta {
            EngineMeta::StepBody(s) => Some(s),
            EngineMeta::StepGroup(_) => None,
        }
    }

    pub fn is_step_group(&self) -> bool {
        matches!(self.step_type, StepType::StepGroup)
    }

    /// Parameter in `params` matching `name`, used by branch resolution
    /// (§4.4) to map a primary-return string to a next step id.
    pub fn branch_target(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
