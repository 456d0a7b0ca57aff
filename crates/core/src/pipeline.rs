// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline definitions: an ordered graph of steps (§3).

use crate::ids::{PipelineDefId, StepId};
use crate::step::PipelineStep;
use serde::{Deserialize, Serialize};

/// Whether a [`Pipeline`] is run top-level by an execution, or only ever
/// embedded inside a step-group (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineCategory {
    Pipeline,
    StepGroup,
}

/// An ordered graph of steps executed by the pipeline executor (§3, §4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineDefId,
    pub name: String,
    pub category: PipelineCategory,
    pub steps: Vec<PipelineStep>,
    /// Which step's result becomes a step-group's return (§4.5). Ignored for
    /// top-level pipelines.
    #[serde(default, rename = "stepGroupResult")]
    pub step_group_result: Option<StepId>,
}

impl Pipeline {
    pub fn get_step(&self, id: &StepId) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn first_step(&self) -> Option<&PipelineStep> {
        self.steps.first()
    }

    /// Validate step-id uniqueness within this pipeline (§3 Invariants).
    pub fn validate_unique_step_ids(&self) -> Result<(), crate::error::ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(crate::error::ConfigError::DuplicateStepId(
                    step.id.to_string(),
                    self.id.to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
