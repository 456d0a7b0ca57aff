// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The canonical step return shape (§3: PipelineStepResponse).

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Primary return plus named returns. Step bodies may return this directly,
/// or return any [`Value`], which the registry wraps (§4.2).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStepResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_return: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_returns: Option<BTreeMap<String, Value>>,
}

impl PipelineStepResponse {
    pub fn new(primary_return: Option<Value>, named_returns: Option<BTreeMap<String, Value>>) -> Self {
        Self {
            primary_return,
            named_returns,
        }
    }

    /// Wrap a raw return value per §4.2: `None` becomes `Some(absent)`.
    pub fn wrap(value: Option<Value>) -> Self {
        Self {
            primary_return: Some(value.unwrap_or_else(Value::absent)),
            named_returns: None,
        }
    }

    pub fn primary(&self) -> Option<&Value> {
        self.primary_return.as_ref()
    }

    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named_returns.as_ref().and_then(|m| m.get(name))
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
