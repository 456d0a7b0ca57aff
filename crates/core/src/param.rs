// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parameter metadata (§3: PipelineStep/Parameter).

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// How a [`Parameter`]'s `value` should be treated by the resolver (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// A literal value, or (if a string) a sigil expression to resolve.
    Text,
    /// Always treated as an expression string, never a literal.
    Script,
    /// A typed-object descriptor (`{className, object}`) or plain map.
    Object,
    /// A list descriptor (`{className?, value: [...]}`) or plain list.
    List,
    /// The whole `PipelineStepResponse` of a prior step (used with `$`).
    Result,
}

/// A single declared input to a step or `executeIfEmpty` guard (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub value: Value,
    #[serde(default, rename = "className", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, rename = "defaultValue", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: ParameterType, value: Value) -> Self {
        Self {
            name: name.into(),
            param_type,
            value,
            class_name: None,
            default_value: None,
        }
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Text parameter whose value is a literal or sigil-expression string.
    pub fn text(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, ParameterType::Text, value.into())
    }

    /// Script parameter: value is always evaluated as an expression.
    pub fn script(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::new(name, ParameterType::Script, Value::String(expr.into()))
    }
}

#[cfg(test)]
#[path = "param_tests.rs"]
mod tests;
