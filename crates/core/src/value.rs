// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The configuration-carried value model.
//!
//! [`Value`] is the single tagged variant that spans every payload the
//! application JSON, parameter resolver, and step registry exchange. Native
//! step arguments are projected from `Value` at invocation time (see
//! `metalus-core::registry`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A typed-object: a record tagged by a fully-qualified type name plus its
/// field map. Produced by [`crate::registry::StepRegistry::construct`] when
/// projecting a `{className, object}` descriptor (§4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedObject {
    pub class_name: String,
    pub fields: BTreeMap<String, Value>,
}

impl TypedObject {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A tagged variant spanning every configuration-carried payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(TypedObject),
}

impl Value {
    /// Absence sentinel used by the resolver's dotted path evaluator (§4.3).
    pub fn absent() -> Self {
        Value::Null
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// "empty" per §4.3's `executeIfEmpty` rule: absent, empty string, empty
    /// list, or empty map.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&TypedObject> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Whether this value is a scalar (as opposed to a list/map/object).
    /// Used by the embedded-concatenation renderer (§4.3) to decide whether
    /// an interpolated `${expr}` may be stringified.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// Descend one dotted-path segment: typed-object field or map entry.
    /// Returns `None` (absence) when the segment doesn't resolve, matching
    /// the resolver's auto-unwrap-once-per-segment rule (§4.3).
    pub fn get_field(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Object(obj) => obj.field(segment),
            Value::Map(map) => map.get(segment),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(_) | Value::Map(_) | Value::Object(_) => {
                write!(f, "{}", serde_json::to_string(self).unwrap_or_default())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
