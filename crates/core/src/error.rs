// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy (§4.1, §7).

use thiserror::Error;

/// Malformed application, unresolved className, missing required step input.
/// Surfaced at plan construction; the plan does not start (§7).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unresolved class name: {0}")]
    UnresolvedClassName(String),
    #[error("missing required step input: {0}")]
    MissingRequiredInput(String),
    #[error("malformed application: {0}")]
    MalformedApplication(String),
    #[error("duplicate step id '{0}' in pipeline '{1}'")]
    DuplicateStepId(String, String),
    #[error("duplicate pipeline id: {0}")]
    DuplicatePipelineId(String),
    #[error("duplicate execution id: {0}")]
    DuplicateExecutionId(String),
    #[error("execution parent graph contains a cycle")]
    CyclicExecutionGraph,
    #[error("execution '{0}' references unknown parent '{1}'")]
    UnknownParent(String, String),
    #[error("no application JSON source was provided")]
    NoApplicationSource,
}

/// The resolver could not produce a required value (§4.1, §4.3).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MappingError {
    #[error("missing required field '{field}' while constructing '{class_name}'")]
    MissingRequiredField { class_name: String, field: String },
    #[error("class '{0}' is not registered")]
    UnknownClass(String),
    #[error("parameter type mismatch for '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("overload resolution failed for '{0}': no matching signature")]
    NoMatchingOverload(String),
}

/// A structured stop raised by a step body (§4.1, §4.4): recoverable, not a
/// programming error. Carries the kind (pause/error) and an optional message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("step raised a {kind}: {message:?}")]
pub struct StepError {
    pub kind: StepStopKind,
    pub message: Option<String>,
}

impl StepError {
    pub fn pause(message: impl Into<Option<String>>) -> Self {
        Self {
            kind: StepStopKind::Pause,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<Option<String>>) -> Self {
        Self {
            kind: StepStopKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStopKind {
    Pause,
    Error,
}

impl std::fmt::Display for StepStopKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStopKind::Pause => write!(f, "pause"),
            StepStopKind::Error => write!(f, "error"),
        }
    }
}

/// Any other exception thrown by a step body (§4.1, §7). The executor
/// unwinds invocation-target wrapping: callers should construct this from
/// the *underlying cause*, never from a generic "invocation failed" wrapper.
#[derive(Debug, Error)]
#[error("fatal error in step: {0}")]
pub struct FatalError(pub String);

impl FatalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
