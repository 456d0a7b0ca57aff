// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The security hook applied to every resolved parameter (§4.3).

use crate::value::Value;
use std::collections::HashSet;
use std::fmt;

/// Every resolved final argument is passed through
/// `securityManager.secureParameter(parameterName, value)`; the manager may
/// redact or transform it (§4.3). Must be safe for concurrent calls from
/// distinct executions (§5).
pub trait SecurityManager: Send + Sync {
    fn secure_parameter(&self, parameter_name: &str, value: Value) -> Value;
}

impl fmt::Debug for dyn SecurityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<SecurityManager>")
    }
}

/// Passes every value through unchanged.
#[derive(Debug, Clone, Default)]
pub struct NoopSecurityManager;

impl SecurityManager for NoopSecurityManager {
    fn secure_parameter(&self, _parameter_name: &str, value: Value) -> Value {
        value
    }
}

/// Redacts string values resolved for parameters whose name matches a
/// configured denylist (e.g. `password`, `secret`, `token`).
#[derive(Debug, Clone)]
pub struct RedactingSecurityManager {
    denylist: HashSet<String>,
}

impl RedactingSecurityManager {
    pub fn new(denylist: impl IntoIterator<Item = String>) -> Self {
        Self {
            denylist: denylist.into_iter().collect(),
        }
    }

    pub fn default_denylist() -> Self {
        Self::new(["password", "secret", "token"].map(String::from))
    }

    pub fn is_denied(&self, parameter_name: &str) -> bool {
        let lower = parameter_name.to_ascii_lowercase();
        self.denylist.iter().any(|d| lower.contains(d.as_str()))
    }

    /// Redact `value` if `parameter_name` is on the denylist.
    pub fn secure_named(&self, parameter_name: &str, value: Value) -> Value {
        if self.is_denied(parameter_name) {
            Value::String("***REDACTED***".to_string())
        } else {
            value
        }
    }
}

impl SecurityManager for RedactingSecurityManager {
    fn secure_parameter(&self, parameter_name: &str, value: Value) -> Value {
        self.secure_named(parameter_name, value)
    }
}

#[cfg(test)]
#[path = "security_tests.rs"]
mod tests;
