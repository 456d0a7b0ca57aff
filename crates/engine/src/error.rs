// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level error wrapper, composing the core taxonomy (§4.1, §7).

use metalus_core::{ConfigError, FatalError, MappingError};
use thiserror::Error;

/// Errors the engine can raise outside the structured pause/error/fatal
/// step outcomes, which the executor instead folds into a pipeline's
/// terminal state (§9: "Exceptions-as-signals → structured results").
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),
    #[error("fatal step error: {0}")]
    Fatal(#[from] FatalError),
}
