// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The driver configuration surface (§6): inline JSON, a file path, or a
//! pluggable [`ConfigurationLoader`]. At least one source must be given;
//! the keys naming the source are reserved and stripped from the final
//! context globals once the plan is seeded (§4.6).

use crate::model::Application;
use metalus_core::{ConfigError, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Global keys the driver recognizes as naming an application source
/// (§4.6, §6). Mirrors [`metalus_core::RESERVED_GLOBAL_KEYS`].
pub const APPLICATION_JSON_KEY: &str = "applicationJson";
pub const APPLICATION_CONFIG_PATH_KEY: &str = "applicationConfigPath";
pub const APPLICATION_CONFIGURATION_LOADER_KEY: &str = "applicationConfigurationLoader";

/// Resolves an `applicationConfigPath` to its raw JSON text. The default
/// implementation reads the local filesystem; a driver may substitute one
/// that reads from an object store, matching how `applicationConfigurationLoader`
/// names a pluggable file-manager class (§6).
pub trait ConfigurationLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<String, ConfigError>;
}

impl fmt::Debug for dyn ConfigurationLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ConfigurationLoader>")
    }
}

/// Reads `applicationConfigPath` off the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileConfigurationLoader;

impl ConfigurationLoader for FileConfigurationLoader {
    fn load(&self, path: &str) -> Result<String, ConfigError> {
        std::fs::read_to_string(path)
            .map_err(|e| ConfigError::MalformedApplication(format!("reading '{path}': {e}")))
    }
}

/// The minimum recognized inputs to the driver (§6). Exactly one of
/// `application_json` / `application_config_path` must be set.
#[derive(Clone, Default)]
pub struct DriverConfig {
    pub application_json: Option<String>,
    pub application_config_path: Option<String>,
    pub application_configuration_loader: Option<Arc<dyn ConfigurationLoader>>,
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("application_json_set", &self.application_json.is_some())
            .field("application_config_path", &self.application_config_path)
            .field(
                "application_configuration_loader_set",
                &self.application_configuration_loader.is_some(),
            )
            .finish()
    }
}

impl DriverConfig {
    pub fn from_inline_json(json: impl Into<String>) -> Self {
        Self {
            application_json: Some(json.into()),
            ..Self::default()
        }
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            application_config_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// The reserved-key globals seeded at driver startup (§4.6). These are
    /// visible to the resolver only transiently — every
    /// [`metalus_core::PipelineContext`] built from the plan strips them
    /// via [`metalus_core::PipelineContext::strip_reserved_globals`] before
    /// being handed to the executor.
    pub fn reserved_globals(&self) -> HashMap<String, Value> {
        let mut globals = HashMap::new();
        if let Some(json) = &self.application_json {
            globals.insert(APPLICATION_JSON_KEY.to_string(), Value::String(json.clone()));
        }
        if let Some(path) = &self.application_config_path {
            globals.insert(APPLICATION_CONFIG_PATH_KEY.to_string(), Value::String(path.clone()));
        }
        if let Some(loader) = &self.application_configuration_loader {
            let _ = loader;
            globals.insert(
                APPLICATION_CONFIGURATION_LOADER_KEY.to_string(),
                Value::String("custom".to_string()),
            );
        }
        globals
    }
}

/// Load and validate an [`Application`] from the driver configuration
/// surface (§6, §7).
pub fn load_application(config: &DriverConfig) -> Result<Application, ConfigError> {
    let raw = if let Some(json) = &config.application_json {
        json.clone()
    } else if let Some(path) = &config.application_config_path {
        let loader = config
            .application_configuration_loader
            .clone()
            .unwrap_or_else(|| Arc::new(FileConfigurationLoader));
        loader.load(path)?
    } else {
        return Err(ConfigError::NoApplicationSource);
    };

    let application: Application =
        serde_json::from_str(&raw).map_err(|e| ConfigError::MalformedApplication(e.to_string()))?;
    application.validate()?;
    tracing::debug!(
        pipelines = application.pipelines.len(),
        executions = application.executions.len(),
        "loaded application"
    );
    Ok(application)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
