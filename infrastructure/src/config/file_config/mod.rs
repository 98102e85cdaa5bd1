//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod sandbox;
mod scripting;

pub use sandbox::FileSandboxConfig;
pub use scripting::FileScriptingConfig;

use luaglue_application::ScriptingOptions;
use luaglue_domain::SandboxPolicyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems found while validating a [`FileConfig`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("sandbox.deny: {0}")]
    SandboxEntry(SandboxPolicyError),

    #[error("scripting.events_global: '{name}' is not a valid Lua identifier")]
    EventsGlobal { name: String },

    #[error("scripting.events_global: '{name}' is a standard Lua global")]
    EventsGlobalReserved { name: String },

    #[error("scripting.events_global: '{name}' is removed by the sandbox denylist")]
    EventsGlobalDenied { name: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Script loading and host emitter settings
    pub scripting: FileScriptingConfig,
    /// Global namespace sandbox
    pub sandbox: FileSandboxConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        let policy = match self.sandbox.to_policy() {
            Ok(policy) => policy,
            Err(errors) => {
                issues.extend(errors.into_iter().map(ConfigValidationError::SandboxEntry));
                None
            }
        };

        let name = &self.scripting.events_global;
        if !scripting::is_lua_identifier(name) {
            issues.push(ConfigValidationError::EventsGlobal { name: name.clone() });
        } else if scripting::is_standard_global(name) {
            issues.push(ConfigValidationError::EventsGlobalReserved { name: name.clone() });
        } else if policy.is_some_and(|p| p.is_denied(name)) {
            issues.push(ConfigValidationError::EventsGlobalDenied { name: name.clone() });
        }

        issues
    }

    /// Convert into engine options, failing with every validation issue.
    pub fn to_scripting_options(&self) -> Result<ScriptingOptions, Vec<ConfigValidationError>> {
        let issues = self.validate();
        if !issues.is_empty() {
            return Err(issues);
        }

        let sandbox = self.sandbox.to_policy().map_err(|errors| {
            errors
                .into_iter()
                .map(ConfigValidationError::SandboxEntry)
                .collect::<Vec<_>>()
        })?;

        Ok(ScriptingOptions::default()
            .with_sandbox(sandbox)
            .with_failure_policy(self.scripting.listener_failures)
            .with_events_global(self.scripting.events_global.clone())
            .with_eventlib(self.scripting.eventlib))
    }

    /// Render the effective configuration as TOML (for `--show-config`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
