//! Scripting engine port — interface for the embedded Lua runtime.
//!
//! This port abstracts the scripting engine so that:
//! - The application/presentation layers don't depend on mlua
//! - A no-op implementation (`NoScriptingEngine`) is always available
//! - The `scripting` feature gate only affects infrastructure + CLI

use luaglue_domain::{EmitError, ScriptValue};
use std::path::Path;

/// Error from a scripting engine operation.
#[derive(Debug, Clone)]
pub struct ScriptError {
    pub message: String,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "script error: {}", self.message)
    }
}

impl std::error::Error for ScriptError {}

impl From<EmitError> for ScriptError {
    fn from(e: EmitError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// Port for the scripting engine.
///
/// The presentation and application layers interact with the scripting
/// engine exclusively through this trait. The infrastructure layer
/// provides the real `LuaScriptingEngine` implementation; when the
/// `scripting` feature is disabled, `NoScriptingEngine` is used instead.
pub trait ScriptingEnginePort: Send + Sync {
    /// Emit `name` on the host emitter that scripts subscribe to.
    ///
    /// Every listener runs even if some fail. Returns the number of
    /// listeners invoked, or an error describing the failures when the
    /// engine is configured to raise them.
    fn emit_event(&self, name: &str, args: Vec<ScriptValue>) -> Result<usize, ScriptError>;

    /// Load and execute a Lua script file (e.g. init.lua).
    fn load_script(&self, path: &Path) -> Result<(), ScriptError>;

    /// Execute a chunk of source under the given chunk name.
    fn exec_source(&self, chunk_name: &str, source: &str) -> Result<(), ScriptError>;

    /// Whether the engine is actually available (i.e. not `NoScriptingEngine`).
    fn is_available(&self) -> bool;

    /// Listeners scripts have registered on the host emitter for `name`.
    fn listener_count(&self, name: &str) -> usize;

    /// Event names with at least one script listener, sorted.
    fn event_names(&self) -> Vec<String>;
}

/// No-op scripting engine used when the `scripting` feature is disabled.
///
/// All operations are safe no-ops: events reach no listeners, script
/// loading is silently ignored, and the engine reports itself as unavailable.
pub struct NoScriptingEngine;

impl ScriptingEnginePort for NoScriptingEngine {
    fn emit_event(&self, _name: &str, _args: Vec<ScriptValue>) -> Result<usize, ScriptError> {
        Ok(0)
    }

    fn load_script(&self, _path: &Path) -> Result<(), ScriptError> {
        Ok(())
    }

    fn exec_source(&self, _chunk_name: &str, _source: &str) -> Result<(), ScriptError> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }

    fn listener_count(&self, _name: &str) -> usize {
        0
    }

    fn event_names(&self) -> Vec<String> {
        Vec::new()
    }
}
