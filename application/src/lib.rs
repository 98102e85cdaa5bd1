//! Application layer for luaglue
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_EVENTS_GLOBAL, ScriptingOptions};
pub use ports::scripting_engine::{NoScriptingEngine, ScriptError, ScriptingEnginePort};
pub use use_cases::load_scripts::{
    LoadScriptsError, LoadScriptsInput, LoadScriptsOutput, LoadScriptsUseCase,
};
