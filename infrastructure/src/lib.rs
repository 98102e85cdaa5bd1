//! Infrastructure layer for luaglue
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Lua runtime (behind the `scripting`
//! feature) and configuration file loading.

pub mod config;
#[cfg(feature = "scripting")]
pub mod scripting;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigSource, ConfigValidationError, FileConfig, FileSandboxConfig,
    FileScriptingConfig,
};
#[cfg(feature = "scripting")]
pub use scripting::LuaScriptingEngine;
