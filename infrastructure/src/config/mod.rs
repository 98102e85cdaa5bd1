//! Configuration file loading for luaglue
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LUAGLUE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./luaglue.toml` or `./.luaglue.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/luaglue/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{ConfigValidationError, FileConfig, FileSandboxConfig, FileScriptingConfig};
pub use loader::{ConfigLoader, ConfigSource};
