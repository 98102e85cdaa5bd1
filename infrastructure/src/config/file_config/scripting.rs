//! Scripting configuration from TOML (`[scripting]` section)

use luaglue_application::DEFAULT_EVENTS_GLOBAL;
use luaglue_domain::ListenerFailurePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw scripting configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScriptingConfig {
    /// Script run first; a failure here aborts start-up
    pub init_script: Option<PathBuf>,
    /// Directory whose `*.lua` files are loaded in alphabetical order
    pub plugin_dir: Option<PathBuf>,
    /// Global name of the host emitter
    pub events_global: String,
    /// `"raise"` or `"log"`
    pub listener_failures: ListenerFailurePolicy,
    /// Make `require("eventlib")` available
    pub eventlib: bool,
}

impl Default for FileScriptingConfig {
    fn default() -> Self {
        Self {
            init_script: None,
            plugin_dir: None,
            events_global: DEFAULT_EVENTS_GLOBAL.to_string(),
            listener_failures: ListenerFailurePolicy::default(),
            eventlib: true,
        }
    }
}

/// Whether `name` can be used as a Lua global (`events`, `_host`).
pub(crate) fn is_lua_identifier(name: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
        "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
    ];

    let mut chars = name.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    starts_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !KEYWORDS.contains(&name)
}

/// Whether `name` is one of the globals a stock Lua 5.4 state defines.
pub(crate) fn is_standard_global(name: &str) -> bool {
    const STANDARD_GLOBALS: &[&str] = &[
        "_G", "_VERSION", "assert", "collectgarbage", "coroutine", "debug", "dofile", "error",
        "getmetatable", "io", "ipairs", "load", "loadfile", "math", "next", "os", "package",
        "pairs", "pcall", "print", "rawequal", "rawget", "rawlen", "rawset", "require", "select",
        "setmetatable", "string", "table", "tonumber", "tostring", "type", "utf8", "warn",
        "xpcall",
    ];
    STANDARD_GLOBALS.contains(&name)
}
