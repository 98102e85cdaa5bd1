//! Application-level configuration.
//!
//! - [`ScriptingOptions`] — how the scripting engine prepares a fresh VM

pub mod scripting_options;

pub use scripting_options::{DEFAULT_EVENTS_GLOBAL, ScriptingOptions};
