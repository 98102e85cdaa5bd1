//! Scripting options — how the engine sets up a fresh VM.

use luaglue_domain::{ListenerFailurePolicy, SandboxPolicy};

/// Name of the global host emitter when none is configured.
pub const DEFAULT_EVENTS_GLOBAL: &str = "events";

/// Engine construction parameters.
///
/// Built from the file configuration by the infrastructure layer, or directly
/// by embedders and tests.
#[derive(Debug, Clone)]
pub struct ScriptingOptions {
    /// Sandbox applied after modules are registered; `None` disables it.
    pub sandbox: Option<SandboxPolicy>,
    /// How listener failures surface from `emit`.
    pub failure_policy: ListenerFailurePolicy,
    /// Global name under which the host emitter is installed.
    pub events_global: String,
    /// Whether `require("eventlib")` is available to scripts.
    pub preload_eventlib: bool,
}

impl Default for ScriptingOptions {
    fn default() -> Self {
        Self {
            sandbox: Some(SandboxPolicy::default()),
            failure_policy: ListenerFailurePolicy::default(),
            events_global: DEFAULT_EVENTS_GLOBAL.to_string(),
            preload_eventlib: true,
        }
    }
}

impl ScriptingOptions {
    // ==================== Builder Methods ====================

    pub fn with_sandbox(mut self, sandbox: Option<SandboxPolicy>) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn without_sandbox(mut self) -> Self {
        self.sandbox = None;
        self
    }

    pub fn with_failure_policy(mut self, policy: ListenerFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_events_global(mut self, name: impl Into<String>) -> Self {
        self.events_global = name.into();
        self
    }

    pub fn with_eventlib(mut self, preload: bool) -> Self {
        self.preload_eventlib = preload;
        self
    }
}
