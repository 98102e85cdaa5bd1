//! Main Lua scripting engine — ties together the host emitter, `eventlib` and the sandbox.
//!
//! `LuaScriptingEngine` implements `ScriptingEnginePort` from the application layer,
//! providing the concrete Lua 5.4 runtime backed by mlua.

use luaglue_application::{ScriptError, ScriptingEnginePort, ScriptingOptions};
use luaglue_domain::ScriptValue;
use mlua::prelude::*;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::eventlib::{self, LuaEventEmitter, create_emitter, register_eventlib};
use super::sandbox::apply_sandbox;

/// Lua 5.4 scripting engine implementing `ScriptingEnginePort`.
///
/// Owns the Lua VM and the host emitter scripts subscribe to.
/// Thread-safe via internal `Mutex` wrapping of the Lua state.
pub struct LuaScriptingEngine {
    lua: Mutex<Lua>,
    host_events: LuaAnyUserData,
    sandbox_removed: Vec<String>,
}

impl LuaScriptingEngine {
    /// Create a new Lua scripting engine.
    ///
    /// Sets up the VM with:
    /// - `require("eventlib")` (unless disabled)
    /// - the host emitter as a global (`events` by default), which must not
    ///   shadow an existing global
    /// - the sandbox, applied last so registration code may still use
    ///   everything it needs
    pub fn new(options: &ScriptingOptions) -> Result<Self, ScriptError> {
        let lua = Lua::new();

        if options.preload_eventlib {
            register_eventlib(&lua, options.failure_policy).map_err(lua_to_script_error)?;
        }

        let globals = lua.globals();
        let existing: LuaValue = globals
            .raw_get(options.events_global.as_str())
            .map_err(lua_to_script_error)?;
        if !existing.is_nil() {
            return Err(ScriptError::new(format!(
                "cannot install host events as '{}': the global is already defined",
                options.events_global
            )));
        }

        let host_events =
            create_emitter(&lua, options.failure_policy).map_err(lua_to_script_error)?;
        globals
            .raw_set(options.events_global.as_str(), host_events.clone())
            .map_err(lua_to_script_error)?;

        let sandbox_removed = match &options.sandbox {
            Some(policy) => apply_sandbox(&lua, policy)
                .map_err(|e| ScriptError::new(format!("sandbox setup failed: {}", e)))?,
            None => Vec::new(),
        };

        debug!(
            "Lua engine ready (events global '{}', {} sandboxed globals)",
            options.events_global,
            sandbox_removed.len()
        );

        Ok(Self {
            lua: Mutex::new(lua),
            host_events,
            sandbox_removed,
        })
    }

    /// Globals the sandbox removed while the engine was built.
    pub fn sandbox_removed(&self) -> &[String] {
        &self.sandbox_removed
    }

    fn lock_lua(&self) -> Result<MutexGuard<'_, Lua>, ScriptError> {
        self.lua
            .lock()
            .map_err(|e| ScriptError::new(format!("lua lock poisoned: {}", e)))
    }
}

impl ScriptingEnginePort for LuaScriptingEngine {
    fn emit_event(&self, name: &str, args: Vec<ScriptValue>) -> Result<usize, ScriptError> {
        let args = {
            let lua = self.lock_lua()?;
            args.into_iter()
                .map(|value| to_lua_value(&lua, value))
                .collect::<LuaResult<Vec<_>>>()
                .map_err(lua_to_script_error)?
        };

        // The engine lock is released here: listeners run Lua directly and
        // may themselves emit on the host emitter.
        eventlib::emit(&self.host_events, name, args)
            .map_err(lua_to_script_error)?
            .map_err(ScriptError::from)
    }

    fn load_script(&self, path: &Path) -> Result<(), ScriptError> {
        let lua = self.lock_lua()?;

        let content = std::fs::read_to_string(path).map_err(|e| {
            ScriptError::new(format!("failed to read {}: {}", path.display(), e))
        })?;

        lua.load(&content)
            .set_name(path.to_string_lossy())
            .exec()
            .map_err(lua_to_script_error)?;

        Ok(())
    }

    fn exec_source(&self, chunk_name: &str, source: &str) -> Result<(), ScriptError> {
        let lua = self.lock_lua()?;
        lua.load(source)
            .set_name(chunk_name)
            .exec()
            .map_err(lua_to_script_error)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn listener_count(&self, name: &str) -> usize {
        self.host_events
            .borrow::<LuaEventEmitter>()
            .map(|em| em.listener_count(name))
            .unwrap_or(0)
    }

    fn event_names(&self) -> Vec<String> {
        self.host_events
            .borrow::<LuaEventEmitter>()
            .map(|em| em.event_names().into_iter().collect())
            .unwrap_or_default()
    }
}

fn to_lua_value(lua: &Lua, value: ScriptValue) -> LuaResult<LuaValue> {
    Ok(match value {
        ScriptValue::Nil => LuaValue::Nil,
        ScriptValue::Boolean(b) => LuaValue::Boolean(b),
        ScriptValue::Integer(n) => LuaValue::Integer(n),
        ScriptValue::Number(n) => LuaValue::Number(n),
        ScriptValue::String(s) => LuaValue::String(lua.create_string(&s)?),
    })
}

/// Convert an mlua error to a ScriptError.
fn lua_to_script_error(e: LuaError) -> ScriptError {
    ScriptError::new(e.to_string())
}
