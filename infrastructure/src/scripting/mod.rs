//! Lua scripting platform (feature-gated: `scripting`)
//!
//! Provides the `LuaScriptingEngine` that implements `ScriptingEnginePort`
//! from the application layer, backed by mlua (Lua 5.4).
//!
//! # Modules
//!
//! - `eventlib` — the domain emitter as a Lua module and host global
//! - `modules` — `package.preload` registration for `require`
//! - `sandbox` — denylisted globals and C module blocking
//! - `lua_engine` — Main engine struct tying everything together

pub mod eventlib;
mod lua_engine;
pub mod modules;
mod sandbox;

pub use eventlib::{LuaEventEmitter, create_emitter, register_eventlib};
pub use lua_engine::LuaScriptingEngine;
pub use modules::register_module;
pub use sandbox::apply_sandbox;
