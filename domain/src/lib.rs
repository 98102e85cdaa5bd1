//! Domain layer for luaglue
//!
//! This crate contains the event emitter core and the value objects shared
//! by the scripting host. It has no dependencies on the Lua runtime,
//! configuration files or logging.
//!
//! # Core Concepts
//!
//! ## Emitter (`eventlib`)
//!
//! A publish/subscribe registry mapping event names to ordered listener
//! sequences. Listeners are persistent (`on`) or fire-once (`once`).
//! Emission snapshots the sequence, keeps going past failing listeners, and
//! reports every failure in an [`Emission`].
//!
//! ## Sandbox policy
//!
//! A denylist of dotted global paths removed from a VM at start-up.

pub mod event;
pub mod sandbox;
pub mod scripting;

// Re-export commonly used types
pub use event::{
    Callback, Disposition, EmitError, Emission, Emitter, Event, Invocable, ListenerError,
    ListenerFailure, ListenerFailurePolicy, ListenerId, Subscription, callback,
};
pub use sandbox::{DEFAULT_DENYLIST, GlobalPath, SandboxPolicy, SandboxPolicyError};
pub use scripting::{LifecycleEvent, ScriptValue};
