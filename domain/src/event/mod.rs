//! Event emitter domain (`eventlib`)
//!
//! - [`Emitter`] — name → ordered listeners registry with `on`/`once`/`off`/`emit`
//! - [`Event`] — immutable (name, args) pair handed to listeners
//! - [`Invocable`] — the single-method callback seam hosts implement
//! - [`Emission`] — per-emit report of invoked listeners and failures

pub mod emitter;
pub mod entities;
pub mod error;
pub mod listener;
pub mod policy;

pub use emitter::Emitter;
pub use entities::Event;
pub use error::{EmitError, Emission, ListenerError, ListenerFailure};
pub use listener::{Callback, Disposition, Invocable, ListenerId, Subscription, callback};
pub use policy::ListenerFailurePolicy;
