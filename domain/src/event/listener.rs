//! Listener abstractions: the invocable trait, ids and subscription handles.

use super::entities::Event;
use super::error::ListenerError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Something the emitter can call with an [`Event`].
///
/// Hosts wrap their own callback values (a Rust closure, a Lua function)
/// in an implementation of this trait. The return value of the underlying
/// callback is not observed; only success or failure is.
pub trait Invocable<A>: Send + Sync {
    /// Invoke the callback for one emission.
    fn invoke(&self, event: &Event<A>) -> Result<(), ListenerError>;

    /// Identity used by [`Emitter::off`](super::Emitter::off).
    ///
    /// Defaults to the address of the invocable itself, so two distinct
    /// closures with identical bodies are different listeners. Wrappers
    /// around host-managed callbacks override this to expose the identity
    /// of the wrapped host value instead.
    fn identity(&self) -> usize {
        (self as *const Self).cast::<()>() as usize
    }
}

impl<A, F> Invocable<A> for F
where
    F: Fn(&Event<A>) -> Result<(), ListenerError> + Send + Sync,
{
    fn invoke(&self, event: &Event<A>) -> Result<(), ListenerError> {
        self(event)
    }
}

/// Shared handle to a registered callback.
pub type Callback<A> = Arc<dyn Invocable<A>>;

/// Wrap a closure as a [`Callback`].
///
/// Going through this function lets the compiler infer the closure's
/// signature from the `Fn` bound.
pub fn callback<A, F>(f: F) -> Callback<A>
where
    A: 'static,
    F: Fn(&Event<A>) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Unique (per emitter) identifier of one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Handle returned by `on`/`once`, usable with
/// [`Emitter::unsubscribe`](super::Emitter::unsubscribe).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    name: String,
    id: ListenerId,
}

impl Subscription {
    pub fn new(name: String, id: ListenerId) -> Self {
        Self { name, id }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

/// Whether a listener survives its first invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Persistent,
    Once,
}

/// One entry in an event's listener sequence.
pub(crate) struct Registration<A> {
    pub(crate) id: ListenerId,
    pub(crate) callback: Callback<A>,
    pub(crate) disposition: Disposition,
    fired: AtomicBool,
}

impl<A> Registration<A> {
    pub(crate) fn new(id: ListenerId, callback: Callback<A>, disposition: Disposition) -> Self {
        Self {
            id,
            callback,
            disposition,
            fired: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_once(&self) -> bool {
        self.disposition == Disposition::Once
    }

    /// Claim a fire-once registration for invocation.
    ///
    /// Returns `false` if it was already claimed, e.g. by an outer emission
    /// that is still running the callback.
    pub(crate) fn claim(&self) -> bool {
        !self.fired.swap(true, Ordering::AcqRel)
    }
}
