//! Event emitter — named events, ordered listeners, persistent or fire-once.
//!
//! Emission works on a snapshot of the listener sequence taken when the
//! emission starts:
//! - listeners added during an emission first run on the next one
//! - listeners removed during an emission still run in the current one
//!
//! The internal lock is never held while a callback runs, so callbacks may
//! call back into the same emitter (`on`, `off`, `once`, even `emit`).

use super::entities::Event;
use super::error::Emission;
use super::listener::{Callback, Disposition, Invocable, ListenerId, Registration, Subscription};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type ListenerMap<A> = HashMap<String, Vec<Arc<Registration<A>>>>;

/// Publish/subscribe registry keyed by event name.
pub struct Emitter<A> {
    listeners: Mutex<ListenerMap<A>>,
    next_id: AtomicU64,
}

impl<A> Emitter<A> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a persistent listener at the end of `name`'s sequence.
    pub fn on(&self, name: impl Into<String>, callback: Callback<A>) -> Subscription {
        self.register(name.into(), callback, Disposition::Persistent)
    }

    /// Register a listener that is removed after its first invocation.
    pub fn once(&self, name: impl Into<String>, callback: Callback<A>) -> Subscription {
        self.register(name.into(), callback, Disposition::Once)
    }

    fn register(&self, name: String, callback: Callback<A>, disposition: Disposition) -> Subscription {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let registration = Arc::new(Registration::new(id, callback, disposition));
        self.lock()
            .entry(name.clone())
            .or_default()
            .push(registration);
        Subscription::new(name, id)
    }

    /// Remove every listener under `name` whose callback has the same
    /// identity as `callback`. Returns how many entries were removed.
    pub fn off(&self, name: &str, callback: &dyn Invocable<A>) -> usize {
        self.off_identity(name, callback.identity())
    }

    /// Like [`off`](Self::off), for hosts that only hold the identity of
    /// the callback value.
    pub fn off_identity(&self, name: &str, identity: usize) -> usize {
        self.remove_where(name, |r| r.callback.identity() == identity)
    }

    /// Remove the single registration behind `subscription`.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let id = subscription.id();
        self.remove_where(subscription.name(), |r| r.id == id) > 0
    }

    /// Clear one event's listeners, or every event's when `name` is `None`.
    pub fn remove_all_listeners(&self, name: Option<&str>) {
        let mut map = self.lock();
        match name {
            Some(name) => {
                map.remove(name);
            }
            None => map.clear(),
        }
    }

    /// Build an [`Event`] from `name` and `args` and dispatch it.
    pub fn emit(&self, name: &str, args: Vec<A>) -> Emission {
        self.dispatch(&Event::new(name, args))
    }

    /// Invoke every listener registered for `event.name()`, in order.
    ///
    /// A failing listener does not stop the emission; its failure is
    /// recorded in the returned [`Emission`]. Fire-once listeners are
    /// removed after their invocation whether or not it failed.
    pub fn dispatch(&self, event: &Event<A>) -> Emission {
        let mut emission = Emission::new(event.name());

        let snapshot: Vec<Arc<Registration<A>>> = match self.lock().get(event.name()) {
            Some(sequence) => sequence.clone(),
            None => return emission,
        };

        for registration in snapshot {
            if registration.is_once() && !registration.claim() {
                continue;
            }

            let result = registration.callback.invoke(event);

            if registration.is_once() {
                let id = registration.id;
                self.remove_where(event.name(), |r| r.id == id);
            }
            emission.record(registration.id, result);
        }

        emission
    }

    /// Number of listeners currently registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.lock().get(name).map_or(0, |v| v.len())
    }

    /// Names that currently have at least one listener.
    pub fn event_names(&self) -> BTreeSet<String> {
        self.lock()
            .iter()
            .filter(|(_, sequence)| !sequence.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Total number of listeners across all events.
    pub fn total_listener_count(&self) -> usize {
        self.lock().values().map(|v| v.len()).sum()
    }

    fn remove_where(&self, name: &str, predicate: impl Fn(&Registration<A>) -> bool) -> usize {
        let mut map = self.lock();
        let Some(sequence) = map.get_mut(name) else {
            return 0;
        };
        let before = sequence.len();
        sequence.retain(|r| !predicate(r));
        let removed = before - sequence.len();
        if sequence.is_empty() {
            map.remove(name);
        }
        removed
    }

    // A panicking callback never runs under this lock, so recovering from
    // poisoning cannot observe a half-updated map.
    fn lock(&self) -> MutexGuard<'_, ListenerMap<A>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<A> Default for Emitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for Emitter<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("events", &self.event_names())
            .field("listeners", &self.total_listener_count())
            .finish()
    }
}
