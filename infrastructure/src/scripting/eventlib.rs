//! `eventlib` Lua module — the domain [`Emitter`] exposed to scripts.
//!
//! ```lua
//! local eventlib = require("eventlib")
//! local em = eventlib.new()
//!
//! local id = em:on("tick", function(n) print("tick", n) end)
//! em:once("tick", function(n) print("first tick only") end)
//! em:emit("tick", 1)                    --> 2 (listeners invoked)
//! em:listenerCount("tick")              --> 1
//! em:off("tick", fn)                    -- remove every entry for fn
//! em:unsubscribe("tick", id)            -- remove one registration
//! em:dispatch(eventlib.Event("tick", 2))
//! em:eventNames()                       --> { "tick" }
//! em:removeAllListeners()               -- or removeAllListeners("tick")
//! ```
//!
//! Listeners are called with the event arguments unpacked. Their return
//! values are ignored; a raised Lua error is a listener failure.
//!
//! An emitter is a userdata whose user value table holds the listener
//! functions, keyed by slot. The Rust side only keeps slot numbers, so a
//! listener that captures its own emitter forms a cycle the Lua GC can
//! collect.

use luaglue_domain::{
    Disposition, EmitError, Emission, Emitter, Event, Invocable, ListenerError,
    ListenerFailurePolicy, ListenerId, Subscription,
};
use mlua::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use super::modules::register_module;

/// Name scripts pass to `require`.
pub const MODULE_NAME: &str = "eventlib";

/// Most arguments a single event table may carry.
pub const MAX_EVENT_ARGS: usize = 255;

/// Slot bookkeeping shared by an emitter and its listeners.
#[derive(Default)]
struct ListenerStore {
    next_slot: AtomicU64,
    /// The emitter's listener table, set only while one of its methods runs.
    active: Mutex<Option<LuaTable>>,
    /// Slots whose registration is gone; cleared from the table on the next call.
    released: Mutex<Vec<u64>>,
}

impl ListenerStore {
    fn allocate(&self) -> u64 {
        self.next_slot.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn activate(&self, table: Option<LuaTable>) -> Option<LuaTable> {
        std::mem::replace(&mut *lock(&self.active), table)
    }

    fn function(&self, slot: u64) -> Result<LuaFunction, ListenerError> {
        let table = lock(&self.active)
            .clone()
            .ok_or_else(|| ListenerError::new("listener invoked outside of an emission"))?;
        table
            .raw_get::<Option<LuaFunction>>(slot)
            .map_err(|e| ListenerError::new(e.to_string()))?
            .ok_or_else(|| ListenerError::new(format!("listener slot {} is empty", slot)))
    }

    fn release(&self, slot: u64) {
        lock(&self.released).push(slot);
    }

    fn sweep(&self, table: &LuaTable) -> LuaResult<()> {
        let released = std::mem::take(&mut *lock(&self.released));
        for slot in released {
            table.raw_set(slot, LuaValue::Nil)?;
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A Lua function registered as a listener, referenced by its slot.
///
/// Identity is the Lua function object, so `off` matches the same function
/// value no matter how many times it crossed into Rust.
struct LuaListener {
    slot: u64,
    identity: usize,
    store: Arc<ListenerStore>,
}

impl Invocable<LuaValue> for LuaListener {
    fn invoke(&self, event: &Event<LuaValue>) -> Result<(), ListenerError> {
        let func = self.store.function(self.slot)?;
        let args = LuaMultiValue::from_iter(event.args().iter().cloned());
        func.call::<()>(args)
            .map_err(|e| ListenerError::new(e.to_string()))
    }

    fn identity(&self) -> usize {
        self.identity
    }
}

impl Drop for LuaListener {
    fn drop(&mut self) {
        self.store.release(self.slot);
    }
}

/// Emitter whose event arguments are Lua values, as seen by scripts.
pub struct LuaEventEmitter {
    emitter: Emitter<LuaValue>,
    store: Arc<ListenerStore>,
    policy: ListenerFailurePolicy,
}

impl LuaEventEmitter {
    fn new(policy: ListenerFailurePolicy) -> Self {
        Self {
            emitter: Emitter::new(),
            store: Arc::new(ListenerStore::default()),
            policy,
        }
    }

    fn subscribe(
        &self,
        listeners: &LuaTable,
        name: String,
        func: LuaFunction,
        disposition: Disposition,
    ) -> LuaResult<u64> {
        let slot = self.store.allocate();
        let identity = func.to_pointer() as usize;
        listeners.raw_set(slot, func)?;

        let listener = Arc::new(LuaListener {
            slot,
            identity,
            store: Arc::clone(&self.store),
        });
        let subscription = match disposition {
            Disposition::Persistent => self.emitter.on(name, listener),
            Disposition::Once => self.emitter.once(name, listener),
        };
        Ok(subscription.id().as_u64())
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.emitter.listener_count(name)
    }

    pub fn event_names(&self) -> BTreeSet<String> {
        self.emitter.event_names()
    }
}

impl LuaUserData for LuaEventEmitter {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        // em:on(name, fn) -> id
        methods.add_function(
            "on",
            |_, (this, name, func): (LuaAnyUserData, String, LuaFunction)| {
                with_emitter(&this, |em, listeners| {
                    em.subscribe(listeners, name, func, Disposition::Persistent)
                })
            },
        );

        // em:once(name, fn) -> id
        methods.add_function(
            "once",
            |_, (this, name, func): (LuaAnyUserData, String, LuaFunction)| {
                with_emitter(&this, |em, listeners| {
                    em.subscribe(listeners, name, func, Disposition::Once)
                })
            },
        );

        // em:off(name, fn) -> removed count
        methods.add_function(
            "off",
            |_, (this, name, func): (LuaAnyUserData, String, LuaFunction)| {
                with_emitter(&this, |em, _| {
                    Ok(em.emitter.off_identity(&name, func.to_pointer() as usize))
                })
            },
        );

        // em:unsubscribe(name, id) -> bool
        methods.add_function(
            "unsubscribe",
            |_, (this, name, id): (LuaAnyUserData, String, u64)| {
                with_emitter(&this, |em, _| {
                    Ok(em
                        .emitter
                        .unsubscribe(&Subscription::new(name, ListenerId::new(id))))
                })
            },
        );

        // em:removeAllListeners([name])
        methods.add_function(
            "removeAllListeners",
            |_, (this, name): (LuaAnyUserData, Option<String>)| {
                with_emitter(&this, |em, _| {
                    em.emitter.remove_all_listeners(name.as_deref());
                    Ok(())
                })
            },
        );

        // em:emit(name, ...) -> invoked count
        methods.add_function(
            "emit",
            |_, (this, name, args): (LuaAnyUserData, String, LuaVariadic<LuaValue>)| {
                emit(&this, &name, args.iter().cloned().collect())?.map_err(LuaError::external)
            },
        );

        // em:dispatch(event) -> invoked count
        methods.add_function("dispatch", |_, (this, event): (LuaAnyUserData, LuaTable)| {
            let event = event_from_table(&event)?;
            dispatch(&this, &event)?.map_err(LuaError::external)
        });

        // em:listenerCount(name) -> integer
        methods.add_method("listenerCount", |_, this, name: String| {
            Ok(this.listener_count(&name))
        });

        // em:eventNames() -> sorted sequence of names
        methods.add_method("eventNames", |lua, this, ()| {
            lua.create_sequence_from(this.event_names())
        });
    }
}

/// Run `f` against the emitter behind `ud`, with its listener table visible
/// to the listeners it invokes.
fn with_emitter<R>(
    ud: &LuaAnyUserData,
    f: impl FnOnce(&LuaEventEmitter, &LuaTable) -> LuaResult<R>,
) -> LuaResult<R> {
    let em = ud.borrow::<LuaEventEmitter>()?;
    let listeners: LuaTable = ud.user_value()?;
    em.store.sweep(&listeners)?;

    let previous = em.store.activate(Some(listeners.clone()));
    let result = f(&*em, &listeners);
    em.store.activate(previous);

    em.store.sweep(&listeners)?;
    result
}

/// Create an emitter with an empty listener table.
pub fn create_emitter(lua: &Lua, policy: ListenerFailurePolicy) -> LuaResult<LuaAnyUserData> {
    let ud = lua.create_userdata(LuaEventEmitter::new(policy))?;
    ud.set_user_value(lua.create_table()?)?;
    Ok(ud)
}

/// Emit `name` on the emitter behind `ud`, applying its failure policy.
pub fn emit(
    ud: &LuaAnyUserData,
    name: &str,
    args: Vec<LuaValue>,
) -> LuaResult<Result<usize, EmitError>> {
    with_emitter(ud, |em, _| Ok(settle(em.emitter.emit(name, args), em.policy)))
}

/// Dispatch a pre-built event on the emitter behind `ud`.
pub fn dispatch(
    ud: &LuaAnyUserData,
    event: &Event<LuaValue>,
) -> LuaResult<Result<usize, EmitError>> {
    with_emitter(ud, |em, _| Ok(settle(em.emitter.dispatch(event), em.policy)))
}

/// Apply the failure policy to a finished emission.
///
/// Under [`ListenerFailurePolicy::Log`] failures are logged and the invoked
/// count is returned; under `Raise` they come back as one [`EmitError`].
pub fn settle(emission: Emission, policy: ListenerFailurePolicy) -> Result<usize, EmitError> {
    match emission.into_result() {
        Ok(invoked) => Ok(invoked),
        Err(e) if policy == ListenerFailurePolicy::Log => {
            for failure in &e.failures {
                warn!("Listener for '{}' failed: {}", e.event, failure);
            }
            Ok(e.invoked)
        }
        Err(e) => Err(e),
    }
}

/// Build an event table `{ name = ..., n = <arg count>, ...args }`.
pub fn create_event_table(lua: &Lua, name: &str, args: &[LuaValue]) -> LuaResult<LuaTable> {
    check_arg_count(name, args.len())?;
    let table = lua.create_table()?;
    table.set("name", name)?;
    table.set("n", args.len())?;
    for (i, arg) in args.iter().enumerate() {
        table.raw_set(i + 1, arg.clone())?;
    }
    Ok(table)
}

/// Read an event table back into a domain [`Event`].
///
/// `n` bounds the arguments so trailing nils survive; without it the
/// sequence length is used. Either way the count is capped at
/// [`MAX_EVENT_ARGS`].
fn event_from_table(table: &LuaTable) -> LuaResult<Event<LuaValue>> {
    let name: String = table.get("name")?;
    let n = match table.get::<Option<i64>>("n")? {
        Some(n) => usize::try_from(n).map_err(|_| {
            LuaError::runtime(format!("event '{}': n must not be negative (got {})", name, n))
        })?,
        None => table.raw_len(),
    };
    check_arg_count(&name, n)?;

    let args = (1..=n)
        .map(|i| table.raw_get::<LuaValue>(i))
        .collect::<LuaResult<Vec<_>>>()?;
    Ok(Event::new(name, args))
}

fn check_arg_count(name: &str, n: usize) -> LuaResult<()> {
    if n > MAX_EVENT_ARGS {
        return Err(LuaError::runtime(format!(
            "event '{}' has {} arguments (at most {} allowed)",
            name, n, MAX_EVENT_ARGS
        )));
    }
    Ok(())
}

/// Build the table `require("eventlib")` returns.
pub fn create_eventlib_table(lua: &Lua, policy: ListenerFailurePolicy) -> LuaResult<LuaTable> {
    let module = lua.create_table()?;

    let new_fn = lua.create_function(move |lua, ()| create_emitter(lua, policy))?;
    module.set("new", new_fn)?;

    let event_fn =
        lua.create_function(|lua, (name, args): (String, LuaVariadic<LuaValue>)| {
            create_event_table(lua, &name, &args)
        })?;
    module.set("Event", event_fn)?;

    Ok(module)
}

/// Register `eventlib` in `package.preload`.
pub fn register_eventlib(lua: &Lua, policy: ListenerFailurePolicy) -> LuaResult<()> {
    let loader = lua.create_function(move |lua, _: LuaMultiValue| {
        create_eventlib_table(lua, policy)
    })?;
    register_module(lua, MODULE_NAME, loader)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lua_with_eventlib(policy: ListenerFailurePolicy) -> Lua {
        let lua = Lua::new();
        register_eventlib(&lua, policy).unwrap();
        lua
    }

    fn full_collect(lua: &Lua) {
        // Two cycles: userdata finalizers run in the first, memory is freed in the second.
        for _ in 0..3 {
            lua.gc_collect().unwrap();
        }
    }

    #[test]
    fn test_tick_scenario_from_lua() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (i64, i64, i64, i64, String) = lua
            .load(
                r#"
            local eventlib = require("eventlib")
            local em = eventlib.new()
            local order = {}
            em:on("tick", function(n) order[#order + 1] = "A" .. n end)
            em:once("tick", function(n) order[#order + 1] = "B" .. n end)

            local first = em:emit("tick", 1)
            local after_first = em:listenerCount("tick")
            local second = em:emit("tick", 2)
            return first, after_first, second, em:listenerCount("tick"), table.concat(order, ",")
        "#,
            )
            .eval()
            .unwrap();

        assert_eq!(result, (2, 1, 1, 1, "A1,B1,A2".to_string()));
    }

    #[test]
    fn test_emit_without_listeners_returns_zero() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let count: i64 = lua
            .load(r#"return require("eventlib").new():emit("nothing", 1, 2)"#)
            .eval()
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_off_matches_same_function_value() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (i64, i64, i64) = lua
            .load(
                r#"
            local em = require("eventlib").new()
            local hits = 0
            local fn = function() hits = hits + 1 end
            local twin = function() hits = hits + 1 end
            em:on("x", fn)
            em:on("x", fn)
            em:on("x", twin)
            local removed = em:off("x", fn)
            em:emit("x")
            return removed, em:listenerCount("x"), hits
        "#,
            )
            .eval()
            .unwrap();

        assert_eq!(result, (2, 1, 1));
    }

    #[test]
    fn test_unsubscribe_by_id() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (bool, bool, i64) = lua
            .load(
                r#"
            local em = require("eventlib").new()
            local fn = function() end
            local id = em:on("x", fn)
            em:on("x", fn)
            return em:unsubscribe("x", id), em:unsubscribe("x", id), em:listenerCount("x")
        "#,
            )
            .eval()
            .unwrap();

        assert_eq!(result, (true, false, 1));
    }

    #[test]
    fn test_raise_policy_runs_all_listeners_then_errors() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        lua.load(
            r#"
            em = require("eventlib").new()
            ran = {}
            em:on("x", function() ran[#ran + 1] = "a" end)
            em:once("x", function() error("listener exploded") end)
            em:on("x", function() ran[#ran + 1] = "c" end)
        "#,
        )
        .exec()
        .unwrap();

        let err = lua.load(r#"em:emit("x")"#).exec().unwrap_err();
        assert!(err.to_string().contains("listener exploded"));
        assert!(err.to_string().contains("1 of 3"));

        let result: (String, i64) = lua
            .load(r#"return table.concat(ran, ","), em:listenerCount("x")"#)
            .eval()
            .unwrap();
        assert_eq!(result, ("a,c".to_string(), 2));
    }

    #[test]
    fn test_log_policy_returns_count() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Log);
        let count: i64 = lua
            .load(
                r#"
            local em = require("eventlib").new()
            em:on("x", function() error("ignored") end)
            em:on("x", function() end)
            return em:emit("x")
        "#,
            )
            .eval()
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_listener_added_during_emit_runs_next_time() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (i64, i64, i64) = lua
            .load(
                r#"
            local em = require("eventlib").new()
            local late_hits = 0
            em:once("x", function()
                em:on("x", function() late_hits = late_hits + 1 end)
            end)
            local first = em:emit("x")
            local second = em:emit("x")
            return first, second, late_hits
        "#,
            )
            .eval()
            .unwrap();
        assert_eq!(result, (1, 1, 1));
    }

    #[test]
    fn test_listener_removed_during_emit_still_runs() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (i64, i64, i64) = lua
            .load(
                r#"
            local em = require("eventlib").new()
            local second_hits = 0
            local second = function() second_hits = second_hits + 1 end
            em:on("x", function() em:off("x", second) end)
            em:on("x", second)
            local first = em:emit("x")
            local again = em:emit("x")
            return first, again, second_hits
        "#,
            )
            .eval()
            .unwrap();
        assert_eq!(result, (2, 1, 1));
    }

    #[test]
    fn test_dispatch_prebuilt_event_keeps_nils() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (i64, i64, String) = lua
            .load(
                r##"
            local eventlib = require("eventlib")
            local em = eventlib.new()
            local seen = {}
            em:on("x", function(...)
                seen.n = select("#", ...)
                seen.first = tostring((...))
            end)
            local ev = eventlib.Event("x", "hello", nil)
            local count = em:dispatch(ev)
            return count, seen.n, seen.first
        "##,
            )
            .eval()
            .unwrap();
        assert_eq!(result, (1, 2, "hello".to_string()));
    }

    #[test]
    fn test_dispatch_without_n_uses_sequence_length() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (i64, String) = lua
            .load(
                r#"
            local em = require("eventlib").new()
            local seen
            em:on("x", function(a, b, c) seen = table.concat({ a, b, tostring(c) }, ",") end)
            return em:dispatch({ name = "x", "a", "b" }), seen
        "#,
            )
            .eval()
            .unwrap();
        assert_eq!(result, (1, "a,b,nil".to_string()));
    }

    #[test]
    fn test_dispatch_rejects_oversized_n() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (bool, String, i64) = lua
            .load(
                r#"
            local em = require("eventlib").new()
            local hits = 0
            em:on("x", function() hits = hits + 1 end)
            local ok, err = pcall(em.dispatch, em, { name = "x", n = 2^60 })
            return ok, tostring(err), hits
        "#,
            )
            .eval()
            .unwrap();
        assert!(!result.0);
        assert!(result.1.contains("at most 255"));
        assert_eq!(result.2, 0);
    }

    #[test]
    fn test_dispatch_rejects_negative_n() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let (ok, err): (bool, String) = lua
            .load(
                r#"
            local em = require("eventlib").new()
            local ok, err = pcall(em.dispatch, em, { name = "x", n = -1 })
            return ok, tostring(err)
        "#,
            )
            .eval()
            .unwrap();
        assert!(!ok);
        assert!(err.contains("must not be negative"));
    }

    #[test]
    fn test_event_rejects_too_many_args() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let ok: bool = lua
            .load(
                r#"
            local args = {}
            for i = 1, 300 do args[i] = i end
            return (pcall(require("eventlib").Event, "x", table.unpack(args)))
        "#,
            )
            .eval()
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_event_table_shape() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (String, i64, i64) = lua
            .load(
                r#"
            local ev = require("eventlib").Event("tick", 10, 20)
            return ev.name, ev.n, ev[2]
        "#,
            )
            .eval()
            .unwrap();
        assert_eq!(result, ("tick".to_string(), 2, 20));
    }

    #[test]
    fn test_event_names_and_remove_all() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (String, i64, i64) = lua
            .load(
                r#"
            local em = require("eventlib").new()
            em:on("b", function() end)
            em:on("a", function() end)
            em:on("c", function() end)
            local names = table.concat(em:eventNames(), ",")
            em:removeAllListeners("a")
            local remaining = #em:eventNames()
            em:removeAllListeners()
            return names, remaining, #em:eventNames()
        "#,
            )
            .eval()
            .unwrap();
        assert_eq!(result, ("a,b,c".to_string(), 2, 0));
    }

    #[test]
    fn test_emitters_are_independent() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        let result: (i64, i64) = lua
            .load(
                r#"
            local eventlib = require("eventlib")
            local a, b = eventlib.new(), eventlib.new()
            a:on("x", function() end)
            return a:listenerCount("x"), b:listenerCount("x")
        "#,
            )
            .eval()
            .unwrap();
        assert_eq!(result, (1, 0));
    }

    #[test]
    fn test_removed_listener_functions_are_released() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        lua.load(
            r#"
            local em = require("eventlib").new()
            weak = setmetatable({}, { __mode = "v" })
            local kept = function() end
            local removed = function() end
            local fired = function() end
            weak.removed, weak.fired = removed, fired
            em:on("x", kept)
            em:on("x", removed)
            em:once("y", fired)
            em:off("x", removed)
            em:emit("y")
            holder = em
        "#,
        )
        .exec()
        .unwrap();
        full_collect(&lua);

        let result: (bool, bool, i64) = lua
            .load(r#"return weak.removed == nil, weak.fired == nil, holder:listenerCount("x")"#)
            .eval()
            .unwrap();
        assert_eq!(result, (true, true, 1));
    }

    #[test]
    fn test_self_referencing_emitters_are_collected() {
        let lua = lua_with_eventlib(ListenerFailurePolicy::Raise);
        lua.load(
            r#"
            local eventlib = require("eventlib")
            function churn(count)
                for _ = 1, count do
                    local em = eventlib.new()
                    em:on("x", function() return em:listenerCount("x") end)
                    em:once("y", function() em:off("x", print) end)
                end
            end
            churn(100)
        "#,
        )
        .exec()
        .unwrap();
        full_collect(&lua);
        let baseline = lua.used_memory();

        lua.load("churn(5000)").exec().unwrap();
        full_collect(&lua);
        let after = lua.used_memory();

        assert!(
            after < baseline + 64 * 1024,
            "emitters leaked: {} -> {} bytes",
            baseline,
            after
        );
    }

    #[test]
    fn test_host_emit_from_rust() {
        let lua = Lua::new();
        let ud = create_emitter(&lua, ListenerFailurePolicy::Raise).unwrap();
        lua.globals().set("em", ud.clone()).unwrap();
        lua.load(r#"em:on("x", function(v) got = v end)"#)
            .exec()
            .unwrap();

        let invoked = emit(&ud, "x", vec![LuaValue::Integer(7)]).unwrap().unwrap();
        assert_eq!(invoked, 1);
        let got: i64 = lua.globals().get("got").unwrap();
        assert_eq!(got, 7);
    }

    #[test]
    fn test_settle_policies() {
        let emitter: Emitter<i64> = Emitter::new();
        emitter.on("x", luaglue_domain::callback(|_e: &Event<i64>| Err("nope".into())));

        let raised = settle(emitter.emit("x", vec![]), ListenerFailurePolicy::Raise);
        assert_eq!(raised.unwrap_err().failures.len(), 1);

        let logged = settle(emitter.emit("x", vec![]), ListenerFailurePolicy::Log);
        assert_eq!(logged.unwrap(), 1);
    }
}
