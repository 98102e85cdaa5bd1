//! Module registration — expose Rust-built capabilities to `require`.
//!
//! A capability is registered under a fixed name by installing its loader
//! in `package.preload`, so `require(name)` builds it on first use and Lua's
//! own `package.loaded` cache takes over from there.

use mlua::prelude::*;
use tracing::debug;

/// Install `loader` as `package.preload[name]`.
pub fn register_module(lua: &Lua, name: &str, loader: LuaFunction) -> LuaResult<()> {
    preload_table(lua)?.set(name, loader)?;
    debug!("Registered Lua module '{}'", name);
    Ok(())
}

fn preload_table(lua: &Lua) -> LuaResult<LuaTable> {
    let package: LuaTable = lua.globals().get("package")?;
    package.get("preload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_module_is_required_once() {
        let lua = Lua::new();
        let loader = lua
            .load(
                r#"
            function()
                _G.loads = (_G.loads or 0) + 1
                return { answer = 42 }
            end
        "#,
            )
            .eval::<LuaFunction>()
            .unwrap();
        register_module(&lua, "answers", loader).unwrap();

        let answer: i64 = lua
            .load("require('answers'); return require('answers').answer")
            .eval()
            .unwrap();
        assert_eq!(answer, 42);

        let loads: i64 = lua.globals().get("loads").unwrap();
        assert_eq!(loads, 1);
    }

    #[test]
    fn test_unregistered_module() {
        let lua = Lua::new();
        let found: bool = lua.load("return (pcall(require, 'missing'))").eval().unwrap();
        assert!(!found);
    }
}
