//! Lua sandbox — strips denylisted globals from a fresh VM.
//!
//! User scripts are trusted to use the standard libraries (`string`,
//! `table`, `math` and friends stay available), but the policy's denylist
//! is removed and C extension loading can be blocked to prevent ABI
//! incompatibility crashes.

use luaglue_domain::{GlobalPath, SandboxPolicy};
use mlua::prelude::*;
use tracing::debug;

/// Apply sandbox restrictions to the Lua VM.
///
/// For every denylisted path the containing tables are walked from the
/// global table; a path whose parent is missing (or not a table) is skipped.
/// When the policy blocks C modules, `package.loadlib` is removed and
/// `package.cpath` cleared.
///
/// Returns the paths that were actually bound and have been removed.
pub fn apply_sandbox(lua: &Lua, policy: &SandboxPolicy) -> LuaResult<Vec<String>> {
    let globals = lua.globals();
    let mut removed = Vec::new();

    for path in policy.denied() {
        if remove_path(&globals, path)? {
            debug!("Sandbox removed global '{}'", path);
            removed.push(path.to_string());
        }
    }

    if policy.blocks_c_modules()
        && let LuaValue::Table(package) = globals.raw_get::<LuaValue>("package")?
    {
        package.raw_set("loadlib", LuaValue::Nil)?;
        package.raw_set("cpath", "")?;
        debug!("Sandbox blocked C module loading");
    }

    Ok(removed)
}

fn remove_path(globals: &LuaTable, path: &GlobalPath) -> LuaResult<bool> {
    let mut table = globals.clone();
    for segment in path.parents() {
        match table.raw_get::<LuaValue>(segment.as_str())? {
            LuaValue::Table(inner) => table = inner,
            _ => return Ok(false),
        }
    }

    if table.raw_get::<LuaValue>(path.leaf())?.is_nil() {
        return Ok(false);
    }
    table.raw_set(path.leaf(), LuaValue::Nil)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_removes_default_denylist() {
        let lua = Lua::new();
        let removed = apply_sandbox(&lua, &SandboxPolicy::default()).unwrap();

        assert!(removed.contains(&"dofile".to_string()));
        assert!(removed.contains(&"os.execute".to_string()));

        let dofile: LuaValue = lua.globals().get("dofile").unwrap();
        assert_eq!(dofile, LuaValue::Nil);
        let kind: String = lua.load("type(os.execute)").eval().unwrap();
        assert_eq!(kind, "nil");
    }

    #[test]
    fn test_sandbox_blocks_loadlib() {
        let lua = Lua::new();
        apply_sandbox(&lua, &SandboxPolicy::default()).unwrap();

        let result: LuaValue = lua
            .globals()
            .get::<LuaTable>("package")
            .unwrap()
            .get("loadlib")
            .unwrap();
        assert_eq!(result, LuaValue::Nil);
    }

    #[test]
    fn test_sandbox_clears_cpath() {
        let lua = Lua::new();
        apply_sandbox(&lua, &SandboxPolicy::default()).unwrap();

        let cpath: String = lua
            .globals()
            .get::<LuaTable>("package")
            .unwrap()
            .get("cpath")
            .unwrap();
        assert_eq!(cpath, "");
    }

    #[test]
    fn test_sandbox_preserves_standard_libs() {
        let lua = Lua::new();
        apply_sandbox(&lua, &SandboxPolicy::default()).unwrap();

        // string.upper should still work
        let result: String = lua.load("string.upper('hello')").eval().unwrap();
        assert_eq!(result, "HELLO");

        // table.concat should still work
        let result: String = lua
            .load("table.concat({'a', 'b', 'c'}, ', ')")
            .eval()
            .unwrap();
        assert_eq!(result, "a, b, c");

        // os is only trimmed, not removed
        let clock: String = lua.load("type(os.clock)").eval().unwrap();
        assert_eq!(clock, "function");
    }

    #[test]
    fn test_sandbox_require_lua_modules_still_works() {
        let lua = Lua::new();
        apply_sandbox(&lua, &SandboxPolicy::default()).unwrap();

        // Fails to find the module, but doesn't crash trying C loaders
        let result = lua
            .load("pcall(require, 'nonexistent')")
            .eval::<(bool, String)>();
        assert!(result.is_ok());
        let (ok, _msg) = result.unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_sandbox_skips_missing_paths() {
        let lua = Lua::new();
        let policy = SandboxPolicy::from_denylist(["loadstring", "nothere.deep.value"]).unwrap();

        // Lua 5.4 has no `loadstring`, and `nothere` is not a table
        let removed = apply_sandbox(&lua, &policy).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_permissive_policy_keeps_everything() {
        let lua = Lua::new();
        let removed = apply_sandbox(&lua, &SandboxPolicy::permissive()).unwrap();
        assert!(removed.is_empty());

        let kind: String = lua.load("type(package.loadlib)").eval().unwrap();
        assert_eq!(kind, "function");
    }

    #[test]
    fn test_custom_denylist() {
        let lua = Lua::new();
        let policy = SandboxPolicy::from_denylist(["print", "string.rep"]).unwrap();
        let removed = apply_sandbox(&lua, &policy).unwrap();
        assert_eq!(removed, vec!["print", "string.rep"]);

        let kinds: (String, String) = lua
            .load("return type(print), type(string.rep)")
            .eval()
            .unwrap();
        assert_eq!(kinds, ("nil".to_string(), "nil".to_string()));
    }
}
