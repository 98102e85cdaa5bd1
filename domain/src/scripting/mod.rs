//! Scripting domain types
//!
//! Host-neutral values passed into script event listeners, and the names of
//! lifecycle events the host itself emits. The actual Lua runtime lives in
//! the infrastructure layer behind `ScriptingEnginePort`.

use serde_json::Value as JsonValue;

/// Lifecycle events emitted by the host on its global emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A script or plugin finished loading. Args: `(path)`.
    ScriptLoaded,
    /// All scripts and plugins have been processed. Args: `(loaded, failed)`.
    ScriptsReady,
}

impl LifecycleEvent {
    /// Event name scripts subscribe to (`events:on("script_loaded", fn)`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScriptLoaded => "script_loaded",
            Self::ScriptsReady => "scripts_ready",
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A simple value type that can be passed to scripts.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

impl ScriptValue {
    /// Interpret a command-line argument.
    ///
    /// Anything that parses as JSON is converted from JSON; everything else
    /// is taken as a plain string, so `--arg hello` needs no quoting.
    pub fn parse_arg(raw: &str) -> Self {
        match serde_json::from_str::<JsonValue>(raw) {
            Ok(json) => Self::from(json),
            Err(_) => Self::String(raw.to_string()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }
}

impl From<JsonValue> for ScriptValue {
    /// Arrays and objects have no flat equivalent and are passed as their
    /// JSON text.
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Nil,
            JsonValue::Bool(b) => Self::Boolean(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Self::String(s),
            other @ (JsonValue::Array(_) | JsonValue::Object(_)) => Self::String(other.to_string()),
        }
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for ScriptValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl std::fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg_json_scalars() {
        assert_eq!(ScriptValue::parse_arg("42"), ScriptValue::Integer(42));
        assert_eq!(ScriptValue::parse_arg("1.5"), ScriptValue::Number(1.5));
        assert_eq!(ScriptValue::parse_arg("true"), ScriptValue::Boolean(true));
        assert_eq!(ScriptValue::parse_arg("null"), ScriptValue::Nil);
        assert_eq!(
            ScriptValue::parse_arg("\"quoted\""),
            ScriptValue::String("quoted".into())
        );
    }

    #[test]
    fn test_parse_arg_falls_back_to_string() {
        assert_eq!(ScriptValue::parse_arg("hello"), ScriptValue::String("hello".into()));
        assert_eq!(ScriptValue::parse_arg(""), ScriptValue::String(String::new()));
    }

    #[test]
    fn test_parse_arg_compound_json_is_text() {
        assert_eq!(
            ScriptValue::parse_arg("[1, 2]"),
            ScriptValue::String("[1,2]".into())
        );
    }

    #[test]
    fn test_display_and_type_name() {
        assert_eq!(ScriptValue::Nil.to_string(), "nil");
        assert_eq!(ScriptValue::from(7).to_string(), "7");
        assert_eq!(ScriptValue::from("x").type_name(), "string");
        assert_eq!(ScriptValue::from(false).type_name(), "boolean");
    }

    #[test]
    fn test_lifecycle_event_names() {
        assert_eq!(LifecycleEvent::ScriptLoaded.as_str(), "script_loaded");
        assert_eq!(LifecycleEvent::ScriptsReady.to_string(), "scripts_ready");
    }
}
