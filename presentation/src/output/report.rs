//! Run report — what a luaglue invocation loaded and emitted

use luaglue_application::{LoadScriptsOutput, ScriptError};
use serde::Serialize;

/// A script that failed to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedScript {
    pub path: String,
    pub error: String,
}

/// Result of one `--emit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmissionOutcome {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoked: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmissionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Listener count of one host event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventListeners {
    pub event: String,
    pub listeners: usize,
}

/// Everything the formatters render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub scripting_available: bool,
    pub loaded: Vec<String>,
    pub failed: Vec<FailedScript>,
    pub emissions: Vec<EmissionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventListeners>>,
}

impl RunReport {
    pub fn from_load(output: &LoadScriptsOutput, scripting_available: bool) -> Self {
        Self {
            scripting_available,
            loaded: output
                .loaded
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            failed: output
                .failed
                .iter()
                .map(|(path, error)| FailedScript {
                    path: path.display().to_string(),
                    error: error.message.clone(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn record_emission(&mut self, event: &str, result: Result<usize, ScriptError>) {
        let outcome = match result {
            Ok(invoked) => EmissionOutcome {
                event: event.to_string(),
                invoked: Some(invoked),
                error: None,
            },
            Err(e) => EmissionOutcome {
                event: event.to_string(),
                invoked: None,
                error: Some(e.message),
            },
        };
        self.emissions.push(outcome);
    }

    pub fn with_events(mut self, events: Vec<EventListeners>) -> Self {
        self.events = Some(events);
        self
    }

    /// Whether any plugin or emission failed.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || self.emissions.iter().any(|e| !e.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_load_output() {
        let output = LoadScriptsOutput {
            loaded: vec![PathBuf::from("init.lua")],
            failed: vec![(PathBuf::from("bad.lua"), ScriptError::new("syntax error"))],
        };
        let report = RunReport::from_load(&output, true);
        assert_eq!(report.loaded, vec!["init.lua"]);
        assert_eq!(report.failed[0].error, "syntax error");
        assert!(report.has_failures());
    }

    #[test]
    fn test_record_emission() {
        let mut report = RunReport::default();
        report.record_emission("ready", Ok(2));
        assert!(!report.has_failures());

        report.record_emission("tick", Err(ScriptError::new("boom")));
        assert!(report.has_failures());
        assert_eq!(report.emissions[1].error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_json_shape_skips_empty_optionals() {
        let mut report = RunReport::default();
        report.record_emission("ready", Ok(1));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["emissions"][0]["invoked"], 1);
        assert!(json["emissions"][0].get("error").is_none());
        assert!(json.get("events").is_none());
    }
}
