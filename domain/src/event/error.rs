//! Listener failures and the emission report

use super::listener::ListenerId;
use thiserror::Error;

/// Failure signalled by a single listener callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ListenerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ListenerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A listener failure tagged with the registration that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    pub listener: ListenerId,
    pub error: ListenerError,
}

impl std::fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.listener, self.error)
    }
}

/// Outcome of one `emit`/`dispatch` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    event: String,
    invoked: usize,
    failures: Vec<ListenerFailure>,
}

impl Emission {
    pub(crate) fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            invoked: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, listener: ListenerId, result: Result<(), ListenerError>) {
        self.invoked += 1;
        if let Err(error) = result {
            self.failures.push(ListenerFailure { listener, error });
        }
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    /// Number of listeners invoked, failing ones included.
    pub fn invoked(&self) -> usize {
        self.invoked
    }

    pub fn failures(&self) -> &[ListenerFailure] {
        &self.failures
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapse into the invoked count, or an error carrying every failure.
    pub fn into_result(self) -> Result<usize, EmitError> {
        if self.failures.is_empty() {
            Ok(self.invoked)
        } else {
            Err(EmitError {
                event: self.event,
                invoked: self.invoked,
                failures: self.failures,
            })
        }
    }
}

/// One or more listeners failed while an event was emitted.
///
/// Raised only after every listener of the emission has run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{} of {invoked} listener(s) failed while emitting '{event}': {}",
    .failures.len(),
    summarize(.failures)
)]
pub struct EmitError {
    pub event: String,
    pub invoked: usize,
    pub failures: Vec<ListenerFailure>,
}

fn summarize(failures: &[ListenerFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_emission_yields_count() {
        let mut emission = Emission::new("tick");
        emission.record(ListenerId::new(1), Ok(()));
        emission.record(ListenerId::new(2), Ok(()));
        assert!(emission.is_clean());
        assert_eq!(emission.into_result().unwrap(), 2);
    }

    #[test]
    fn test_failed_emission_keeps_invoked_count() {
        let mut emission = Emission::new("tick");
        emission.record(ListenerId::new(1), Err("boom".into()));
        emission.record(ListenerId::new(2), Ok(()));

        let err = emission.into_result().unwrap_err();
        assert_eq!(err.invoked, 2);
        assert_eq!(err.failures.len(), 1);
        assert_eq!(
            err.to_string(),
            "1 of 2 listener(s) failed while emitting 'tick': listener#1: boom"
        );
    }
}
