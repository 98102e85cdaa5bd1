//! Presentation layer for luaglue
//!
//! This crate contains the CLI definition, the run report and its
//! output formatters.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use output::report::{EmissionOutcome, EventListeners, FailedScript, RunReport};
