//! Output formatting for run reports

pub mod console;
pub mod formatter;
pub mod report;
