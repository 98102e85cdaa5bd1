//! Use cases (application services)

pub mod load_scripts;
