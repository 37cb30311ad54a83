//! Subcommand implementations

pub mod agent;
pub mod market;
pub mod run;
