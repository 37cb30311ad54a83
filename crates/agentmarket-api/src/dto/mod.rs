//! Data Transfer Objects
//!
//! Request and response types for the API. Wire names are camelCase.

pub mod agent;
pub mod common;
pub mod market;
pub mod transaction;

pub use agent::*;
pub use common::*;
pub use market::*;
pub use transaction::*;
