//! AgentMarket Types - Canonical domain types for the agent marketplace
//!
//! This crate contains the foundational types shared by the catalog store,
//! the prompt execution service, the HTTP API and the client SDK:
//!
//! - Agent types (the fixed `code | seo | content | data` enumeration)
//! - Transaction status
//! - Running-average rating aggregate
//! - Decimal amount parsing and wallet address normalisation
//!
//! Nothing here performs I/O.

pub mod agent;
pub mod amount;
pub mod error;
pub mod rating;
pub mod transaction;

pub use agent::*;
pub use amount::*;
pub use error::*;
pub use rating::*;
pub use transaction::*;
