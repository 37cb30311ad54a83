//! Repository implementations

mod agent;
mod stats;
mod transaction;

pub use agent::{AgentRepo, LIST_LIMIT};
pub use stats::StatsRepo;
pub use transaction::{TransactionRepo, RECENT_TRANSACTIONS};
