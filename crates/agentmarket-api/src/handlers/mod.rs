//! API Handlers

pub mod agent;
pub mod health;
pub mod market;
pub mod transaction;
