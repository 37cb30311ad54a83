//! AgentMarket SDK - client for the AI agent marketplace
//!
//! - [`MarketClient`]: typed access to every HTTP endpoint
//! - [`JsonRpcWallet`]: pays the marketplace contract over Ethereum JSON-RPC
//! - [`Session`]: the purchase flow, pay then run, gated on a connected wallet
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use agentmarket_sdk::{JsonRpcWallet, MarketClient, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MarketClient::new("http://localhost:3001")?;
//!     let config = client.config().await?;
//!
//!     let mut session = Session::new(client.clone());
//!     let wallet = JsonRpcWallet::connect(
//!         config.rpc_url.as_deref().unwrap_or("http://localhost:8545"),
//!         config.marketplace_address.as_deref().unwrap_or_default(),
//!     )
//!     .await?;
//!     session.connect_wallet(Arc::new(wallet));
//!
//!     let agent = client.list_agents(Some("code"), None).await?.remove(0);
//!     let purchase = session.purchase_and_run(&agent, "Review this function").await?;
//!     println!("{}", purchase.result.result.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod client;
pub mod error;
pub mod models;
pub mod session;

pub use chain::{JsonRpcWallet, PaymentGateway, PaymentReceipt};
pub use client::{MarketClient, DEFAULT_ENDPOINT};
pub use error::{SdkError, SdkResult};
pub use models::*;
pub use session::{Purchase, Session};
