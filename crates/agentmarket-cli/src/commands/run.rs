//! Execution commands - free runs and paid purchases

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::*;

use agentmarket_sdk::{ExecutionResult, JsonRpcWallet, MarketClient, RunAgent, Session};

use crate::display;

const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Run an agent type directly, without payment
pub async fn run(client: &MarketClient, agent_type: &str, prompt: &str) -> anyhow::Result<()> {
    println!("{}", "Running agent...".bright_white());
    let result = client.run_agent(&RunAgent::new(agent_type, prompt)).await?;

    finish(&result)
}

/// Wallet options for `buy`
pub struct WalletOptions {
    pub rpc_url: Option<String>,
    pub account: Option<String>,
    pub marketplace: Option<String>,
    pub timeout: Duration,
}

/// Pay for an agent on-chain, then run it
pub async fn buy(
    client: &MarketClient,
    agent_id: &str,
    prompt: &str,
    options: WalletOptions,
) -> anyhow::Result<()> {
    let detail = client.get_agent(agent_id).await?;
    let market = client.config().await?;

    let rpc_url = options
        .rpc_url
        .or(market.rpc_url)
        .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
    let marketplace = options
        .marketplace
        .or(market.marketplace_address)
        .ok_or_else(|| anyhow::anyhow!("Marketplace address is not configured"))?;

    let wallet = open_wallet(&rpc_url, options.account.as_deref(), &marketplace)
        .await?
        .with_confirmation_timeout(options.timeout);

    let mut session = Session::new(client.clone());
    session.connect_wallet(Arc::new(wallet));

    display::info(&format!(
        "Paying {} ETH for '{}'...",
        detail.agent.price, detail.agent.name
    ));
    let purchase = session.purchase_and_run(&detail.agent, prompt).await?;

    display::success(&format!("Payment confirmed: {}", purchase.receipt.tx_hash));
    finish(&purchase.result)
}

/// Use the given account, or the node's first one
async fn open_wallet(
    rpc_url: &str,
    account: Option<&str>,
    marketplace: &str,
) -> anyhow::Result<JsonRpcWallet> {
    let wallet = match account {
        Some(account) => JsonRpcWallet::new(rpc_url, account, marketplace)?,
        None => JsonRpcWallet::connect(rpc_url, marketplace)
            .await
            .with_context(|| format!("Failed to connect wallet at {}", rpc_url))?,
    };
    Ok(wallet)
}

fn finish(result: &ExecutionResult) -> anyhow::Result<()> {
    if !result.success {
        anyhow::bail!(
            "Failed to execute agent: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    display::execution(result);
    Ok(())
}
