//! Marketplace-wide commands

use colored::*;

use agentmarket_sdk::MarketClient;

use crate::display;

pub async fn earnings(client: &MarketClient, address: &str) -> anyhow::Result<()> {
    let report = client.earnings(address).await?;
    display::earnings(&report);
    Ok(())
}

pub async fn stats(client: &MarketClient) -> anyhow::Result<()> {
    let stats = client.stats().await?;
    display::stats(&stats);
    Ok(())
}

pub async fn health(client: &MarketClient) -> anyhow::Result<()> {
    let health = client.health().await?;

    display::section(&format!("AgentMarket API v{}", health.version));
    let status = if health.is_healthy() {
        health.status.bright_green()
    } else {
        health.status.bright_red()
    };
    println!("  Status:   {}", status);
    println!("  Database: {}", health.services.database);
    println!("  AI:       {}", health.services.ai);
    println!("  Uptime:   {}s", health.uptime_secs);

    if !health.is_healthy() {
        anyhow::bail!("Service is unhealthy");
    }
    Ok(())
}

pub async fn config(client: &MarketClient) -> anyhow::Result<()> {
    let config = client.config().await?;
    let unset = || "not set".to_string();

    display::section("Contracts");
    display::labeled("Chain ID", &config.chain_id.to_string());
    display::labeled(
        "Marketplace",
        &config.marketplace_address.unwrap_or_else(unset),
    );
    display::labeled("Token", &config.token_address.unwrap_or_else(unset));
    display::labeled("RPC", &config.rpc_url.unwrap_or_else(unset));
    Ok(())
}
