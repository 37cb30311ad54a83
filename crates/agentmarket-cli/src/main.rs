//! AgentMarket CLI - browse, buy and run AI agents
//!
//! Talks to an AgentMarket API server (default: http://localhost:3001).
//! Paid runs go through a wallet account on an Ethereum JSON-RPC node.
//!
//! # Quick Start
//!
//! ```bash
//! agentmarket agents --type code
//! agentmarket run code "Review this function for bugs: fn add(a: i32) -> i32 { a }"
//! agentmarket buy <agent-id> "Audit https://example.com" --rpc-url http://localhost:8545
//! agentmarket earnings 0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266
//! ```

use std::time::Duration;

use clap::{Parser, Subcommand};

mod commands;
mod display;

use agentmarket_sdk::{MarketClient, DEFAULT_ENDPOINT};
use commands::{agent, market, run};

/// AgentMarket CLI - pay-per-use AI agents
#[derive(Parser)]
#[command(name = "agentmarket")]
#[command(author = "AgentMarket Contributors")]
#[command(version)]
#[command(about = "Browse, buy and run AI agents on AgentMarket", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// API server URL
    #[arg(long, global = true, env = "AGENTMARKET_API_URL", default_value = DEFAULT_ENDPOINT)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List active agents, best rated first
    Agents {
        /// Filter by type (code, seo, content, data)
        #[arg(short = 't', long = "type")]
        agent_type: Option<String>,

        /// Filter by owner address
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Show an agent and its recent transactions
    Agent {
        id: String,
    },

    /// List an agent in the catalog
    Register {
        /// Agent id assigned by the marketplace contract
        #[arg(long)]
        contract_id: i64,

        /// Owner wallet address
        #[arg(long)]
        owner: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: String,

        /// code, seo, content or data
        #[arg(short = 't', long = "type")]
        agent_type: String,

        /// Price per run in ETH
        #[arg(short, long)]
        price: String,

        /// Extra metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Run an agent type without paying
    Run {
        /// code, seo, content or data
        agent_type: String,

        prompt: String,
    },

    /// Pay for an agent on-chain, then run it
    Buy {
        agent_id: String,

        prompt: String,

        /// JSON-RPC node holding the buyer account
        #[arg(long, env = "RPC_URL")]
        rpc_url: Option<String>,

        /// Buyer account (defaults to the node's first account)
        #[arg(long, env = "WALLET_ADDRESS")]
        account: Option<String>,

        /// Marketplace contract (defaults to the server's /api/config)
        #[arg(long, env = "MARKETPLACE_ADDRESS")]
        marketplace: Option<String>,

        /// Seconds to wait for the payment to be mined
        #[arg(long, default_value = "120")]
        timeout: u64,
    },

    /// Rate an agent from 1 to 5
    Rate {
        id: String,

        rating: f64,
    },

    /// List or unlist an agent
    Toggle {
        id: String,
    },

    /// Show earnings for an owner address
    Earnings {
        address: String,
    },

    /// Show marketplace totals
    Stats,

    /// Check API, database and AI service health
    Health,

    /// Show contract addresses served by the API
    Config,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = execute(cli).await {
        display::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let client = MarketClient::new(&cli.server)?;

    match cli.command {
        Commands::Agents { agent_type, owner } => {
            agent::list(&client, agent_type.as_deref(), owner.as_deref()).await?;
        }
        Commands::Agent { id } => {
            agent::show(&client, &id).await?;
        }
        Commands::Register {
            contract_id,
            owner,
            name,
            description,
            agent_type,
            price,
            metadata,
        } => {
            let registration = agent::Registration {
                contract_id,
                owner,
                name,
                description,
                agent_type,
                price,
                metadata,
            };
            agent::register(&client, registration).await?;
        }
        Commands::Run { agent_type, prompt } => {
            run::run(&client, &agent_type, &prompt).await?;
        }
        Commands::Buy {
            agent_id,
            prompt,
            rpc_url,
            account,
            marketplace,
            timeout,
        } => {
            let options = run::WalletOptions {
                rpc_url,
                account,
                marketplace,
                timeout: Duration::from_secs(timeout),
            };
            run::buy(&client, &agent_id, &prompt, options).await?;
        }
        Commands::Rate { id, rating } => {
            agent::rate(&client, &id, rating).await?;
        }
        Commands::Toggle { id } => {
            agent::toggle(&client, &id).await?;
        }
        Commands::Earnings { address } => {
            market::earnings(&client, &address).await?;
        }
        Commands::Stats => {
            market::stats(&client).await?;
        }
        Commands::Health => {
            market::health(&client).await?;
        }
        Commands::Config => {
            market::config(&client).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_buy() {
        let cli = Cli::parse_from([
            "agentmarket",
            "buy",
            "agent-1",
            "Review my code please",
            "--account",
            "0xabc",
            "--timeout",
            "30",
        ]);
        match cli.command {
            Commands::Buy { agent_id, account, timeout, .. } => {
                assert_eq!(agent_id, "agent-1");
                assert_eq!(account.as_deref(), Some("0xabc"));
                assert_eq!(timeout, 30);
            }
            _ => panic!("expected buy"),
        }
    }

    #[test]
    fn test_parse_agents_filter() {
        let cli = Cli::parse_from(["agentmarket", "agents", "--type", "seo"]);
        match cli.command {
            Commands::Agents { agent_type, owner } => {
                assert_eq!(agent_type.as_deref(), Some("seo"));
                assert!(owner.is_none());
            }
            _ => panic!("expected agents"),
        }
    }
}
