//! Display utilities for the CLI

use colored::*;

use agentmarket_sdk::{Agent, AgentDetail, Earnings, ExecutionResult, MarketStats};

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", "━".repeat(60).bright_black());
    println!(" {}", title.bright_white().bold());
    println!("{}", "━".repeat(60).bright_black());
}

/// Print a success message
pub fn success(message: &str) {
    println!("  {} {}", "✓".bright_green(), message);
}

/// Print a one-line error notice to stderr
pub fn error(message: &str) {
    eprintln!("  {} {}", "✗".bright_red(), message.bright_red());
}

/// Print an info message
pub fn info(message: &str) {
    println!("  {} {}", "→".bright_blue(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("  {} {}", "⚠".yellow(), message.yellow());
}

/// Print a labeled value
pub fn labeled(label: &str, value: &str) {
    println!("  {}: {}", label.bright_white(), value.bright_cyan());
}

/// `★ 4.5 (2)` or `no ratings`
pub fn stars(rating: f64, count: i64) -> String {
    if count == 0 {
        "no ratings".to_string()
    } else {
        format!("★ {:.1} ({})", rating, count)
    }
}

/// One catalog row
pub fn agent_row(agent: &Agent) {
    let status = if agent.active {
        "●".bright_green()
    } else {
        "○".bright_black()
    };
    println!(
        "  {} {:<24} {:<8} {:>10} ETH  {:<16} {}",
        status,
        agent.name.bright_white(),
        agent.agent_type.bright_cyan(),
        agent.price,
        stars(agent.rating, agent.rating_count).yellow(),
        agent.id.bright_black()
    );
}

pub fn agent_detail(detail: &AgentDetail) {
    let agent = &detail.agent;
    section(&agent.name);
    println!("  {}", agent.description);
    println!();
    labeled("ID", &agent.id);
    labeled("Contract ID", &agent.contract_id.to_string());
    labeled("Type", &agent.agent_type);
    labeled("Owner", &agent.owner);
    labeled("Price", &format!("{} ETH", agent.price));
    labeled("Earnings", &format!("{} ETH", agent.earnings));
    labeled("Sales", &agent.total_sales.to_string());
    labeled("Rating", &stars(agent.rating, agent.rating_count));
    labeled("Active", if agent.active { "yes" } else { "no" });

    if detail.transactions.is_empty() {
        return;
    }

    println!();
    println!("  {}", "Recent transactions".bright_white().bold());
    for tx in &detail.transactions {
        let status = match tx.status.as_str() {
            "completed" => tx.status.bright_green(),
            "failed" => tx.status.bright_red(),
            _ => tx.status.yellow(),
        };
        println!(
            "    {}  {:<10} {:>8} ETH  {}",
            tx.timestamp.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            status,
            tx.amount,
            tx.buyer
        );
    }
}

/// Agent output, verbatim
pub fn execution(result: &ExecutionResult) {
    success(&format!("{} agent finished", result.agent_type));
    if let Some(tokens) = result.tokens_used {
        info(&format!("{} tokens used", tokens));
    }
    println!();
    println!("{}", result.result.as_deref().unwrap_or_default());
}

pub fn earnings(report: &Earnings) {
    section(&format!("Earnings for {}", report.address));
    labeled("Total", &format!("{} ETH", report.total_earnings));
    labeled("Agents", &report.agent_count.to_string());
    println!();
    for agent in &report.agents {
        println!(
            "  {:<24} {:>10} ETH  {:>5} sales  ★ {:.1}",
            agent.name.bright_white(),
            agent.earnings,
            agent.total_sales,
            agent.rating
        );
    }
}

pub fn stats(stats: &MarketStats) {
    section("Marketplace");
    labeled("Agents", &stats.total_agents.to_string());
    labeled("Users", &stats.total_users.to_string());
    labeled("Transactions", &stats.total_transactions.to_string());
    labeled("Volume", &format!("{} ETH", stats.total_volume));
}
