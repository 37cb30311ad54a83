//! Catalog commands - browse, register, rate and toggle agents

use colored::*;

use agentmarket_sdk::{MarketClient, RegisterAgent};
use agentmarket_types::{parse_amount, AgentType};

use crate::display;

/// List active agents
pub async fn list(
    client: &MarketClient,
    agent_type: Option<&str>,
    owner: Option<&str>,
) -> anyhow::Result<()> {
    let agents = client.list_agents(agent_type, owner).await?;

    display::section(&format!("Agents ({})", agents.len()));
    if agents.is_empty() {
        display::warning("No agents found");
        return Ok(());
    }
    for agent in &agents {
        display::agent_row(agent);
    }
    Ok(())
}

pub async fn show(client: &MarketClient, id: &str) -> anyhow::Result<()> {
    let detail = client.get_agent(id).await?;
    display::agent_detail(&detail);
    Ok(())
}

/// Fields of a new listing, as given on the command line
pub struct Registration {
    pub contract_id: i64,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub agent_type: String,
    pub price: String,
    pub metadata: Option<String>,
}

impl Registration {
    /// Validate locally before anything goes over the wire
    pub fn into_request(self) -> anyhow::Result<RegisterAgent> {
        let agent_type: AgentType = self
            .agent_type
            .parse()
            .map_err(|_| anyhow::anyhow!("Agent type must be one of: code, seo, content, data"))?;
        let price = parse_amount(&self.price)?;

        let metadata = match self.metadata {
            Some(raw) => match serde_json::from_str::<serde_json::Value>(&raw)? {
                serde_json::Value::Object(map) => Some(map),
                _ => anyhow::bail!("Metadata must be a JSON object"),
            },
            None => None,
        };

        Ok(RegisterAgent {
            contract_id: self.contract_id,
            owner: self.owner,
            name: self.name,
            description: self.description,
            agent_type,
            price: price.to_string(),
            metadata,
        })
    }
}

pub async fn register(client: &MarketClient, registration: Registration) -> anyhow::Result<()> {
    let request = registration.into_request()?;
    let agent = client.register_agent(&request).await?;

    display::success(&format!(
        "Agent '{}' registered at {} ETH",
        agent.name.bright_cyan(),
        agent.price
    ));
    display::info(&format!("ID: {}", agent.id));
    Ok(())
}

pub async fn rate(client: &MarketClient, id: &str, rating: f64) -> anyhow::Result<()> {
    let result = client.rate_agent(id, rating).await?;
    display::success(&format!(
        "Rating recorded: {}",
        display::stars(result.rating, result.rating_count)
    ));
    Ok(())
}

pub async fn toggle(client: &MarketClient, id: &str) -> anyhow::Result<()> {
    let agent = client.toggle_agent(id).await?;
    if agent.active {
        display::success(&format!("'{}' is listed", agent.name));
    } else {
        display::warning(&format!("'{}' is unlisted", agent.name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            contract_id: 1,
            owner: "0xabc".to_string(),
            name: "Reviewer".to_string(),
            description: "Reviews code".to_string(),
            agent_type: "code".to_string(),
            price: "0.010".to_string(),
            metadata: Some(r#"{"version": 2}"#.to_string()),
        }
    }

    #[test]
    fn test_registration_request() {
        let request = registration().into_request().unwrap();
        assert_eq!(request.agent_type, AgentType::Code);
        assert_eq!(request.price, "0.01");
        assert_eq!(request.metadata.unwrap()["version"], 2);
    }

    #[test]
    fn test_registration_rejects_bad_input() {
        let mut bad_type = registration();
        bad_type.agent_type = "legal".to_string();
        assert!(bad_type.into_request().is_err());

        let mut bad_price = registration();
        bad_price.price = "-1".to_string();
        assert!(bad_price.into_request().is_err());

        let mut bad_metadata = registration();
        bad_metadata.metadata = Some("[1, 2]".to_string());
        assert!(bad_metadata.into_request().is_err());
    }
}
