//! Client session: API access plus an optional connected wallet

use std::sync::Arc;

use agentmarket_types::to_base_units;

use crate::chain::{PaymentGateway, PaymentReceipt};
use crate::client::MarketClient;
use crate::error::{SdkError, SdkResult};
use crate::models::{Agent, ExecutionResult, RunAgent};

/// A paid agent run
#[derive(Debug, Clone)]
pub struct Purchase {
    pub receipt: PaymentReceipt,
    pub result: ExecutionResult,
}

/// Marketplace session.
///
/// Browsing works without a wallet; buying requires one.
#[derive(Clone)]
pub struct Session {
    client: MarketClient,
    wallet: Option<Arc<dyn PaymentGateway>>,
}

impl Session {
    pub fn new(client: MarketClient) -> Self {
        Self {
            client,
            wallet: None,
        }
    }

    pub fn client(&self) -> &MarketClient {
        &self.client
    }

    pub fn connect_wallet(&mut self, wallet: Arc<dyn PaymentGateway>) {
        tracing::info!(address = wallet.address(), "Wallet connected");
        self.wallet = Some(wallet);
    }

    pub fn disconnect_wallet(&mut self) {
        self.wallet = None;
    }

    pub fn is_connected(&self) -> bool {
        self.wallet.is_some()
    }

    /// Connected wallet address
    pub fn address(&self) -> Option<&str> {
        self.wallet.as_deref().map(|w| w.address())
    }

    /// Pay for one run of `agent` and execute `prompt` once the payment is mined.
    ///
    /// A reverted or unconfirmed payment aborts before the agent runs.
    pub async fn purchase_and_run(&self, agent: &Agent, prompt: &str) -> SdkResult<Purchase> {
        let wallet = self.wallet.as_ref().ok_or(SdkError::WalletNotConnected)?;
        if !agent.active {
            return Err(SdkError::AgentInactive);
        }

        let contract_id = u64::try_from(agent.contract_id).map_err(|_| {
            SdkError::Config(format!("agent has invalid contract id {}", agent.contract_id))
        })?;
        let price = agent.price_amount()?;
        let value_wei = to_base_units(price)?;

        let tx_hash = wallet.submit_payment(contract_id, value_wei).await?;
        let receipt = wallet.wait_for_receipt(&tx_hash).await?;

        tracing::info!(
            tx_hash = %receipt.tx_hash,
            agent_id = %agent.id,
            "Payment confirmed, running agent"
        );

        let request = RunAgent::new(agent.agent_type.clone(), prompt).paid_by(
            agent.id.clone(),
            wallet.address(),
            receipt.tx_hash.clone(),
            price.to_string(),
        );
        let result = self.client.run_agent(&request).await?;

        Ok(Purchase { receipt, result })
    }
}
