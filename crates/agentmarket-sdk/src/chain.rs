//! Marketplace payments over Ethereum JSON-RPC
//!
//! Buying an agent run is a `payAgent(uint256)` call to the marketplace
//! contract carrying the listed price as value. [`JsonRpcWallet`] submits it
//! through `eth_sendTransaction` on a node that holds the buyer's unlocked
//! account, then polls `eth_getTransactionReceipt` until the payment is mined.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::error::{SdkError, SdkResult};

static RPC_ID: AtomicU64 = AtomicU64::new(1);

/// Solidity signature of the marketplace payment entry point
pub const PAY_AGENT_SIGNATURE: &str = "payAgent(uint256)";

/// Confirmed payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}

/// Pays for agent runs on behalf of a connected wallet
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Paying account, lower-cased
    fn address(&self) -> &str;

    /// Send `value_wei` to the marketplace for agent `contract_id`; returns the tx hash
    async fn submit_payment(&self, contract_id: u64, value_wei: u128) -> SdkResult<String>;

    /// Block until the payment is mined successfully
    async fn wait_for_receipt(&self, tx_hash: &str) -> SdkResult<PaymentReceipt>;
}

// ============================================================================
// Calldata
// ============================================================================

/// First four bytes of the Keccak-256 hash of a function signature
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// ABI-encoded `payAgent(contract_id)` calldata, `0x`-prefixed
pub fn pay_agent_calldata(contract_id: u64) -> String {
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&function_selector(PAY_AGENT_SIGNATURE));
    data.extend_from_slice(&[0u8; 24]);
    data.extend_from_slice(&contract_id.to_be_bytes());
    format!("0x{}", hex::encode(data))
}

fn to_quantity(value: u128) -> String {
    format!("0x{:x}", value)
}

fn parse_quantity(value: &str) -> Option<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16).ok()
}

// ============================================================================
// JSON-RPC
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: T,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SendTransaction<'a> {
    from: &'a str,
    to: &'a str,
    value: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    gas_used: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Clone, Debug)]
struct RpcClient {
    url: String,
    client: reqwest::Client,
}

impl RpcClient {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Call a method whose result may legitimately be `null`
    async fn call<P, R>(&self, method: &str, params: P) -> SdkResult<Option<R>>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let payload = JsonRpcRequest {
            jsonrpc: "2.0",
            id: RPC_ID.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SdkError::Api {
                status: status.as_u16(),
                message: format!("HTTP {} from JSON-RPC node", status),
            });
        }

        let body: JsonRpcResponse<R> = response.json().await?;
        if let Some(error) = body.error {
            return Err(SdkError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(body.result)
    }

    async fn request<P, R>(&self, method: &str, params: P) -> SdkResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.call(method, params)
            .await?
            .ok_or_else(|| SdkError::MissingResult(method.to_string()))
    }
}

// ============================================================================
// Wallet
// ============================================================================

/// [`PaymentGateway`] backed by a node-managed account
#[derive(Clone, Debug)]
pub struct JsonRpcWallet {
    rpc: RpcClient,
    account: String,
    marketplace: String,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl JsonRpcWallet {
    /// Use a known account on the node
    pub fn new(rpc_url: &str, account: &str, marketplace: &str) -> SdkResult<Self> {
        if marketplace.is_empty() {
            return Err(SdkError::Config("marketplace address is not set".to_string()));
        }
        Ok(Self {
            rpc: RpcClient::new(rpc_url),
            account: account.to_lowercase(),
            marketplace: marketplace.to_string(),
            poll_interval: Duration::from_secs(1),
            confirmation_timeout: Duration::from_secs(120),
        })
    }

    /// Connect with the node's first account (`eth_accounts`)
    pub async fn connect(rpc_url: &str, marketplace: &str) -> SdkResult<Self> {
        let rpc = RpcClient::new(rpc_url);
        let accounts: Vec<String> = rpc.request("eth_accounts", Vec::<String>::new()).await?;
        let account = accounts.into_iter().next().ok_or(SdkError::WalletNotConnected)?;

        tracing::debug!(%account, "Wallet connected");
        Self::new(rpc_url, &account, marketplace)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

#[async_trait]
impl PaymentGateway for JsonRpcWallet {
    fn address(&self) -> &str {
        &self.account
    }

    async fn submit_payment(&self, contract_id: u64, value_wei: u128) -> SdkResult<String> {
        let tx = SendTransaction {
            from: &self.account,
            to: &self.marketplace,
            value: to_quantity(value_wei),
            data: pay_agent_calldata(contract_id),
        };

        let tx_hash: String = self.rpc.request("eth_sendTransaction", [tx]).await?;
        tracing::info!(%tx_hash, contract_id, "Payment submitted");
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> SdkResult<PaymentReceipt> {
        let deadline = tokio::time::Instant::now() + self.confirmation_timeout;

        loop {
            let receipt: Option<RawReceipt> =
                self.rpc.call("eth_getTransactionReceipt", [tx_hash]).await?;

            if let Some(receipt) = receipt {
                return match receipt.status.as_deref() {
                    Some("0x1") => Ok(PaymentReceipt {
                        tx_hash: receipt.transaction_hash,
                        block_number: receipt.block_number.as_deref().and_then(parse_quantity),
                        gas_used: receipt.gas_used.as_deref().and_then(parse_quantity),
                    }),
                    _ => Err(SdkError::PaymentReverted(tx_hash.to_string())),
                };
            }

            if tokio::time::Instant::now() + self.poll_interval > deadline {
                return Err(SdkError::PaymentTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited: self.confirmation_timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
