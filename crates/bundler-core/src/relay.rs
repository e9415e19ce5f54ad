//! JSON-RPC client for the relay block engine and its backing node

use crate::error::{EngineError, Result};
use crate::types::BundleStatus;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Relay client configuration
#[derive(Debug, Clone)]
pub struct RelayClientConfig {
    /// Block engine endpoint serving bundle methods
    pub block_engine_url: String,
    /// Node RPC endpoint serving anchors, balances, and account probes
    pub rpc_url: String,
    /// Commitment level for node queries
    pub commitment: String,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for RelayClientConfig {
    fn default() -> Self {
        Self {
            block_engine_url: "https://mainnet.block-engine.jito.wtf/api/v1".to_string(),
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Per-bundle entry returned by `getInflightBundleStatuses`.
#[derive(Debug, Clone, Deserialize)]
pub struct InflightBundleStatus {
    pub bundle_id: String,
    pub status: BundleStatus,
    pub landed_slot: Option<u64>,
}

/// Per-bundle entry returned by `getBundleStatuses` for settled bundles.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledBundleStatus {
    pub bundle_id: String,
    /// Signatures of the transactions that landed.
    #[serde(default)]
    pub transactions: Vec<String>,
    pub slot: Option<u64>,
    pub confirmation_status: Option<String>,
    pub err: Option<Value>,
}

/// `value` object of a `simulateBundle` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationValue {
    pub summary: SimulationSummary,
    #[serde(rename = "transactionResults", default)]
    pub transaction_results: Vec<Value>,
}

impl SimulationValue {
    /// Failure description, or `None` when the simulation succeeded.
    pub fn failure_reason(&self) -> Option<String> {
        match &self.summary {
            SimulationSummary::Status(s) if s == "succeeded" => None,
            SimulationSummary::Status(s) => Some(format!("unexpected summary: {}", s)),
            SimulationSummary::Failed { failed } => Some(failed.reason()),
        }
    }
}

/// Simulation outcome: the literal string `"succeeded"` or a failure object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SimulationSummary {
    Status(String),
    Failed { failed: SimulationFailure },
}

/// Failure payload inside a simulation summary.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationFailure {
    pub error: Value,
    #[serde(default)]
    pub tx_signature: Option<String>,
}

impl SimulationFailure {
    /// Human-readable failure message. The relay reports transaction
    /// failures as a `TransactionFailure` tuple whose second element is
    /// the message.
    pub fn reason(&self) -> String {
        self.error
            .get("TransactionFailure")
            .and_then(|f| f.get(1))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.error.to_string())
    }
}

/// Relay and node operations the engine depends on.
///
/// Implemented by [`RelayClient`] for production use; tests substitute
/// an in-memory implementation.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Fetch a fresh liveness anchor from the node.
    async fn get_latest_blockhash(&self) -> Result<Hash>;

    /// Fetch the relay's current incentive account pool.
    async fn get_tip_accounts(&self) -> Result<Vec<Pubkey>>;

    /// List the relay regions currently available.
    async fn get_regions(&self) -> Result<Vec<String>>;

    /// Simulate a full bundle without submitting it.
    async fn simulate_bundle(&self, transactions: &[String]) -> Result<SimulationValue>;

    /// Submit a bundle and return its relay-assigned identifier.
    async fn send_bundle(&self, transactions: &[String]) -> Result<String>;

    /// Query recent submission state for the given bundle identifiers.
    async fn get_inflight_bundle_statuses(
        &self,
        bundle_ids: &[String],
    ) -> Result<Vec<InflightBundleStatus>>;

    /// Query settled state for the given bundle identifiers.
    async fn get_bundle_statuses(&self, bundle_ids: &[String]) -> Result<Vec<SettledBundleStatus>>;

    /// Lamport balance of an account.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64>;

    /// Raw balance of an SPL token account, in base units. The node
    /// reports an error when the account does not exist.
    async fn get_token_account_balance(&self, account: &Pubkey) -> Result<u64>;

    /// Whether an account exists on chain.
    async fn account_exists(&self, address: &Pubkey) -> Result<bool>;
}

/// HTTP JSON-RPC implementation of [`RelayApi`].
pub struct RelayClient {
    client: Client,
    config: RelayClientConfig,
}

impl RelayClient {
    pub fn new(config: RelayClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Issue a JSON-RPC call and return the `result` field.
    async fn call(&self, url: &str, method: &str, params: Value) -> Result<Value> {
        debug!(method = method, "Relay RPC call");

        let response = self
            .client
            .post(url)
            .json(&json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1
            }))
            .send()
            .await
            .map_err(|e| EngineError::Rpc {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        let body: Value = response.json().await.map_err(|e| EngineError::Rpc {
            method: method.to_string(),
            reason: e.to_string(),
        })?;

        extract_result(body, method)
    }

    fn commitment_param(&self) -> Value {
        json!({ "commitment": self.config.commitment })
    }
}

fn invalid_response(method: &str, detail: impl std::fmt::Display) -> EngineError {
    EngineError::Rpc {
        method: method.to_string(),
        reason: format!("invalid response: {}", detail),
    }
}

/// Split a JSON-RPC response body into its `result` member.
///
/// A relay-reported failure arrives as an `error` member; a body with
/// no `result` member, including a non-object body, is malformed.
fn extract_result(mut body: Value, method: &str) -> Result<Value> {
    if let Some(error) = body.get("error") {
        return Err(EngineError::Rpc {
            method: method.to_string(),
            reason: error.to_string(),
        });
    }

    match body.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(invalid_response(method, "missing result member")),
    }
}

/// Pull the nested `value` member out of a node-style result, yielding
/// `Null` when the shape does not match.
fn take_value(result: &mut Value) -> Value {
    result.get_mut("value").map(Value::take).unwrap_or(Value::Null)
}

#[async_trait]
impl RelayApi for RelayClient {
    async fn get_latest_blockhash(&self) -> Result<Hash> {
        let result = self
            .call(
                &self.config.rpc_url,
                "getLatestBlockhash",
                json!([self.commitment_param()]),
            )
            .await?;

        let blockhash = result["value"]["blockhash"]
            .as_str()
            .ok_or_else(|| invalid_response("getLatestBlockhash", "missing blockhash"))?;

        Hash::from_str(blockhash).map_err(|e| invalid_response("getLatestBlockhash", e))
    }

    async fn get_tip_accounts(&self) -> Result<Vec<Pubkey>> {
        let result = self
            .call(&self.config.block_engine_url, "getTipAccounts", json!([]))
            .await?;

        let accounts: Vec<String> = serde_json::from_value(result)
            .map_err(|e| invalid_response("getTipAccounts", e))?;

        accounts
            .iter()
            .map(|a| Pubkey::from_str(a).map_err(|e| invalid_response("getTipAccounts", e)))
            .collect()
    }

    async fn get_regions(&self) -> Result<Vec<String>> {
        let result = self
            .call(&self.config.block_engine_url, "getRegions", json!([]))
            .await?;

        serde_json::from_value(result).map_err(|e| invalid_response("getRegions", e))
    }

    async fn simulate_bundle(&self, transactions: &[String]) -> Result<SimulationValue> {
        let mut result = self
            .call(
                &self.config.block_engine_url,
                "simulateBundle",
                json!([[transactions]]),
            )
            .await?;

        serde_json::from_value(take_value(&mut result))
            .map_err(|e| invalid_response("simulateBundle", e))
    }

    async fn send_bundle(&self, transactions: &[String]) -> Result<String> {
        let result = self
            .call(
                &self.config.block_engine_url,
                "sendBundle",
                json!([transactions]),
            )
            .await
            .map_err(|e| EngineError::Submission(e.to_string()))?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| EngineError::Submission("relay returned a non-string bundle id".to_string()))
    }

    async fn get_inflight_bundle_statuses(
        &self,
        bundle_ids: &[String],
    ) -> Result<Vec<InflightBundleStatus>> {
        let mut result = self
            .call(
                &self.config.block_engine_url,
                "getInflightBundleStatuses",
                json!([bundle_ids]),
            )
            .await?;

        serde_json::from_value(take_value(&mut result))
            .map_err(|e| invalid_response("getInflightBundleStatuses", e))
    }

    async fn get_bundle_statuses(&self, bundle_ids: &[String]) -> Result<Vec<SettledBundleStatus>> {
        let mut result = self
            .call(
                &self.config.block_engine_url,
                "getBundleStatuses",
                json!([bundle_ids]),
            )
            .await?;

        serde_json::from_value(take_value(&mut result))
            .map_err(|e| invalid_response("getBundleStatuses", e))
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        let result = self
            .call(
                &self.config.rpc_url,
                "getBalance",
                json!([address.to_string(), self.commitment_param()]),
            )
            .await
            .map_err(|e| EngineError::AccountLookup {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        result["value"].as_u64().ok_or_else(|| EngineError::AccountLookup {
            address: address.to_string(),
            reason: "missing balance in response".to_string(),
        })
    }

    async fn get_token_account_balance(&self, account: &Pubkey) -> Result<u64> {
        let result = self
            .call(
                &self.config.rpc_url,
                "getTokenAccountBalance",
                json!([account.to_string(), self.commitment_param()]),
            )
            .await
            .map_err(|e| EngineError::AccountLookup {
                address: account.to_string(),
                reason: e.to_string(),
            })?;

        // The node reports the raw amount as a decimal string
        result["value"]["amount"]
            .as_str()
            .and_then(|amount| amount.parse().ok())
            .ok_or_else(|| EngineError::AccountLookup {
                address: account.to_string(),
                reason: "missing token amount in response".to_string(),
            })
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        let result = self
            .call(
                &self.config.rpc_url,
                "getAccountInfo",
                json!([address.to_string(), self.commitment_param()]),
            )
            .await
            .map_err(|e| EngineError::AccountLookup {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        Ok(!result["value"].is_null())
    }
}
