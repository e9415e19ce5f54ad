//! Shared test fixtures: an in-memory relay and transaction inspectors

use crate::error::{EngineError, Result};
use crate::relay::{
    InflightBundleStatus, RelayApi, SettledBundleStatus, SimulationFailure, SimulationSummary,
    SimulationValue,
};
use crate::types::{BundleConfig, BundleStatus};
use crate::wallet::{FolderInfo, SigningIdentity, WalletDirectory};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted in-memory [`RelayApi`] implementation.
///
/// Records every call and captures sent bundles so tests can assert on
/// ordering and wire content. Status queries walk a scripted sequence,
/// repeating the final entry once exhausted.
pub(crate) struct MockRelay {
    tip_accounts: Vec<Pubkey>,
    regions: Vec<String>,
    blockhash: Hash,
    bundle_id: String,
    status_sequence: Vec<BundleStatus>,
    status_cursor: Mutex<usize>,
    landed_slot: Option<u64>,
    simulation_failure: Option<String>,
    send_error: Option<String>,
    balances: HashMap<Pubkey, u64>,
    token_balances: HashMap<Pubkey, u64>,
    missing_accounts: HashSet<Pubkey>,
    calls: Mutex<Vec<String>>,
    sent_bundles: Mutex<Vec<Vec<String>>>,
}

impl MockRelay {
    pub(crate) fn new() -> Self {
        Self {
            tip_accounts: vec![Pubkey::new_unique()],
            regions: vec!["ny".to_string(), "ams".to_string()],
            blockhash: Hash::new_unique(),
            bundle_id: "mock-bundle-1".to_string(),
            status_sequence: vec![BundleStatus::Landed],
            status_cursor: Mutex::new(0),
            landed_slot: None,
            simulation_failure: None,
            send_error: None,
            balances: HashMap::new(),
            token_balances: HashMap::new(),
            missing_accounts: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            sent_bundles: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_tip_accounts(mut self, accounts: Vec<Pubkey>) -> Self {
        self.tip_accounts = accounts;
        self
    }

    pub(crate) fn with_status_sequence(mut self, sequence: Vec<BundleStatus>) -> Self {
        self.status_sequence = sequence;
        self
    }

    pub(crate) fn with_landed_slot(mut self, slot: u64) -> Self {
        self.landed_slot = Some(slot);
        self
    }

    pub(crate) fn with_simulation_failure(mut self, reason: &str) -> Self {
        self.simulation_failure = Some(reason.to_string());
        self
    }

    pub(crate) fn with_send_error(mut self, reason: &str) -> Self {
        self.send_error = Some(reason.to_string());
        self
    }

    pub(crate) fn with_balance(mut self, address: Pubkey, lamports: u64) -> Self {
        self.balances.insert(address, lamports);
        self
    }

    pub(crate) fn with_token_balance(mut self, account: Pubkey, amount: u64) -> Self {
        self.token_balances.insert(account, amount);
        self
    }

    pub(crate) fn with_missing_account(mut self, address: Pubkey) -> Self {
        self.missing_accounts.insert(address);
        self
    }

    pub(crate) fn bundle_id(&self) -> String {
        self.bundle_id.clone()
    }

    pub(crate) fn blockhash(&self) -> Hash {
        self.blockhash
    }

    pub(crate) fn tip_pool(&self) -> Vec<Pubkey> {
        self.tip_accounts.clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == method).count()
    }

    pub(crate) fn sent_bundles(&self) -> Vec<Vec<String>> {
        self.sent_bundles.lock().unwrap().clone()
    }

    fn record(&self, method: &str) {
        self.calls.lock().unwrap().push(method.to_string());
    }

    fn next_status(&self) -> Option<BundleStatus> {
        if self.status_sequence.is_empty() {
            return None;
        }

        let mut cursor = self.status_cursor.lock().unwrap();
        let index = (*cursor).min(self.status_sequence.len() - 1);
        *cursor += 1;
        Some(self.status_sequence[index])
    }
}

#[async_trait]
impl RelayApi for MockRelay {
    async fn get_latest_blockhash(&self) -> Result<Hash> {
        self.record("getLatestBlockhash");
        Ok(self.blockhash)
    }

    async fn get_tip_accounts(&self) -> Result<Vec<Pubkey>> {
        self.record("getTipAccounts");
        Ok(self.tip_accounts.clone())
    }

    async fn get_regions(&self) -> Result<Vec<String>> {
        self.record("getRegions");
        Ok(self.regions.clone())
    }

    async fn simulate_bundle(&self, _transactions: &[String]) -> Result<SimulationValue> {
        self.record("simulateBundle");

        let summary = match &self.simulation_failure {
            Some(reason) => SimulationSummary::Failed {
                failed: SimulationFailure {
                    error: json!({ "TransactionFailure": [[0], reason] }),
                    tx_signature: None,
                },
            },
            None => SimulationSummary::Status("succeeded".to_string()),
        };

        Ok(SimulationValue {
            summary,
            transaction_results: Vec::new(),
        })
    }

    async fn send_bundle(&self, transactions: &[String]) -> Result<String> {
        self.record("sendBundle");
        self.sent_bundles.lock().unwrap().push(transactions.to_vec());

        match &self.send_error {
            Some(reason) => Err(EngineError::Submission(reason.clone())),
            None => Ok(self.bundle_id.clone()),
        }
    }

    async fn get_inflight_bundle_statuses(
        &self,
        bundle_ids: &[String],
    ) -> Result<Vec<InflightBundleStatus>> {
        self.record("getInflightBundleStatuses");

        let status = match self.next_status() {
            Some(status) => status,
            None => return Ok(Vec::new()),
        };

        Ok(bundle_ids
            .iter()
            .map(|id| InflightBundleStatus {
                bundle_id: id.clone(),
                status,
                landed_slot: if status == BundleStatus::Landed {
                    self.landed_slot
                } else {
                    None
                },
            })
            .collect())
    }

    async fn get_bundle_statuses(&self, bundle_ids: &[String]) -> Result<Vec<SettledBundleStatus>> {
        self.record("getBundleStatuses");

        Ok(bundle_ids
            .iter()
            .map(|id| SettledBundleStatus {
                bundle_id: id.clone(),
                transactions: Vec::new(),
                slot: self.landed_slot,
                confirmation_status: Some("confirmed".to_string()),
                err: None,
            })
            .collect())
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.record("getBalance");
        Ok(self.balances.get(address).copied().unwrap_or(0))
    }

    async fn get_token_account_balance(&self, account: &Pubkey) -> Result<u64> {
        self.record("getTokenAccountBalance");

        // Mirrors the node: querying a non-existent token account fails
        self.token_balances
            .get(account)
            .copied()
            .ok_or_else(|| EngineError::AccountLookup {
                address: account.to_string(),
                reason: "could not find account".to_string(),
            })
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        self.record("getAccountInfo");
        Ok(!self.missing_accounts.contains(address))
    }
}

/// Install a log subscriber once so `RUST_LOG=debug` surfaces engine
/// output during test runs.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Bundle config with millisecond timing for tests.
pub(crate) fn fast_bundle_config() -> BundleConfig {
    BundleConfig {
        wait_before_poll: Duration::from_millis(1),
        poll_interval: Duration::from_millis(2),
        poll_timeout: Duration::from_millis(250),
        ..Default::default()
    }
}

/// Decode a base64 wire transaction back into a [`Transaction`].
pub(crate) fn decode_transaction(encoded: &str) -> Transaction {
    let bytes = STANDARD.decode(encoded).expect("valid base64");
    bincode::deserialize(&bytes).expect("valid wire transaction")
}

/// Program id invoked by the instruction at `index`.
pub(crate) fn program_id_at(tx: &Transaction, index: usize) -> Pubkey {
    let instruction = &tx.message.instructions[index];
    tx.message.account_keys[instruction.program_id_index as usize]
}

/// Directory with a main wallet and one folder of generated wallets.
/// The returned folder snapshot includes the generated wallets.
pub(crate) async fn seeded_directory(
    wallet_count: usize,
) -> (std::sync::Arc<WalletDirectory>, SigningIdentity, FolderInfo) {
    let directory = std::sync::Arc::new(WalletDirectory::new());

    let main = SigningIdentity::generate();
    directory.set_main_wallet(main.clone()).await;

    let folder = directory.create_folder("test-folder").await;
    directory
        .generate_wallets(&folder.id, wallet_count)
        .await
        .unwrap();
    let folder = directory.folder(&folder.id).await.unwrap();

    (directory, main, folder)
}
