//! Multi-wallet fund orchestration built on the bundle engine
//!
//! Each operation gathers wallets from the directory, assembles a full
//! bundle, and hands it to the submission engine as one atomic unit.
//! Any per-wallet assembly failure aborts the whole batch before
//! anything is sent.

pub mod funds;
pub mod trading;
pub mod transfer;

pub use trading::{TradeAction, TradeOperation};

use crate::bundle::{BundleSubmissionEngine, TipAccountSelector, TransactionAssembler};
use crate::error::Result;
use crate::relay::RelayApi;
use crate::types::{AnchorMode, BundleConfig, BundlePayload};
use crate::wallet::{SigningIdentity, WalletDirectory};
use solana_sdk::hash::Hash;
use std::sync::Arc;

/// Coordinates distribution, collection, trading, and token transfer
/// flows across wallet folders.
pub struct FundOrchestrator {
    relay: Arc<dyn RelayApi>,
    wallets: Arc<WalletDirectory>,
    bundle_config: BundleConfig,
    anchor_mode: AnchorMode,
}

impl FundOrchestrator {
    pub fn new(relay: Arc<dyn RelayApi>, wallets: Arc<WalletDirectory>) -> Self {
        Self {
            relay,
            wallets,
            bundle_config: BundleConfig::default(),
            anchor_mode: AnchorMode::SharedPerBundle,
        }
    }

    pub fn with_bundle_config(mut self, config: BundleConfig) -> Self {
        self.bundle_config = config;
        self
    }

    pub fn with_anchor_mode(mut self, mode: AnchorMode) -> Self {
        self.anchor_mode = mode;
        self
    }

    pub fn bundle_config(&self) -> &BundleConfig {
        &self.bundle_config
    }

    /// Engine signing as the main wallet, plus the main identity itself.
    async fn engine(&self) -> Result<(BundleSubmissionEngine, SigningIdentity)> {
        let main = self.wallets.main_wallet().await?;
        let engine = BundleSubmissionEngine::new(self.relay.clone(), main.clone());
        Ok((engine, main))
    }

    /// Anchor shared by the whole bundle, or `None` when each
    /// transaction fetches its own.
    async fn bundle_anchor(&self) -> Result<Option<Hash>> {
        match self.anchor_mode {
            AnchorMode::SharedPerBundle => Ok(Some(self.relay.get_latest_blockhash().await?)),
            AnchorMode::PerTransaction => Ok(None),
        }
    }

    /// Anchor for the next transaction under the configured mode.
    async fn next_anchor(&self, shared: Option<Hash>) -> Result<Hash> {
        match shared {
            Some(anchor) => Ok(anchor),
            None => self.relay.get_latest_blockhash().await,
        }
    }

    /// Dedicated incentive transaction funded by the main wallet,
    /// appended as the final transaction of prebuilt bundles.
    async fn tip_payload(
        &self,
        assembler: &TransactionAssembler,
        main: &SigningIdentity,
        shared: Option<Hash>,
    ) -> Result<BundlePayload> {
        let tip_account = TipAccountSelector::new(self.relay.clone()).select().await?;
        let anchor = self.next_anchor(shared).await?;
        let transaction = assembler.native_transfer(
            main,
            &tip_account,
            self.bundle_config.tip_lamports,
            anchor,
        )?;

        Ok(BundlePayload::Prebuilt(TransactionAssembler::encode(
            &transaction,
        )?))
    }
}
