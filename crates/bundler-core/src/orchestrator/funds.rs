//! SOL distribution and collection bundles

use super::FundOrchestrator;
use crate::bundle::TransactionAssembler;
use crate::error::{EngineError, Result};
use crate::types::{BundlePayload, COLLECT_RESERVE_LAMPORTS};
use futures::future;
use solana_sdk::native_token::{lamports_to_sol, sol_to_lamports};
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;
use tracing::{debug, info};

/// Even split of a balance across wallets, after holding back a fee
/// reserve. Never negative.
pub fn calculate_distribution_amount(
    total_sol: f64,
    wallet_count: usize,
    reserve_sol: f64,
) -> f64 {
    if wallet_count == 0 {
        return 0.0;
    }

    ((total_sol - reserve_sol) / wallet_count as f64).max(0.0)
}

impl FundOrchestrator {
    /// Send `amount_sol` from the main wallet to every wallet in the
    /// given folders, as one atomic bundle.
    pub async fn distribute_sol(&self, folder_ids: &[String], amount_sol: f64) -> Result<String> {
        if amount_sol <= 0.0 {
            return Err(EngineError::InvalidParams(
                "amount must be greater than 0".to_string(),
            ));
        }

        let wallets = self.wallets.wallets_in_folders(folder_ids).await?;
        let (engine, main) = self.engine().await?;
        let lamports = sol_to_lamports(amount_sol);

        info!(
            wallets = wallets.len(),
            amount_sol, "Distributing SOL to folder wallets"
        );

        let assembler = TransactionAssembler::new(self.relay.clone());
        let shared = self.bundle_anchor().await?;

        let transfers = future::try_join_all(wallets.iter().map(|wallet| {
            let assembler = &assembler;
            let main = &main;
            let destination = wallet.address();
            async move {
                let anchor = self.next_anchor(shared).await?;
                let transaction =
                    assembler.native_transfer(main, &destination, lamports, anchor)?;
                TransactionAssembler::encode(&transaction)
            }
        }))
        .await?;

        let mut payloads: Vec<BundlePayload> =
            transfers.into_iter().map(BundlePayload::Prebuilt).collect();
        payloads.push(self.tip_payload(&assembler, &main, shared).await?);

        engine.submit(&payloads, &self.bundle_config).await
    }

    /// Sweep every wallet in the given folders back into the main
    /// wallet, leaving the rent reserve behind. Wallets whose balance
    /// does not exceed the reserve are skipped; if every wallet is
    /// skipped, nothing is submitted.
    pub async fn collect_sol(&self, folder_ids: &[String]) -> Result<String> {
        let wallets = self.wallets.wallets_in_folders(folder_ids).await?;
        let (engine, main) = self.engine().await?;

        info!(wallets = wallets.len(), "Collecting SOL from folder wallets");

        let assembler = TransactionAssembler::new(self.relay.clone());
        let shared = self.bundle_anchor().await?;

        let assembled = future::try_join_all(wallets.iter().map(|wallet| {
            let assembler = &assembler;
            let main_address = main.address();
            async move {
                let address = wallet.address();
                let balance = self.relay.get_balance(&address).await?;
                if balance <= COLLECT_RESERVE_LAMPORTS {
                    debug!(wallet = %address, balance, "Skipping wallet below the collect reserve");
                    return Ok::<Option<String>, EngineError>(None);
                }

                let amount = balance - COLLECT_RESERVE_LAMPORTS;
                let anchor = self.next_anchor(shared).await?;
                let transaction =
                    assembler.native_transfer(&wallet.identity, &main_address, amount, anchor)?;
                Ok(Some(TransactionAssembler::encode(&transaction)?))
            }
        }))
        .await?;

        let mut payloads: Vec<BundlePayload> = assembled
            .into_iter()
            .flatten()
            .map(BundlePayload::Prebuilt)
            .collect();

        if payloads.is_empty() {
            return Err(EngineError::NothingToCollect);
        }

        payloads.push(self.tip_payload(&assembler, &main, shared).await?);

        engine.submit(&payloads, &self.bundle_config).await
    }

    /// SOL balance of a single address.
    pub async fn sol_balance(&self, address: &Pubkey) -> Result<f64> {
        let lamports = self.relay.get_balance(address).await?;
        Ok(lamports_to_sol(lamports))
    }

    /// Raw token balance of `owner`'s associated token account for
    /// `mint`, in base units. An owner that never created the account
    /// reads as zero.
    pub async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> u64 {
        let token_account = get_associated_token_address(owner, mint);
        match self.relay.get_token_account_balance(&token_account).await {
            Ok(amount) => amount,
            Err(e) => {
                debug!(owner = %owner, mint = %mint, error = %e, "Token balance read as zero");
                0
            }
        }
    }

    /// Combined SOL balance of every wallet in the given folders.
    pub async fn folders_sol_balance(&self, folder_ids: &[String]) -> Result<f64> {
        let wallets = self.wallets.wallets_in_folders(folder_ids).await?;

        let balances = future::try_join_all(wallets.iter().map(|wallet| {
            let address = wallet.address();
            async move { self.relay.get_balance(&address).await }
        }))
        .await?;

        Ok(lamports_to_sol(balances.into_iter().sum()))
    }
}
