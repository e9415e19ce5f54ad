//! SPL token transfer bundles across wallet folders

use super::FundOrchestrator;
use crate::bundle::{BundleSubmissionEngine, TransactionAssembler};
use crate::error::{EngineError, Result};
use crate::types::BundlePayload;
use crate::wallet::{SigningIdentity, WalletInfo};
use futures::future;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

impl FundOrchestrator {
    /// Move `amount` base units of `mint` from every wallet in the given
    /// folders to the main wallet, as one atomic bundle.
    pub async fn transfer_tokens_to_main(
        &self,
        folder_ids: &[String],
        mint: &Pubkey,
        amount: u64,
    ) -> Result<String> {
        let sources = self.wallets.wallets_in_folders(folder_ids).await?;
        let (engine, main) = self.engine().await?;
        let destinations = vec![main.address()];

        self.submit_token_transfers(engine, &main, &sources, &destinations, mint, amount)
            .await
    }

    /// Move tokens from every wallet in the source folders to every
    /// wallet in the destination folders: a full cross-product, one
    /// transfer transaction per pair.
    pub async fn transfer_tokens_between_folders(
        &self,
        from_folder_ids: &[String],
        to_folder_ids: &[String],
        mint: &Pubkey,
        amount: u64,
    ) -> Result<String> {
        let sources = self.wallets.wallets_in_folders(from_folder_ids).await?;
        let destinations: Vec<Pubkey> = self
            .wallets
            .wallets_in_folders(to_folder_ids)
            .await?
            .iter()
            .map(|wallet| wallet.address())
            .collect();
        let (engine, main) = self.engine().await?;

        self.submit_token_transfers(engine, &main, &sources, &destinations, mint, amount)
            .await
    }

    /// Assemble and submit one transfer per (source, destination) pair,
    /// source-major order, each signed only by its source wallet, with
    /// the incentive transaction funded by main at the end.
    async fn submit_token_transfers(
        &self,
        engine: BundleSubmissionEngine,
        main: &SigningIdentity,
        sources: &[WalletInfo],
        destinations: &[Pubkey],
        mint: &Pubkey,
        amount: u64,
    ) -> Result<String> {
        if amount == 0 {
            return Err(EngineError::InvalidParams(
                "amount must be greater than 0".to_string(),
            ));
        }

        let mut pairs = Vec::with_capacity(sources.len() * destinations.len());
        for source in sources {
            for destination in destinations {
                pairs.push((source, *destination));
            }
        }

        info!(
            transfers = pairs.len(),
            mint = %mint,
            "Assembling token transfer bundle"
        );

        let assembler = TransactionAssembler::new(self.relay.clone());
        let shared = self.bundle_anchor().await?;

        let encoded = future::try_join_all(pairs.iter().map(|(source, destination)| {
            let assembler = &assembler;
            async move {
                let anchor = self.next_anchor(shared).await?;
                let transaction = assembler
                    .token_transfer(&source.identity, destination, mint, amount, anchor)
                    .await?;
                TransactionAssembler::encode(&transaction)
            }
        }))
        .await?;

        let mut payloads: Vec<BundlePayload> =
            encoded.into_iter().map(BundlePayload::Prebuilt).collect();
        payloads.push(self.tip_payload(&assembler, main, shared).await?);

        engine.submit(&payloads, &self.bundle_config).await
    }
}
