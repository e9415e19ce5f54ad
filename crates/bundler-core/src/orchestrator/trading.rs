//! Trading bundles: five placeholder trades per wallet through the memo path
//!
//! Trade execution against a venue is not wired up yet; each trade is
//! submitted as a memo transaction describing the intended operation.
//! Bundle shape, ordering, and settlement behave exactly as live trades
//! will.

use super::FundOrchestrator;
use crate::error::{EngineError, Result};
use crate::types::{BundlePayload, BASE_FEE_LAMPORTS, TRADES_PER_WALLET};
use crate::wallet::WalletInfo;
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    fn label(&self) -> &'static str {
        match self {
            TradeAction::Buy => "Buy",
            TradeAction::Sell => "Sell",
        }
    }
}

/// One trade in a mixed bundle.
#[derive(Debug, Clone)]
pub struct TradeOperation {
    pub mint: Pubkey,
    pub amount: f64,
    pub action: TradeAction,
}

/// Validate shared trading inputs, collecting every problem instead of
/// stopping at the first.
pub fn validate_trading_params(wallets: &[WalletInfo], amount: f64) -> Result<()> {
    let mut errors: Vec<&str> = Vec::new();

    if wallets.is_empty() {
        errors.push("no wallets provided");
    }
    if amount <= 0.0 {
        errors.push("amount must be greater than 0");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(EngineError::InvalidParams(errors.join("; ")))
    }
}

/// Total base network fees in SOL for a bundle of `transaction_count`
/// transactions.
pub fn calculate_trading_fees(transaction_count: usize) -> f64 {
    lamports_to_sol(transaction_count as u64 * BASE_FEE_LAMPORTS)
}

fn trade_payloads<F>(wallets: &[WalletInfo], text: F) -> Vec<BundlePayload>
where
    F: Fn(&WalletInfo, usize) -> String,
{
    let mut payloads = Vec::with_capacity(wallets.len() * TRADES_PER_WALLET);
    for wallet in wallets {
        for i in 0..TRADES_PER_WALLET {
            payloads.push(BundlePayload::Memo(text(wallet, i)));
        }
    }
    payloads
}

impl FundOrchestrator {
    /// Submit a buy bundle: five trades per wallet, wallet-major order.
    pub async fn buy_token(
        &self,
        folder_ids: &[String],
        mint: &Pubkey,
        amount: f64,
    ) -> Result<String> {
        let wallets = self.wallets.wallets_in_folders(folder_ids).await?;
        validate_trading_params(&wallets, amount)?;

        let payloads = trade_payloads(&wallets, |wallet, _| {
            format!("Buy {} {} with {}", amount, mint, wallet.address())
        });

        info!(
            wallets = wallets.len(),
            transactions = payloads.len(),
            "Submitting buy bundle"
        );

        let (engine, _main) = self.engine().await?;
        engine.submit(&payloads, &self.bundle_config).await
    }

    /// Submit a sell bundle: five trades per wallet, wallet-major order.
    pub async fn sell_token(
        &self,
        folder_ids: &[String],
        mint: &Pubkey,
        amount: f64,
    ) -> Result<String> {
        let wallets = self.wallets.wallets_in_folders(folder_ids).await?;
        validate_trading_params(&wallets, amount)?;

        let payloads = trade_payloads(&wallets, |wallet, _| {
            format!("Sell {} {} with {}", amount, mint, wallet.address())
        });

        info!(
            wallets = wallets.len(),
            transactions = payloads.len(),
            "Submitting sell bundle"
        );

        let (engine, _main) = self.engine().await?;
        engine.submit(&payloads, &self.bundle_config).await
    }

    /// Submit a mixed bundle. Each wallet's five trades cycle through
    /// the given operations in order.
    pub async fn mixed_trades(
        &self,
        folder_ids: &[String],
        operations: &[TradeOperation],
    ) -> Result<String> {
        if operations.is_empty() {
            return Err(EngineError::InvalidParams(
                "no trade operations provided".to_string(),
            ));
        }

        let wallets = self.wallets.wallets_in_folders(folder_ids).await?;

        let payloads = trade_payloads(&wallets, |wallet, i| {
            let operation = &operations[i % operations.len()];
            format!(
                "{} {} {} with {}",
                operation.action.label().to_uppercase(),
                operation.amount,
                operation.mint,
                wallet.address()
            )
        });

        info!(
            wallets = wallets.len(),
            transactions = payloads.len(),
            "Submitting mixed trading bundle"
        );

        let (engine, _main) = self.engine().await?;
        engine.submit(&payloads, &self.bundle_config).await
    }
}
