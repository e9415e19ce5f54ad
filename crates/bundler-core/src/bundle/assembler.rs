//! Construction, signing, and wire encoding of bundle transactions

use crate::error::{EngineError, Result};
use crate::relay::RelayApi;
use crate::wallet::SigningIdentity;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use std::sync::Arc;
use tracing::debug;

/// Builds signed transactions for bundle submission.
///
/// Every builder takes the liveness anchor as a parameter; anchor
/// acquisition policy lives with the caller, not here.
pub struct TransactionAssembler {
    relay: Arc<dyn RelayApi>,
}

impl TransactionAssembler {
    pub fn new(relay: Arc<dyn RelayApi>) -> Self {
        Self { relay }
    }

    /// A native transfer of `lamports` from `from` to `to`, fee paid and
    /// signed by `from`.
    pub fn native_transfer(
        &self,
        from: &SigningIdentity,
        to: &Pubkey,
        lamports: u64,
        anchor: Hash,
    ) -> Result<Transaction> {
        let instruction = system_instruction::transfer(&from.address(), to, lamports);
        self.sign_single(vec![instruction], from, anchor)
    }

    /// A memo transaction carrying `text`, optionally followed by an
    /// incentive transfer to a relay tip account in the same transaction.
    pub fn memo_transaction(
        &self,
        signer: &SigningIdentity,
        text: &str,
        tip: Option<(Pubkey, u64)>,
        anchor: Hash,
    ) -> Result<Transaction> {
        let signer_address = signer.address();
        let mut instructions = vec![spl_memo::build_memo(text.as_bytes(), &[&signer_address])];

        if let Some((tip_account, lamports)) = tip {
            instructions.push(system_instruction::transfer(
                &signer_address,
                &tip_account,
                lamports,
            ));
        }

        self.sign_single(instructions, signer, anchor)
    }

    /// An SPL token transfer from `from`'s associated token account to
    /// the destination owner's. When the destination account does not
    /// exist yet, its creation is prepended to the same transaction,
    /// funded by `from`. Signed only by `from`.
    #[allow(deprecated)]
    pub async fn token_transfer(
        &self,
        from: &SigningIdentity,
        to_owner: &Pubkey,
        mint: &Pubkey,
        amount: u64,
        anchor: Hash,
    ) -> Result<Transaction> {
        let from_address = from.address();
        let source_ata = get_associated_token_address(&from_address, mint);
        let destination_ata = get_associated_token_address(to_owner, mint);

        let mut instructions: Vec<Instruction> = Vec::with_capacity(2);

        if !self.relay.account_exists(&destination_ata).await? {
            debug!(owner = %to_owner, mint = %mint, "Destination token account missing, creating it");
            instructions.push(create_associated_token_account(
                &from_address,
                to_owner,
                mint,
                &spl_token::id(),
            ));
        }

        instructions.push(
            spl_token::instruction::transfer(
                &spl_token::id(),
                &source_ata,
                &destination_ata,
                &from_address,
                &[],
                amount,
            )
            .map_err(|e| EngineError::Assembly(e.to_string()))?,
        );

        self.sign_single(instructions, from, anchor)
    }

    fn sign_single(
        &self,
        instructions: Vec<Instruction>,
        signer: &SigningIdentity,
        anchor: Hash,
    ) -> Result<Transaction> {
        let mut transaction = Transaction::new_with_payer(&instructions, Some(&signer.address()));
        transaction
            .try_sign(&[signer.keypair()], anchor)
            .map_err(|e| EngineError::Assembly(e.to_string()))?;

        Ok(transaction)
    }

    /// Base64 wire encoding of a signed transaction.
    pub fn encode(transaction: &Transaction) -> Result<String> {
        let bytes = bincode::serialize(transaction)
            .map_err(|e| EngineError::Assembly(format!("failed to serialize transaction: {}", e)))?;

        Ok(STANDARD.encode(bytes))
    }
}
