//! Bundle submission pipeline: encode, simulate, send, await settlement

use crate::bundle::assembler::TransactionAssembler;
use crate::bundle::poller::StatusPoller;
use crate::bundle::tip::TipAccountSelector;
use crate::error::{EngineError, Result};
use crate::relay::RelayApi;
use crate::types::{BundleConfig, BundlePayload, MINIMUM_TIP_LAMPORTS};
use crate::wallet::SigningIdentity;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Drives a bundle from payloads to a settled (or failed) submission.
///
/// The engine signs memo payloads with its own identity, attaches the
/// incentive payment, and runs the simulate/send/poll sequence. Prebuilt
/// payloads pass through untouched; their signatures and incentive
/// payment are the caller's responsibility.
pub struct BundleSubmissionEngine {
    relay: Arc<dyn RelayApi>,
    identity: SigningIdentity,
    assembler: TransactionAssembler,
    tip_selector: TipAccountSelector,
    poller: StatusPoller,
}

impl BundleSubmissionEngine {
    pub fn new(relay: Arc<dyn RelayApi>, identity: SigningIdentity) -> Self {
        Self {
            assembler: TransactionAssembler::new(relay.clone()),
            tip_selector: TipAccountSelector::new(relay.clone()),
            poller: StatusPoller::new(relay.clone()),
            relay,
            identity,
        }
    }

    /// Identity used to sign memo payloads and their incentive payment.
    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }

    /// Submit a bundle and wait for it to settle.
    ///
    /// Returns the relay-assigned bundle identifier once the bundle has
    /// landed. A simulation failure, terminal relay failure, or polling
    /// timeout surfaces as an error; after a failed simulation the
    /// bundle is never sent.
    pub async fn submit(&self, payloads: &[BundlePayload], config: &BundleConfig) -> Result<String> {
        if payloads.is_empty() {
            return Err(EngineError::InvalidParams(
                "no payloads provided".to_string(),
            ));
        }

        info!(
            transactions = payloads.len(),
            tip_lamports = config.tip_lamports,
            "Starting bundle submission"
        );

        let encoded = self.encode_payloads(payloads, config).await?;

        if config.simulate_first {
            let simulation = self.relay.simulate_bundle(&encoded).await?;
            if let Some(reason) = simulation.failure_reason() {
                error!(reason = %reason, "Bundle simulation failed, aborting submission");
                return Err(EngineError::SimulationFailed(reason));
            }
            debug!("Bundle simulation succeeded");
        }

        let bundle_id = match self.relay.send_bundle(&encoded).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Bundle submission failed");
                return Err(e);
            }
        };
        info!(bundle_id = %bundle_id, "Bundle sent");

        let landed_slot = self.poller.poll(&bundle_id, config).await?;
        info!(bundle_id = %bundle_id, landed_slot = ?landed_slot, "Bundle landed");

        Ok(bundle_id)
    }

    /// Turn payloads into wire transactions.
    ///
    /// A bundle is either all memo payloads or all prebuilt ones. On the
    /// memo path every transaction shares one anchor and the incentive
    /// transfer rides on the last transaction.
    async fn encode_payloads(
        &self,
        payloads: &[BundlePayload],
        config: &BundleConfig,
    ) -> Result<Vec<String>> {
        let first_is_memo = payloads.first().is_some_and(BundlePayload::is_memo);
        if payloads.iter().any(|p| p.is_memo() != first_is_memo) {
            return Err(EngineError::InvalidParams(
                "mixed payload kinds in bundle".to_string(),
            ));
        }

        let mut memos: Vec<&str> = Vec::new();
        let mut prebuilt: Vec<String> = Vec::new();

        for payload in payloads {
            match payload {
                BundlePayload::Memo(text) => memos.push(text),
                BundlePayload::Prebuilt(encoded) => prebuilt.push(encoded.clone()),
            }
        }

        if memos.is_empty() {
            return Ok(prebuilt);
        }

        if config.tip_lamports < MINIMUM_TIP_LAMPORTS {
            return Err(EngineError::InvalidParams(format!(
                "tip of {} lamports is below the relay minimum of {}",
                config.tip_lamports, MINIMUM_TIP_LAMPORTS
            )));
        }

        let anchor = self.relay.get_latest_blockhash().await?;
        let tip_account = self.tip_selector.select().await?;
        debug!(anchor = %anchor, tip_account = %tip_account, "Assembling memo bundle");

        let last = memos.len() - 1;
        let mut encoded = Vec::with_capacity(memos.len());
        for (i, text) in memos.iter().enumerate() {
            let tip = (i == last).then_some((tip_account, config.tip_lamports));
            let transaction = self
                .assembler
                .memo_transaction(&self.identity, text, tip, anchor)?;
            encoded.push(TransactionAssembler::encode(&transaction)?);
        }

        Ok(encoded)
    }
}
