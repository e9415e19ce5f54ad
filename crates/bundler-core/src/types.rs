//! Shared bundle types and engine constants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Minimum incentive payment accepted by the relay, in lamports.
pub const MINIMUM_TIP_LAMPORTS: u64 = 1_000;

/// Lamports left behind per wallet during collection, covering rent
/// exemption on the emptied account.
pub const COLLECT_RESERVE_LAMPORTS: u64 = 5_000;

/// Trade transactions synthesized per wallet in a trading bundle.
pub const TRADES_PER_WALLET: usize = 5;

/// Base network fee per transaction, in lamports. Used for fee estimates.
pub const BASE_FEE_LAMPORTS: u64 = 5_000;

/// Relay-side status of an in-flight bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleStatus {
    /// Not in the relay's recent state; may be retried or treated as fatal
    /// depending on [`InvalidStatusPolicy`].
    Invalid,
    /// Accepted and awaiting inclusion.
    Pending,
    /// Included in a confirmed slot.
    Landed,
    /// Terminally rejected.
    Failed,
}

impl BundleStatus {
    /// Whether polling can stop at this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BundleStatus::Landed | BundleStatus::Failed)
    }

    pub fn is_landed(&self) -> bool {
        matches!(self, BundleStatus::Landed)
    }
}

impl fmt::Display for BundleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BundleStatus::Invalid => "Invalid",
            BundleStatus::Pending => "Pending",
            BundleStatus::Landed => "Landed",
            BundleStatus::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

/// How the poll loop treats an `Invalid` status observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidStatusPolicy {
    /// Keep polling until a terminal status or the timeout. `Invalid` is
    /// common immediately after submission, before the relay has seen the
    /// bundle.
    KeepPolling,
    /// Treat the first `Invalid` observation as a terminal failure.
    Fatal,
}

/// How liveness anchors are acquired for a batch of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// One fresh anchor fetched per bundle and shared by every transaction
    /// in it. Keeps the whole bundle inside a single validity window.
    SharedPerBundle,
    /// Each transaction fetches its own anchor immediately before signing.
    /// Anchors may differ by a slot or two across the bundle.
    PerTransaction,
}

/// One unit of caller-supplied bundle content.
///
/// The kind is declared by the caller, never inferred from the string
/// shape. A single bundle must be homogeneous: either all memo texts or
/// all prebuilt wire transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundlePayload {
    /// Raw message text, wrapped into a signed memo transaction by the
    /// engine. The incentive transfer rides on the last memo in the set.
    Memo(String),
    /// A base64-encoded wire transaction, already signed by the caller.
    /// The caller is responsible for including the incentive payment.
    Prebuilt(String),
}

impl BundlePayload {
    /// Whether this is engine-built memo content rather than a prebuilt
    /// wire transaction.
    pub fn is_memo(&self) -> bool {
        matches!(self, BundlePayload::Memo(_))
    }
}

/// Bundle submission configuration.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Incentive payment in lamports, transferred to a relay tip account.
    pub tip_lamports: u64,
    /// Simulate the full bundle before sending; a failure summary aborts
    /// the submission.
    pub simulate_first: bool,
    /// One-time wait before the first status query. Settlement is never
    /// immediate, so early queries are wasted.
    pub wait_before_poll: Duration,
    /// Sleep between status queries.
    pub poll_interval: Duration,
    /// Total polling window, measured from the first query.
    pub poll_timeout: Duration,
    /// Treatment of `Invalid` status observations while polling.
    pub invalid_status_policy: InvalidStatusPolicy,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            tip_lamports: MINIMUM_TIP_LAMPORTS,
            simulate_first: true,
            wait_before_poll: Duration::from_millis(5_000),
            poll_interval: Duration::from_millis(3_000),
            poll_timeout: Duration::from_millis(30_000),
            invalid_status_policy: InvalidStatusPolicy::KeepPolling,
        }
    }
}
