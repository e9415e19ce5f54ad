//! Engine error taxonomy

use crate::types::BundleStatus;
use thiserror::Error;

/// Errors surfaced by the bundle engine and the fund orchestration layer.
///
/// Every variant propagates to the immediate caller; the engine never
/// retries on its own. The one bounded retry-like behavior is the status
/// poll loop, which repeats a read, not a submission.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A transaction could not be built or signed.
    #[error("transaction assembly failed: {0}")]
    Assembly(String),

    /// Account state needed to build a transaction could not be resolved.
    #[error("account lookup failed for {address}: {reason}")]
    AccountLookup { address: String, reason: String },

    /// The relay reported a logical failure during simulation. Fatal: a
    /// bundle whose simulation failed is never submitted.
    #[error("bundle simulation failed: {0}")]
    SimulationFailed(String),

    /// The relay or transport rejected the send itself.
    #[error("bundle submission failed: {0}")]
    Submission(String),

    /// The relay marked the bundle as failed after acceptance.
    #[error("bundle {id} failed with status: {status}")]
    BundleFailed { id: String, status: BundleStatus },

    /// The polling window elapsed without a terminal status. The bundle's
    /// on-relay fate is unknown; it may still land.
    #[error("polling timeout exceeded, bundle not confirmed")]
    Timeout,

    /// Every wallet in the collection was at or below the reserve.
    #[error("no wallets have sufficient balance to collect")]
    NothingToCollect,

    /// The selected folders contain no wallets.
    #[error("no wallets found in specified folders")]
    NoWalletsFound,

    /// The relay returned an empty tip account pool.
    #[error("no tip account found")]
    NoTipAccountsAvailable,

    /// Caller-supplied parameters failed validation before any network call.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Transport or protocol failure on a relay RPC outside the send path.
    #[error("relay rpc {method} failed: {reason}")]
    Rpc { method: String, reason: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
