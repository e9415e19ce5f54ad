//! Bundler Core - Atomic bundle assembly, submission, and settlement tracking

pub mod bundle;
pub mod error;
pub mod orchestrator;
pub mod relay;
pub mod types;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_utils;

pub use bundle::{BundleSubmissionEngine, StatusPoller, TipAccountSelector, TransactionAssembler};
pub use error::{EngineError, Result};
pub use orchestrator::{
    funds::calculate_distribution_amount,
    trading::{calculate_trading_fees, validate_trading_params},
    FundOrchestrator, TradeAction, TradeOperation,
};
pub use relay::{
    InflightBundleStatus, RelayApi, RelayClient, RelayClientConfig, SettledBundleStatus,
    SimulationFailure, SimulationSummary, SimulationValue,
};
pub use types::{
    AnchorMode, BundleConfig, BundlePayload, BundleStatus, InvalidStatusPolicy,
    BASE_FEE_LAMPORTS, COLLECT_RESERVE_LAMPORTS, MINIMUM_TIP_LAMPORTS, TRADES_PER_WALLET,
};
pub use wallet::{FolderInfo, SigningIdentity, WalletDirectory, WalletInfo};

/// Crate version, taken from the package manifest.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
