//! Random selection from the relay's incentive account pool

use crate::error::{EngineError, Result};
use crate::relay::RelayApi;
use rand::Rng;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Picks incentive accounts from the relay pool.
///
/// Selection is uniformly random on every call so tip flow spreads
/// across the pool instead of concentrating on one account.
pub struct TipAccountSelector {
    relay: Arc<dyn RelayApi>,
}

impl TipAccountSelector {
    pub fn new(relay: Arc<dyn RelayApi>) -> Self {
        Self { relay }
    }

    /// Select a random account from the relay's current pool.
    pub async fn select(&self) -> Result<Pubkey> {
        let accounts = self.relay.get_tip_accounts().await?;
        if accounts.is_empty() {
            return Err(EngineError::NoTipAccountsAvailable);
        }

        let index = rand::thread_rng().gen_range(0..accounts.len());
        let account = accounts[index];
        debug!(tip_account = %account, "Selected tip account");

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockRelay;

    #[tokio::test]
    async fn test_select_returns_pool_member() {
        let pool = vec![Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()];
        let relay = Arc::new(MockRelay::new().with_tip_accounts(pool.clone()));
        let selector = TipAccountSelector::new(relay);

        for _ in 0..10 {
            let selected = selector.select().await.unwrap();
            assert!(pool.contains(&selected));
        }
    }

    #[tokio::test]
    async fn test_empty_pool_is_an_error() {
        let relay = Arc::new(MockRelay::new().with_tip_accounts(vec![]));
        let selector = TipAccountSelector::new(relay);

        let err = selector.select().await.unwrap_err();
        assert!(matches!(err, EngineError::NoTipAccountsAvailable));
    }
}
