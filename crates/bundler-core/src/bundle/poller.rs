//! Settlement polling for submitted bundles

use crate::error::{EngineError, Result};
use crate::relay::RelayApi;
use crate::types::{BundleConfig, BundleStatus, InvalidStatusPolicy};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Polls the relay until a bundle reaches a terminal state or the
/// polling window closes.
pub struct StatusPoller {
    relay: Arc<dyn RelayApi>,
}

impl StatusPoller {
    pub fn new(relay: Arc<dyn RelayApi>) -> Self {
        Self { relay }
    }

    /// Poll until the bundle lands, fails, or times out.
    ///
    /// Sleeps once for `wait_before_poll`, then queries the relay every
    /// `poll_interval` until `poll_timeout` elapses. The timeout window
    /// starts at the first query, not at submission. Returns the landed
    /// slot when the relay reports one.
    pub async fn poll(&self, bundle_id: &str, config: &BundleConfig) -> Result<Option<u64>> {
        sleep(config.wait_before_poll).await;

        let ids = vec![bundle_id.to_string()];
        let started = Instant::now();
        let mut last_status: Option<BundleStatus> = None;

        while started.elapsed() < config.poll_timeout {
            let statuses = self.relay.get_inflight_bundle_statuses(&ids).await?;
            let observed = statuses.into_iter().find(|s| s.bundle_id == bundle_id);

            match observed {
                Some(entry) => {
                    // Log transitions only, not every identical observation
                    if last_status != Some(entry.status) {
                        info!(bundle_id = bundle_id, status = %entry.status, "Bundle status");
                        last_status = Some(entry.status);
                    }

                    match entry.status {
                        BundleStatus::Landed => return Ok(entry.landed_slot),
                        BundleStatus::Failed => {
                            return Err(EngineError::BundleFailed {
                                id: bundle_id.to_string(),
                                status: entry.status,
                            });
                        }
                        BundleStatus::Invalid
                            if config.invalid_status_policy == InvalidStatusPolicy::Fatal =>
                        {
                            return Err(EngineError::BundleFailed {
                                id: bundle_id.to_string(),
                                status: entry.status,
                            });
                        }
                        _ => {}
                    }
                }
                None => {
                    debug!(bundle_id = bundle_id, "Bundle not yet visible to the relay");
                }
            }

            sleep(config.poll_interval).await;
        }

        warn!(bundle_id = bundle_id, "Polling timeout exceeded");
        Err(EngineError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockRelay;
    use std::time::Duration;

    fn fast_config() -> BundleConfig {
        BundleConfig {
            wait_before_poll: Duration::from_millis(1),
            poll_interval: Duration::from_millis(2),
            poll_timeout: Duration::from_millis(200),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_poll_until_landed() {
        let relay = Arc::new(
            MockRelay::new()
                .with_status_sequence(vec![BundleStatus::Pending, BundleStatus::Landed])
                .with_landed_slot(1234),
        );
        let poller = StatusPoller::new(relay.clone());

        let slot = poller.poll("bundle-1", &fast_config()).await.unwrap();
        assert_eq!(slot, Some(1234));

        // Each loop iteration issued a fresh query
        assert!(relay.call_count("getInflightBundleStatuses") >= 2);
    }

    #[tokio::test]
    async fn test_poll_failed_is_fatal() {
        let relay = Arc::new(
            MockRelay::new()
                .with_status_sequence(vec![BundleStatus::Pending, BundleStatus::Failed]),
        );
        let poller = StatusPoller::new(relay);

        let err = poller.poll("bundle-1", &fast_config()).await.unwrap_err();
        match err {
            EngineError::BundleFailed { id, status } => {
                assert_eq!(id, "bundle-1");
                assert_eq!(status, BundleStatus::Failed);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_poll_times_out_while_pending() {
        let relay = Arc::new(
            MockRelay::new().with_status_sequence(vec![BundleStatus::Pending]),
        );
        let poller = StatusPoller::new(relay.clone());

        let config = BundleConfig {
            poll_timeout: Duration::from_millis(10),
            ..fast_config()
        };

        let err = poller.poll("bundle-1", &config).await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout));
        assert!(relay.call_count("getInflightBundleStatuses") >= 2);
    }

    #[tokio::test]
    async fn test_invalid_keeps_polling_by_default() {
        let relay = Arc::new(
            MockRelay::new()
                .with_status_sequence(vec![BundleStatus::Invalid, BundleStatus::Landed]),
        );
        let poller = StatusPoller::new(relay);

        assert!(poller.poll("bundle-1", &fast_config()).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_fatal_policy_stops() {
        let relay = Arc::new(
            MockRelay::new().with_status_sequence(vec![BundleStatus::Invalid]),
        );
        let poller = StatusPoller::new(relay);

        let config = BundleConfig {
            invalid_status_policy: InvalidStatusPolicy::Fatal,
            ..fast_config()
        };

        let err = poller.poll("bundle-1", &config).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::BundleFailed {
                status: BundleStatus::Invalid,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_bundle_keeps_polling() {
        // Relay that never lists the bundle at all
        let relay = Arc::new(MockRelay::new().with_status_sequence(vec![]));
        let poller = StatusPoller::new(relay);

        let config = BundleConfig {
            poll_timeout: Duration::from_millis(10),
            ..fast_config()
        };

        let err = poller.poll("bundle-1", &config).await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout));
    }
}
