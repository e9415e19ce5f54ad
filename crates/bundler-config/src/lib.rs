//! Bundler Config - Configuration management

use bundler_core::{
    AnchorMode, BundleConfig, InvalidStatusPolicy, RelayClientConfig, SigningIdentity,
    MINIMUM_TIP_LAMPORTS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub relay: RelayConfig,
    #[serde(default)]
    pub bundle: BundleSettings,
    #[serde(default)]
    pub orchestration: OrchestrationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    pub block_engine_url: String,
    pub rpc_url: String,
    #[serde(default = "default_commitment")]
    pub commitment: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    pub tip_lamports: u64,
    pub simulate_first: bool,
    pub wait_before_poll_ms: u64,
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub invalid_status_policy: InvalidStatusPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    pub anchor_mode: AnchorMode,
    /// Base58 secret key of the main wallet. Empty means unset; the key
    /// is typically supplied via the MAIN_WALLET_KEY environment
    /// variable rather than a config file.
    pub main_wallet_key: String,
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            block_engine_url: "https://mainnet.block-engine.jito.wtf/api/v1".to_string(),
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: default_commitment(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            tip_lamports: MINIMUM_TIP_LAMPORTS,
            simulate_first: true,
            wait_before_poll_ms: 5_000,
            poll_interval_ms: 3_000,
            poll_timeout_ms: 30_000,
            invalid_status_policy: InvalidStatusPolicy::KeepPolling,
        }
    }
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            anchor_mode: AnchorMode::SharedPerBundle,
            main_wallet_key: String::new(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let config = Config {
            relay: RelayConfig {
                block_engine_url: std::env::var("BLOCK_ENGINE_URL")
                    .unwrap_or_else(|_| RelayConfig::default().block_engine_url),
                rpc_url: std::env::var("RPC_URL")
                    .unwrap_or_else(|_| RelayConfig::default().rpc_url),
                commitment: std::env::var("COMMITMENT").unwrap_or_else(|_| default_commitment()),
                request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            },
            bundle: BundleSettings {
                tip_lamports: std::env::var("TIP_LAMPORTS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .unwrap_or(MINIMUM_TIP_LAMPORTS),
                simulate_first: std::env::var("SIMULATE_FIRST")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .unwrap_or(true),
                wait_before_poll_ms: std::env::var("WAIT_BEFORE_POLL_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .unwrap_or(5_000),
                poll_interval_ms: std::env::var("POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3_000),
                poll_timeout_ms: std::env::var("POLL_TIMEOUT_MS")
                    .unwrap_or_else(|_| "30000".to_string())
                    .parse()
                    .unwrap_or(30_000),
                invalid_status_policy: parse_invalid_status_policy(
                    &std::env::var("INVALID_STATUS_POLICY").unwrap_or_default(),
                ),
            },
            orchestration: OrchestrationConfig {
                anchor_mode: parse_anchor_mode(
                    &std::env::var("ANCHOR_MODE").unwrap_or_default(),
                ),
                main_wallet_key: std::env::var("MAIN_WALLET_KEY").unwrap_or_default(),
            },
        };

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.relay.block_engine_url.is_empty() {
            anyhow::bail!("relay block_engine_url cannot be empty");
        }
        if !self.relay.block_engine_url.starts_with("http://")
            && !self.relay.block_engine_url.starts_with("https://")
        {
            anyhow::bail!(
                "relay block_engine_url must start with http:// or https://, got: {}",
                self.relay.block_engine_url
            );
        }

        if self.relay.rpc_url.is_empty() {
            anyhow::bail!("relay rpc_url cannot be empty");
        }
        if !self.relay.rpc_url.starts_with("http://") && !self.relay.rpc_url.starts_with("https://")
        {
            anyhow::bail!(
                "relay rpc_url must start with http:// or https://, got: {}",
                self.relay.rpc_url
            );
        }

        if !matches!(
            self.relay.commitment.as_str(),
            "processed" | "confirmed" | "finalized"
        ) {
            anyhow::bail!(
                "relay commitment must be processed, confirmed, or finalized, got: {}",
                self.relay.commitment
            );
        }

        if self.relay.request_timeout_secs == 0 {
            anyhow::bail!("relay request_timeout_secs must be greater than 0");
        }

        if self.bundle.tip_lamports < MINIMUM_TIP_LAMPORTS {
            anyhow::bail!(
                "bundle tip_lamports must be at least {}, got: {}",
                MINIMUM_TIP_LAMPORTS,
                self.bundle.tip_lamports
            );
        }

        if self.bundle.poll_interval_ms == 0 {
            anyhow::bail!("bundle poll_interval_ms must be greater than 0");
        }

        if self.bundle.poll_timeout_ms < self.bundle.poll_interval_ms {
            anyhow::bail!(
                "bundle poll_timeout_ms ({}) must be at least poll_interval_ms ({})",
                self.bundle.poll_timeout_ms,
                self.bundle.poll_interval_ms
            );
        }

        if !self.orchestration.main_wallet_key.is_empty() {
            SigningIdentity::from_base58(&self.orchestration.main_wallet_key)
                .map_err(|e| anyhow::anyhow!("invalid main_wallet_key: {}", e))?;
        }

        Ok(())
    }

    /// Relay client configuration for [`bundler_core::RelayClient`].
    pub fn to_client_config(&self) -> RelayClientConfig {
        RelayClientConfig {
            block_engine_url: self.relay.block_engine_url.clone(),
            rpc_url: self.relay.rpc_url.clone(),
            commitment: self.relay.commitment.clone(),
            request_timeout: Duration::from_secs(self.relay.request_timeout_secs),
        }
    }

    /// Bundle submission configuration for the engine.
    pub fn to_bundle_config(&self) -> BundleConfig {
        BundleConfig {
            tip_lamports: self.bundle.tip_lamports,
            simulate_first: self.bundle.simulate_first,
            wait_before_poll: Duration::from_millis(self.bundle.wait_before_poll_ms),
            poll_interval: Duration::from_millis(self.bundle.poll_interval_ms),
            poll_timeout: Duration::from_millis(self.bundle.poll_timeout_ms),
            invalid_status_policy: self.bundle.invalid_status_policy,
        }
    }

    pub fn anchor_mode(&self) -> AnchorMode {
        self.orchestration.anchor_mode
    }

    /// Main wallet identity from the configured key, if one is set.
    pub fn main_wallet(&self) -> anyhow::Result<Option<SigningIdentity>> {
        if self.orchestration.main_wallet_key.is_empty() {
            return Ok(None);
        }

        let identity = SigningIdentity::from_base58(&self.orchestration.main_wallet_key)
            .map_err(|e| anyhow::anyhow!("invalid main_wallet_key: {}", e))?;
        Ok(Some(identity))
    }
}

fn parse_invalid_status_policy(value: &str) -> InvalidStatusPolicy {
    match value {
        "fatal" => InvalidStatusPolicy::Fatal,
        _ => InvalidStatusPolicy::KeepPolling,
    }
}

fn parse_anchor_mode(value: &str) -> AnchorMode {
    match value {
        "per_transaction" => AnchorMode::PerTransaction,
        _ => AnchorMode::SharedPerBundle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> Config {
        Config {
            relay: RelayConfig::default(),
            bundle: BundleSettings::default(),
            orchestration: OrchestrationConfig::default(),
        }
    }

    #[test]
    fn test_bundle_settings_defaults() {
        let settings = BundleSettings::default();
        assert_eq!(settings.tip_lamports, 1_000);
        assert!(settings.simulate_first);
        assert_eq!(settings.wait_before_poll_ms, 5_000);
        assert_eq!(settings.poll_interval_ms, 3_000);
        assert_eq!(settings.poll_timeout_ms, 30_000);
        assert_eq!(
            settings.invalid_status_policy,
            InvalidStatusPolicy::KeepPolling
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundler.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "relay:\n  block_engine_url: https://engine.example.com/api/v1\n  rpc_url: https://rpc.example.com\nbundle:\n  tip_lamports: 2000\n  poll_timeout_ms: 45000\norchestration:\n  anchor_mode: per_transaction"
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.relay.block_engine_url, "https://engine.example.com/api/v1");
        assert_eq!(config.relay.commitment, "confirmed");
        assert_eq!(config.bundle.tip_lamports, 2_000);
        assert_eq!(config.bundle.poll_timeout_ms, 45_000);
        // Unspecified bundle fields fall back to defaults
        assert_eq!(config.bundle.poll_interval_ms, 3_000);
        assert_eq!(config.anchor_mode(), AnchorMode::PerTransaction);
    }

    #[test]
    fn test_validate_rejects_bad_engine_url() {
        let mut config = valid_config();
        config.relay.block_engine_url = "ftp://engine.example.com".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("block_engine_url"));
    }

    #[test]
    fn test_validate_rejects_low_tip() {
        let mut config = valid_config();
        config.bundle.tip_lamports = 999;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tip_lamports"));
    }

    #[test]
    fn test_validate_rejects_timeout_shorter_than_interval() {
        let mut config = valid_config();
        config.bundle.poll_interval_ms = 5_000;
        config.bundle.poll_timeout_ms = 4_000;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_commitment() {
        let mut config = valid_config();
        config.relay.commitment = "eventual".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_checks_main_wallet_key() {
        let mut config = valid_config();
        config.orchestration.main_wallet_key = "not a key".to_string();
        assert!(config.validate().is_err());

        config.orchestration.main_wallet_key = SigningIdentity::generate().to_base58();
        assert!(config.validate().is_ok());
        assert!(config.main_wallet().unwrap().is_some());
    }

    #[test]
    fn test_to_bundle_config_conversion() {
        let mut config = valid_config();
        config.bundle.tip_lamports = 5_000;
        config.bundle.poll_interval_ms = 1_500;

        let bundle_config = config.to_bundle_config();
        assert_eq!(bundle_config.tip_lamports, 5_000);
        assert_eq!(bundle_config.poll_interval, Duration::from_millis(1_500));
        assert_eq!(bundle_config.poll_timeout, Duration::from_millis(30_000));
    }

    #[test]
    fn test_env_loading_with_overrides() {
        std::env::set_var("BLOCK_ENGINE_URL", "https://env-engine.example.com");
        std::env::set_var("TIP_LAMPORTS", "7500");
        std::env::set_var("INVALID_STATUS_POLICY", "fatal");
        std::env::set_var("ANCHOR_MODE", "per_transaction");

        let config = Config::load_from_env().unwrap();
        assert_eq!(config.relay.block_engine_url, "https://env-engine.example.com");
        assert_eq!(config.bundle.tip_lamports, 7_500);
        assert_eq!(
            config.bundle.invalid_status_policy,
            InvalidStatusPolicy::Fatal
        );
        assert_eq!(config.anchor_mode(), AnchorMode::PerTransaction);

        std::env::remove_var("BLOCK_ENGINE_URL");
        std::env::remove_var("TIP_LAMPORTS");
        std::env::remove_var("INVALID_STATUS_POLICY");
        std::env::remove_var("ANCHOR_MODE");
    }
}
