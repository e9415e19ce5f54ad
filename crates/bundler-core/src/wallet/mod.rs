//! In-memory wallet directory organizing signing identities into folders

pub mod identity;

pub use identity::SigningIdentity;

use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A named wallet held in a folder.
#[derive(Debug, Clone)]
pub struct WalletInfo {
    /// Directory-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Signing identity.
    pub identity: SigningIdentity,
}

impl WalletInfo {
    pub fn address(&self) -> Pubkey {
        self.identity.address()
    }
}

/// A folder of wallets.
#[derive(Debug, Clone)]
pub struct FolderInfo {
    pub id: String,
    pub name: String,
    pub wallets: Vec<WalletInfo>,
    pub created_at: DateTime<Utc>,
}

/// In-memory directory of wallet folders plus an optional main wallet.
///
/// Holds identities only for the lifetime of the process. Persistence,
/// if any, is the caller's concern; the directory never writes key
/// material anywhere.
pub struct WalletDirectory {
    /// Folders by identifier.
    folders: Arc<RwLock<HashMap<String, FolderInfo>>>,
    /// Funding wallet used for distribution, tips, and fee payment.
    main_wallet: Arc<RwLock<Option<SigningIdentity>>>,
}

impl WalletDirectory {
    pub fn new() -> Self {
        Self {
            folders: Arc::new(RwLock::new(HashMap::new())),
            main_wallet: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the main wallet identity.
    pub async fn set_main_wallet(&self, identity: SigningIdentity) {
        let mut main = self.main_wallet.write().await;
        *main = Some(identity);
    }

    /// The main wallet identity, or an error when none is configured.
    pub async fn main_wallet(&self) -> Result<SigningIdentity> {
        let main = self.main_wallet.read().await;
        main.clone()
            .ok_or_else(|| EngineError::InvalidParams("no main wallet configured".to_string()))
    }

    /// Create an empty folder and return it.
    pub async fn create_folder(&self, name: &str) -> FolderInfo {
        let folder = FolderInfo {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            wallets: Vec::new(),
            created_at: Utc::now(),
        };

        let mut folders = self.folders.write().await;
        folders.insert(folder.id.clone(), folder.clone());
        folder
    }

    /// Generate `count` fresh wallets inside a folder. Names continue the
    /// folder's existing numbering.
    pub async fn generate_wallets(&self, folder_id: &str, count: usize) -> Result<Vec<WalletInfo>> {
        let mut folders = self.folders.write().await;
        let folder = folders
            .get_mut(folder_id)
            .ok_or_else(|| EngineError::InvalidParams(format!("folder not found: {}", folder_id)))?;

        let mut created = Vec::with_capacity(count);
        for i in 0..count {
            created.push(WalletInfo {
                id: uuid::Uuid::new_v4().to_string(),
                name: format!("Wallet {}", folder.wallets.len() + i + 1),
                identity: SigningIdentity::generate(),
            });
        }
        folder.wallets.extend(created.iter().cloned());

        Ok(created)
    }

    /// Import a wallet from a base58 secret key into a folder.
    pub async fn import_wallet(
        &self,
        folder_id: &str,
        name: Option<&str>,
        secret_base58: &str,
    ) -> Result<WalletInfo> {
        let identity = SigningIdentity::from_base58(secret_base58)?;

        let mut folders = self.folders.write().await;
        let folder = folders
            .get_mut(folder_id)
            .ok_or_else(|| EngineError::InvalidParams(format!("folder not found: {}", folder_id)))?;

        let wallet = WalletInfo {
            id: uuid::Uuid::new_v4().to_string(),
            name: name
                .map(str::to_string)
                .unwrap_or_else(|| format!("Wallet {}", folder.wallets.len() + 1)),
            identity,
        };
        folder.wallets.push(wallet.clone());

        Ok(wallet)
    }

    /// Fetch a folder by identifier.
    pub async fn folder(&self, folder_id: &str) -> Option<FolderInfo> {
        let folders = self.folders.read().await;
        folders.get(folder_id).cloned()
    }

    /// All folders, oldest first.
    pub async fn list_folders(&self) -> Vec<FolderInfo> {
        let folders = self.folders.read().await;
        let mut all: Vec<FolderInfo> = folders.values().cloned().collect();
        all.sort_by_key(|f| f.created_at);
        all
    }

    /// Remove a folder and its wallets. Returns whether it existed.
    pub async fn delete_folder(&self, folder_id: &str) -> bool {
        let mut folders = self.folders.write().await;
        folders.remove(folder_id).is_some()
    }

    /// All wallets across all folders.
    pub async fn all_wallets(&self) -> Vec<WalletInfo> {
        let folders = self.folders.read().await;
        let mut all: Vec<FolderInfo> = folders.values().cloned().collect();
        all.sort_by_key(|f| f.created_at);
        all.into_iter().flat_map(|f| f.wallets).collect()
    }

    /// Wallets from the given folders, in folder-id order. Unknown folder
    /// identifiers are skipped.
    pub async fn wallets_in_folders(&self, folder_ids: &[String]) -> Result<Vec<WalletInfo>> {
        if folder_ids.is_empty() {
            return Err(EngineError::InvalidParams(
                "no folder IDs provided".to_string(),
            ));
        }

        let folders = self.folders.read().await;
        let wallets: Vec<WalletInfo> = folder_ids
            .iter()
            .filter_map(|id| folders.get(id))
            .flat_map(|f| f.wallets.iter().cloned())
            .collect();

        if wallets.is_empty() {
            return Err(EngineError::NoWalletsFound);
        }

        Ok(wallets)
    }
}

impl Default for WalletDirectory {
    fn default() -> Self {
        Self::new()
    }
}
