//! Normalized signing identity shared across the engine

use crate::error::{EngineError, Result};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::fmt;
use std::sync::Arc;

/// A signing keypair in the one shape the engine accepts.
///
/// Callers hold keys in many forms (generated, base58 strings, raw byte
/// vectors); all of them normalize into a `SigningIdentity` at the API
/// boundary. The inner keypair is reference-counted; clones share it
/// across concurrent assembly tasks. The secret never appears in `Debug`
/// output and is never written anywhere by the engine.
#[derive(Clone)]
pub struct SigningIdentity {
    keypair: Arc<Keypair>,
}

impl SigningIdentity {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self {
            keypair: Arc::new(Keypair::new()),
        }
    }

    /// Build an identity from a 64-byte secret key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(EngineError::InvalidParams(format!(
                "invalid secret key length: expected 64 bytes, got {}",
                bytes.len()
            )));
        }

        let keypair = Keypair::from_bytes(bytes)
            .map_err(|e| EngineError::InvalidParams(format!("invalid secret key: {}", e)))?;

        Ok(Self {
            keypair: Arc::new(keypair),
        })
    }

    /// Build an identity from a base58-encoded secret key.
    pub fn from_base58(encoded: &str) -> Result<Self> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| EngineError::InvalidParams(format!("invalid base58 secret key: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    /// Public address of this identity.
    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Borrow the keypair for signing.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Export the secret key as base58. Never called by the engine
    /// itself; provided for callers that manage their own key storage.
    pub fn to_base58(&self) -> String {
        self.keypair.to_base58_string()
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
