use acp_types::{AcpError, AgentId};
use ed25519_dalek::VerifyingKey;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Relying-party lookup of agent public keys by AgentID.
pub trait KeyStore: Send + Sync {
    /// Register a public key; the AgentID is derived from the key.
    fn register(&self, public_key: [u8; 32]) -> Result<AgentId, AcpError>;

    /// Look up an Ed25519 public key by AgentID.
    fn public_key(&self, id: &str) -> Option<[u8; 32]>;

    /// Forget a key. Returns whether it was present.
    fn remove(&self, id: &str) -> bool;

    /// List all registered AgentIDs.
    fn list(&self) -> Vec<AgentId>;
}

/// In-memory key store (tests and single-process relying parties).
#[derive(Clone, Default)]
pub struct MemoryKeyStore {
    pubkeys: Arc<RwLock<HashMap<String, [u8; 32]>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn register(&self, public_key: [u8; 32]) -> Result<AgentId, AcpError> {
        VerifyingKey::from_bytes(&public_key).map_err(|_| AcpError::InvalidPublicKey)?;
        let id = AgentId::from_public_key(&public_key);
        self.pubkeys
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.as_str().to_string(), public_key);
        Ok(id)
    }

    fn public_key(&self, id: &str) -> Option<[u8; 32]> {
        self.pubkeys
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .copied()
    }

    fn remove(&self, id: &str) -> bool {
        self.pubkeys
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .is_some()
    }

    fn list(&self) -> Vec<AgentId> {
        self.pubkeys
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(AgentId::from_public_key)
            .collect()
    }
}
