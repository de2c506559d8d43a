use acp_types::{validate_agent_id, AcpError, AgentId};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::warn;
use zeroize::Zeroizing;

use crate::seed;

/// An agent's Ed25519 identity (ACP-SIGN-1.0).
///
/// Immutable after construction. The signing key is zeroized on drop and
/// never shows up in `Debug` output; share across threads by reference or
/// `Arc`, no locking needed.
pub struct AgentIdentity {
    signing_key: SigningKey,
    agent_id: AgentId,
}

impl AgentIdentity {
    /// Generate a new random identity from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self::from_signing_key(SigningKey::generate(&mut csprng))
    }

    /// Restore from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, AcpError> {
        let seed: &[u8; 32] = seed
            .try_into()
            .map_err(|_| AcpError::InvalidSeedLength(seed.len()))?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(seed)))
    }

    /// Restore from a hex-encoded seed, with or without a `0x` prefix.
    pub fn from_hex(hex_seed: &str) -> Result<Self, AcpError> {
        let hex_seed = hex_seed.trim();
        let hex_seed = hex_seed.strip_prefix("0x").unwrap_or(hex_seed);
        let bytes = Zeroizing::new(
            hex::decode(hex_seed).map_err(|e| AcpError::InvalidHex(e.to_string()))?,
        );
        Self::from_seed(&bytes)
    }

    /// Load from a file holding exactly 32 raw seed bytes.
    ///
    /// Test convenience only, not a key storage format.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, AcpError> {
        let bytes = seed::read_seed_file(path.as_ref())?;
        Self::from_seed(&bytes)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let agent_id = AgentId::from_public_key(&signing_key.verifying_key().to_bytes());
        if !validate_agent_id(agent_id.as_str()) {
            // Leading zero bytes in the hash shorten the base58 form.
            warn!(agent_id = %agent_id, len = agent_id.as_str().len(), "derived agent id is outside the 43-44 character range");
        }
        Self {
            signing_key,
            agent_id,
        }
    }

    /// `base58(SHA-256(public_key))`.
    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Raw 32-byte Ed25519 public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Raw 32-byte private seed.
    ///
    /// Only for explicit export paths. Never log, persist or transmit it.
    pub fn private_key_seed(&self) -> &[u8; 32] {
        self.signing_key.as_bytes()
    }

    /// ACP-SIGN-1.0: `Ed25519(sk, SHA-256(message))`.
    ///
    /// The message is pre-hashed, so this is not interchangeable with a plain
    /// Ed25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let digest = Sha256::digest(message);
        self.signing_key.sign(&digest).to_bytes()
    }

    /// Verify a signature made by this identity.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        verify_signature(&self.public_key_bytes(), message, signature)
    }
}

impl fmt::Debug for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentIdentity")
            .field("agent_id", &self.agent_id.as_str())
            .finish_non_exhaustive()
    }
}

/// Verify an ACP-SIGN-1.0 signature: `Ed25519.verify(pk, SHA-256(message), sig)`.
///
/// Returns `false` for a malformed key, a signature of the wrong length, or a
/// signature that does not verify. Never panics.
pub fn verify_signature(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(key) = <&[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    let digest = Sha256::digest(message);
    verifying_key.verify(&digest, &signature).is_ok()
}
