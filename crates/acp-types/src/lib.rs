use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub mod b64url;

/// Bitcoin base58 alphabet used for AgentIDs.
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of a raw Ed25519 public key or seed.
pub const KEY_LENGTH: usize = 32;

/// Agent identity: `base58(SHA-256(public_key))`, Bitcoin alphabet.
///
/// Only constructible from key bytes or by parsing a well-formed string, so
/// an `AgentId` is never detached from the key it fingerprints.
///
/// A hash with leading zero bytes encodes to fewer than 43 characters.
/// [`AgentId::parse`] rejects such IDs like [`validate_agent_id`] does, while
/// deserialization accepts any base58 string of a 32-byte hash so every
/// derived ID round-trips through serde.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    pub fn from_public_key(pubkey_bytes: &[u8; 32]) -> Self {
        let hash = Sha256::digest(pubkey_bytes);
        Self(bs58::encode(hash).into_string())
    }

    /// Parse a syntactically valid AgentID (see [`validate_agent_id`]).
    pub fn parse(s: &str) -> Result<Self, AcpError> {
        if validate_agent_id(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(AcpError::InvalidAgentId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AgentId {
    type Error = AcpError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if is_fingerprint(&s) {
            Ok(Self(s))
        } else {
            Err(AcpError::InvalidAgentId(s))
        }
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.len().min(12);
        write!(f, "AgentId({}..)", &self.0[..end])
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive an AgentID string from raw public key bytes of unknown length.
///
/// The output is not padded: a hash with leading zero bytes encodes to fewer
/// characters, one leading `1` per zero byte.
pub fn derive_agent_id(public_key_bytes: &[u8]) -> Result<String, AcpError> {
    let key: &[u8; 32] = public_key_bytes
        .try_into()
        .map_err(|_| AcpError::InvalidPublicKeyLength(public_key_bytes.len()))?;
    Ok(AgentId::from_public_key(key).0)
}

/// Syntactic AgentID check: 43-44 characters, all from the Bitcoin base58
/// alphabet. Says nothing about whether a matching key exists.
pub fn validate_agent_id(s: &str) -> bool {
    (43..=44).contains(&s.len()) && s.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// Base58 text decoding to exactly one SHA-256 output. Leading `1`s map to
/// zero bytes, so this admits exactly the strings derivation can produce.
fn is_fingerprint(s: &str) -> bool {
    s.len() <= 44
        && bs58::decode(s)
            .into_vec()
            .is_ok_and(|bytes| bytes.len() == KEY_LENGTH)
}

/// Unix epoch timestamp in seconds.
pub type Timestamp = i64;

/// Common error types.
#[derive(Debug, thiserror::Error)]
pub enum AcpError {
    #[error("invalid seed length: expected 32 bytes, got {0}")]
    InvalidSeedLength(usize),
    #[error("invalid public key length: expected 32 bytes, got {0}")]
    InvalidPublicKeyLength(usize),
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("malformed agent id: {0}")]
    InvalidAgentId(String),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("challenge request failed: {0}")]
    ChallengeRequestFailed(String),
    #[error("handshake error: {0}")]
    Handshake(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Capability token rejection reasons (ACP-CT-1.0 error codes).
///
/// Every signature failure maps to the single [`TokenError::InvalidSignature`]
/// variant; the reason is never reported.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("unsupported token version")]
    UnsupportedVersion,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("capability not present in token: {0}")]
    CapabilityNotPresent(String),
    #[error("resource not covered by token: {0}")]
    ResourceNotCovered(String),
    #[error("delegation not permitted")]
    DelegationNotAllowed,
    #[error("max_depth {0} exceeds absolute limit")]
    MaxDepthExceeded(u32),
    #[error("cap array is empty")]
    EmptyCapabilities,
    #[error("malformed agent id in {0}")]
    MalformedAgentId(&'static str),
}

impl TokenError {
    /// Wire error code.
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Malformed(_) | TokenError::UnsupportedVersion => "CT-001",
            TokenError::InvalidSignature => "CT-002",
            TokenError::Expired => "CT-003",
            TokenError::NotYetValid => "CT-004",
            TokenError::CapabilityNotPresent(_) => "CT-005",
            TokenError::ResourceNotCovered(_) => "CT-006",
            TokenError::DelegationNotAllowed => "CT-007",
            TokenError::MaxDepthExceeded(_) => "CT-008",
            TokenError::EmptyCapabilities => "CT-012",
            TokenError::MalformedAgentId(_) => "CT-013",
        }
    }
}
