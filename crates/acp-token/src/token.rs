use acp_identity::AgentIdentity;
use acp_types::{b64url, AcpError, AgentId, Timestamp, TokenError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::signer;

/// Protocol version carried in `ver`.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Absolute delegation depth limit.
pub const MAX_DELEGATION_DEPTH: u32 = 8;

/// Default token lifetime used by [`TokenBuilder`].
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Delegation rules embedded in every token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub allowed: bool,
    pub max_depth: u32,
}

/// Where a relying party can check whether a token was revoked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
}

impl Revocation {
    pub fn endpoint(uri: impl Into<String>) -> Self {
        Self {
            kind: "endpoint".to_string(),
            uri: uri.into(),
        }
    }
}

/// An ACP capability token.
///
/// Field names on the wire are the short ACP-CT-1.0 keys. `sig` is absent
/// until the token is signed and never covered by its own signature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapabilityToken {
    #[serde(rename = "ver")]
    pub version: String,
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "sub")]
    pub subject: String,
    #[serde(rename = "cap")]
    pub capabilities: Vec<String>,
    #[serde(rename = "res")]
    pub resource: String,
    #[serde(rename = "iat")]
    pub issued_at: Timestamp,
    #[serde(rename = "exp")]
    pub expires_at: Timestamp,
    pub nonce: String,
    #[serde(rename = "deleg")]
    pub delegation: Delegation,
    /// Hash of the parent token for delegated tokens, `null` for roots.
    #[serde(default)]
    pub parent_hash: Option<String>,
    #[serde(default)]
    pub constraints: Map<String, Value>,
    #[serde(rename = "rev", default, skip_serializing_if = "Option::is_none")]
    pub revocation: Option<Revocation>,
    #[serde(rename = "sig", default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl CapabilityToken {
    /// The token as a JSON mapping, `sig` included when present.
    pub fn to_payload(&self) -> Result<Map<String, Value>, AcpError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(AcpError::Serialization("token is not a JSON object".into())),
            Err(e) => Err(AcpError::Serialization(e.to_string())),
        }
    }

    pub fn from_payload(payload: Map<String, Value>) -> Result<Self, TokenError> {
        serde_json::from_value(Value::Object(payload))
            .map_err(|e| TokenError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, AcpError> {
        serde_json::to_string(self).map_err(|e| AcpError::Serialization(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, TokenError> {
        serde_json::from_str(raw).map_err(|e| TokenError::Malformed(e.to_string()))
    }

    /// Sign with the issuer identity, replacing any existing signature.
    pub fn sign(mut self, issuer: &AgentIdentity) -> Result<Self, AcpError> {
        self.signature = None;
        let payload = self.to_payload()?;
        self.signature = Some(signer::signature_over(&payload, issuer));
        Ok(self)
    }

    /// Check the signature against the issuer's public key.
    ///
    /// Re-serializes the typed token. For tokens received over the wire use
    /// [`verify_token_json`](crate::verify_token_json) on the original text,
    /// which also covers fields this struct does not model.
    pub fn verify_signature(&self, issuer_public_key: &[u8]) -> bool {
        match self.to_payload() {
            Ok(payload) => signer::verify_token_signature(&payload, issuer_public_key),
            Err(_) => false,
        }
    }

    /// Value for a delegated child's `parent_hash`.
    pub fn hash(&self) -> Result<String, AcpError> {
        Ok(signer::compute_token_hash(&self.to_payload()?))
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    pub fn is_root(&self) -> bool {
        self.parent_hash.is_none()
    }
}

/// 128-bit random token nonce, base64url without padding.
pub fn generate_nonce() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    b64url::encode(bytes)
}

/// Builder for issuing capability tokens.
pub struct TokenBuilder {
    subject: String,
    resource: String,
    capabilities: Vec<String>,
    ttl: i64,
    issued_at: Option<Timestamp>,
    nonce: Option<String>,
    delegation: Delegation,
    parent: Option<CapabilityToken>,
    parent_hash: Option<String>,
    constraints: Map<String, Value>,
    revocation: Option<Revocation>,
}

impl TokenBuilder {
    pub fn new(subject: &AgentId, resource: impl Into<String>) -> Self {
        Self {
            subject: subject.to_string(),
            resource: resource.into(),
            capabilities: Vec::new(),
            ttl: DEFAULT_TTL_SECS,
            issued_at: None,
            nonce: None,
            delegation: Delegation::default(),
            parent: None,
            parent_hash: None,
            constraints: Map::new(),
            revocation: None,
        }
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn ttl(mut self, seconds: i64) -> Self {
        self.ttl = seconds;
        self
    }

    pub fn issued_at(mut self, ts: Timestamp) -> Self {
        self.issued_at = Some(ts);
        self
    }

    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn delegation(mut self, allowed: bool, max_depth: u32) -> Self {
        self.delegation = Delegation { allowed, max_depth };
        self
    }

    /// Link to a parent token; its hash becomes `parent_hash` at build time.
    pub fn delegated_from(mut self, parent: &CapabilityToken) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Link to a parent by a precomputed hash.
    pub fn parent_hash(mut self, hash: impl Into<String>) -> Self {
        self.parent_hash = Some(hash.into());
        self
    }

    pub fn constraint(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.insert(key.into(), value.into());
        self
    }

    pub fn revocation(mut self, revocation: Revocation) -> Self {
        self.revocation = Some(revocation);
        self
    }

    /// Produce the unsigned token.
    pub fn build(self, issuer: &AgentId) -> Result<CapabilityToken, AcpError> {
        let issued_at = self
            .issued_at
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        let parent_hash = match &self.parent {
            Some(parent) => Some(parent.hash()?),
            None => self.parent_hash,
        };
        let expires_at = issued_at
            .checked_add(self.ttl)
            .ok_or_else(|| AcpError::Serialization(format!("ttl {} overflows exp", self.ttl)))?;
        Ok(CapabilityToken {
            version: PROTOCOL_VERSION.to_string(),
            issuer: issuer.to_string(),
            subject: self.subject,
            capabilities: self.capabilities,
            resource: self.resource,
            issued_at,
            expires_at,
            nonce: self.nonce.unwrap_or_else(generate_nonce),
            delegation: self.delegation,
            parent_hash,
            constraints: self.constraints,
            revocation: self.revocation,
            signature: None,
        })
    }

    /// Build and sign with the issuer identity.
    pub fn sign(self, issuer: &AgentIdentity) -> Result<CapabilityToken, AcpError> {
        self.build(issuer.agent_id())?.sign(issuer)
    }
}
