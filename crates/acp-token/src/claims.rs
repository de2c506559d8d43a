//! Single-token admission checks (ACP-CT-1.0 verification order).
//!
//! Covers one token in isolation. Delegation chains, revocation lookups and
//! nonce replay tracking belong to the relying party's own services.

use acp_identity::KeyStore;
use acp_types::{validate_agent_id, Timestamp, TokenError};
use serde_json::{Map, Value};
use tracing::debug;

use crate::signer::verify_token_signature;
use crate::token::{CapabilityToken, MAX_DELEGATION_DEPTH, PROTOCOL_VERSION};

/// Tolerated clock drift for `iat`, in seconds.
pub const CLOCK_SKEW_SECS: i64 = 300;

/// What the caller wants to do with the token. Unset fields are not checked.
#[derive(Clone, Debug, Default)]
pub struct AccessRequest {
    pub capability: Option<String>,
    pub resource: Option<String>,
}

impl AccessRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

/// `true` if `requested` equals `granted` or lies beneath it as a path
/// (`org.example/accounts` covers `org.example/accounts/ACC-001`).
pub fn resource_covered(granted: &str, requested: &str) -> bool {
    match requested.strip_prefix(granted) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

/// Check every claim of an already signature-verified token.
pub fn check_claims(
    token: &CapabilityToken,
    request: &AccessRequest,
    now: Timestamp,
) -> Result<(), TokenError> {
    if token.version != PROTOCOL_VERSION {
        return Err(TokenError::UnsupportedVersion);
    }
    if !validate_agent_id(&token.issuer) {
        return Err(TokenError::MalformedAgentId("iss"));
    }
    if !validate_agent_id(&token.subject) {
        return Err(TokenError::MalformedAgentId("sub"));
    }
    if token.expires_at == 0 || now > token.expires_at {
        return Err(TokenError::Expired);
    }
    if token.issued_at == 0 || now < token.issued_at.saturating_sub(CLOCK_SKEW_SECS) {
        return Err(TokenError::NotYetValid);
    }
    if token.capabilities.is_empty() {
        return Err(TokenError::EmptyCapabilities);
    }
    if let Some(capability) = &request.capability {
        if !token.has_capability(capability) {
            return Err(TokenError::CapabilityNotPresent(capability.clone()));
        }
    }
    if let Some(resource) = &request.resource {
        if !resource_covered(&token.resource, resource) {
            return Err(TokenError::ResourceNotCovered(resource.clone()));
        }
    }
    if token.delegation.max_depth > MAX_DELEGATION_DEPTH {
        return Err(TokenError::MaxDepthExceeded(token.delegation.max_depth));
    }
    if !token.delegation.allowed && token.delegation.max_depth != 0 {
        return Err(TokenError::DelegationNotAllowed);
    }
    Ok(())
}

/// Parse, verify the signature and check claims of a raw JSON token.
///
/// The signature is checked over the received mapping before the typed
/// token is built, so unknown fields stay covered.
pub fn verify_token(
    raw: &str,
    issuer_public_key: &[u8],
    request: &AccessRequest,
    now: Timestamp,
) -> Result<CapabilityToken, TokenError> {
    let payload = parse_payload(raw)?;
    admit(payload, issuer_public_key, request, now)
}

/// Like [`verify_token`], resolving the issuer key from `iss` in a key store.
///
/// An unknown issuer is reported as an invalid signature.
pub fn verify_token_with_store(
    raw: &str,
    keys: &dyn KeyStore,
    request: &AccessRequest,
    now: Timestamp,
) -> Result<CapabilityToken, TokenError> {
    let payload = parse_payload(raw)?;
    let issuer_key = payload
        .get("iss")
        .and_then(Value::as_str)
        .and_then(|iss| keys.public_key(iss));
    match issuer_key {
        Some(key) => admit(payload, &key, request, now),
        None => reject(TokenError::InvalidSignature),
    }
}

fn parse_payload(raw: &str) -> Result<Map<String, Value>, TokenError> {
    serde_json::from_str(raw).map_err(|e| TokenError::Malformed(e.to_string()))
}

fn admit(
    payload: Map<String, Value>,
    issuer_public_key: &[u8],
    request: &AccessRequest,
    now: Timestamp,
) -> Result<CapabilityToken, TokenError> {
    if payload.get("ver").and_then(Value::as_str) != Some(PROTOCOL_VERSION) {
        return reject(TokenError::UnsupportedVersion);
    }
    if !verify_token_signature(&payload, issuer_public_key) {
        return reject(TokenError::InvalidSignature);
    }
    let token = match CapabilityToken::from_payload(payload) {
        Ok(token) => token,
        Err(e) => return reject(e),
    };
    if let Err(e) = check_claims(&token, request, now) {
        return reject(e);
    }
    Ok(token)
}

fn reject<T>(err: TokenError) -> Result<T, TokenError> {
    debug!(code = err.code(), "capability token rejected");
    Err(err)
}
