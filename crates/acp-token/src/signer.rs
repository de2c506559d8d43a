//! ACP-SIGN-1.0 over token mappings:
//! `sig = base64url(Ed25519(sk, SHA-256(canonical(token - sig))))`.

use acp_identity::{verify_signature, AgentIdentity};
use acp_types::b64url;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::canonical::canonicalize;

/// Name of the signature field, excluded from the signed bytes.
pub const SIG_FIELD: &str = "sig";

/// Sign a token payload, returning a new mapping with `sig` set.
///
/// Any `sig` already present in `payload` is discarded first. The input is
/// left untouched.
pub fn sign_token(payload: &Map<String, Value>, identity: &AgentIdentity) -> Map<String, Value> {
    let mut token = without_sig(payload);
    let sig = signature_over(&token, identity);
    token.insert(SIG_FIELD.to_string(), Value::String(sig));
    token
}

/// Verify a token's `sig` against the issuer's raw public key.
///
/// Total: a missing or non-string `sig`, bad base64url, a malformed key,
/// the wrong key and a tampered payload all yield `false`, with no
/// indication of which.
pub fn verify_token_signature(token: &Map<String, Value>, issuer_public_key: &[u8]) -> bool {
    let Some(Value::String(sig)) = token.get(SIG_FIELD) else {
        return false;
    };
    let Ok(sig_bytes) = b64url::decode(sig) else {
        return false;
    };
    let canonical = canonicalize(&without_sig(token));
    verify_signature(issuer_public_key, &canonical, &sig_bytes)
}

/// Verify a raw JSON token text. Unparseable input is `false`.
pub fn verify_token_json(raw: &str, issuer_public_key: &[u8]) -> bool {
    match serde_json::from_str::<Map<String, Value>>(raw) {
        Ok(token) => verify_token_signature(&token, issuer_public_key),
        Err(_) => false,
    }
}

/// `base64url(SHA-256(canonical(token - sig)))`, the delegation link value.
pub fn compute_token_hash(token: &Map<String, Value>) -> String {
    let digest = Sha256::digest(canonicalize(&without_sig(token)));
    b64url::encode(digest)
}

/// Signature over a payload that must not carry `sig`.
pub(crate) fn signature_over(payload: &Map<String, Value>, identity: &AgentIdentity) -> String {
    b64url::encode(identity.sign(&canonicalize(payload)))
}

fn without_sig(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(k, _)| k.as_str() != SIG_FIELD)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
