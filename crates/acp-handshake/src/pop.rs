//! Request binding for ACP-HP-1.0:
//! `METHOD|path|challenge|base64url(SHA-256(body))`, signed with ACP-SIGN-1.0.

use acp_identity::{verify_signature, AgentIdentity};
use acp_types::{b64url, AcpError};
use sha2::{Digest, Sha256};

use crate::challenge::{is_usable_challenge, is_usable_method};

/// Upper-cased HTTP method.
pub fn normalize_method(method: &str) -> String {
    method.to_ascii_uppercase()
}

/// Path with exactly the caller's text, prefixed by `/` if missing.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// `base64url(SHA-256(body))`. An absent body hashes as the empty string.
pub fn body_hash_b64(body: &[u8]) -> String {
    b64url::encode(Sha256::digest(body))
}

/// The exact string a PoP signature covers.
pub fn binding_payload(method: &str, path: &str, challenge: &str, body: &[u8]) -> String {
    format!(
        "{}|{}|{}|{}",
        normalize_method(method),
        normalize_path(path),
        challenge,
        body_hash_b64(body)
    )
}

/// Sign the binding string, returning the base64url `X-ACP-Signature` value.
///
/// Method and challenge must be free of `|` so the binding string splits
/// back into one unique tuple; the path may contain anything.
pub fn sign_pop(
    identity: &AgentIdentity,
    method: &str,
    path: &str,
    challenge: &str,
    body: &[u8],
) -> Result<String, AcpError> {
    if !is_usable_method(method) {
        return Err(AcpError::Handshake(format!("invalid method {method:?}")));
    }
    if !is_usable_challenge(challenge) {
        return Err(AcpError::Handshake("invalid challenge".into()));
    }
    let payload = binding_payload(method, path, challenge, body);
    Ok(b64url::encode(identity.sign(payload.as_bytes())))
}

/// Relying-party check of a PoP signature.
///
/// Total like token verification: a method or challenge [`sign_pop`] would
/// refuse, an undecodable signature, a malformed key or a mismatched binding
/// all yield `false`. Consuming the
/// challenge (single use, expiry) is the caller's job and must happen before
/// trusting a `true`.
pub fn verify_pop(
    public_key: &[u8],
    method: &str,
    path: &str,
    challenge: &str,
    body: &[u8],
    signature: &str,
) -> bool {
    if !is_usable_method(method) || !is_usable_challenge(challenge) {
        return false;
    }
    let Ok(sig) = b64url::decode(signature) else {
        return false;
    };
    let payload = binding_payload(method, path, challenge, body);
    verify_signature(public_key, payload.as_bytes(), &sig)
}
