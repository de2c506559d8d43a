use acp_types::AcpError;
use serde::{Deserialize, Serialize};

/// Challenge endpoint, relative to the server base URL.
pub const CHALLENGE_PATH: &str = "/acp/v1/challenge";

/// Server-side validity window of an issued challenge, in seconds.
/// Informational here: expiry and single use are enforced by the server.
pub const CHALLENGE_TTL_SECS: i64 = 30;

/// Body of `GET /acp/v1/challenge`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub challenge: String,
    /// Human-readable lifetime some servers add (`"30s"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
}

impl ChallengeResponse {
    pub fn new(challenge: impl Into<String>) -> Self {
        Self {
            challenge: challenge.into(),
            expires_in: None,
        }
    }

    /// Take the challenge value, rejecting one that cannot be bound or sent
    /// as a header: empty, containing `|`, or outside printable ASCII.
    pub fn into_challenge(self) -> Result<String, AcpError> {
        if !is_usable_challenge(&self.challenge) {
            return Err(AcpError::ChallengeRequestFailed(
                "server returned an unusable challenge".into(),
            ));
        }
        Ok(self.challenge)
    }
}

/// Binding components other than the path must be non-empty printable ASCII
/// without `|`, so a binding string splits back into exactly one tuple.
fn is_binding_token(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_graphic() && b != b'|')
}

pub(crate) fn is_usable_challenge(challenge: &str) -> bool {
    is_binding_token(challenge)
}

pub(crate) fn is_usable_method(method: &str) -> bool {
    is_binding_token(method)
}
