use std::fmt;

use acp_types::AgentId;

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CHALLENGE: &str = "X-ACP-Challenge";
pub const HEADER_SIGNATURE: &str = "X-ACP-Signature";
pub const HEADER_AGENT_ID: &str = "X-ACP-Agent-ID";

/// Prefix of the `Authorization` value; the raw token JSON follows it.
pub const BEARER_PREFIX: &str = "Bearer ";

/// The four ACP headers attached to a bound action request.
#[derive(Clone, PartialEq, Eq)]
pub struct PopHeaders {
    pub authorization: String,
    pub challenge: String,
    pub signature: String,
    pub agent_id: String,
}

impl PopHeaders {
    pub fn assemble(token: &str, challenge: &str, signature: &str, agent_id: &AgentId) -> Self {
        Self {
            authorization: format!("{BEARER_PREFIX}{token}"),
            challenge: challenge.to_string(),
            signature: signature.to_string(),
            agent_id: agent_id.to_string(),
        }
    }

    /// Raw capability token carried in `Authorization`.
    pub fn token(&self) -> Option<&str> {
        self.authorization.strip_prefix(BEARER_PREFIX)
    }

    /// `(name, value)` pairs in a fixed order, ready for any HTTP client.
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            (HEADER_AUTHORIZATION, self.authorization.as_str()),
            (HEADER_CHALLENGE, self.challenge.as_str()),
            (HEADER_SIGNATURE, self.signature.as_str()),
            (HEADER_AGENT_ID, self.agent_id.as_str()),
        ]
    }

    /// Collect the headers from a request through a name lookup.
    ///
    /// `None` if any header is missing or empty, or `Authorization` is not a
    /// bearer value. Lookups are made with the canonical names above; case
    /// folding is up to `get`.
    pub fn parse<'a, F>(get: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let field = |name: &str| get(name).filter(|v| !v.is_empty()).map(str::to_string);
        let headers = Self {
            authorization: field(HEADER_AUTHORIZATION)?,
            challenge: field(HEADER_CHALLENGE)?,
            signature: field(HEADER_SIGNATURE)?,
            agent_id: field(HEADER_AGENT_ID)?,
        };
        match headers.token() {
            Some(token) if !token.is_empty() => Some(headers),
            _ => None,
        }
    }
}

// Token and signature stay out of logs.
impl fmt::Debug for PopHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopHeaders")
            .field("challenge", &self.challenge)
            .field("agent_id", &self.agent_id)
            .finish_non_exhaustive()
    }
}
