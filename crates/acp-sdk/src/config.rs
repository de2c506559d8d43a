use std::time::Duration;

use acp_handshake::CHALLENGE_PATH;
use tracing::warn;

pub const ENV_BASE_URL: &str = "ACP_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "ACP_TIMEOUT_SECS";

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Server base URL, without a trailing slash.
    pub base_url: String,
    /// Timeout applied to the challenge fetch and to the action request.
    pub timeout: Duration,
    /// Path of the challenge endpoint.
    pub challenge_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
            challenge_path: CHALLENGE_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Defaults overridden by `ACP_BASE_URL` and `ACP_TIMEOUT_SECS`.
    /// An unparseable timeout is ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match get(ENV_BASE_URL) {
            Some(url) if !url.is_empty() => Self::new(url),
            _ => Self::default(),
        };
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "ignoring invalid ACP_TIMEOUT_SECS"),
            }
        }
        config
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.challenge_path, "/acp/v1/challenge");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.url("/x"), "http://localhost:8080/x");
    }

    #[test]
    fn env_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://bank.example/"),
            (ENV_TIMEOUT_SECS, "5"),
        ]));
        assert_eq!(config.base_url, "https://bank.example");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.url("/acp/v1/challenge"), "https://bank.example/acp/v1/challenge");
    }

    #[test]
    fn invalid_timeout_ignored() {
        for raw in ["soon", "0", "-3"] {
            let config = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, raw)]));
            assert_eq!(config.timeout, Duration::from_secs(30));
        }
        assert_eq!(ClientConfig::from_lookup(lookup(&[])).base_url, "http://localhost:8080");
    }
}
