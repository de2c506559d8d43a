use std::sync::Arc;

use acp_handshake::{normalize_method, ChallengeResponse, Handshake, PopHeaders};
use acp_identity::{AgentId, AgentIdentity};
use acp_token::canonical_json;
use acp_types::AcpError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;

/// The programmatic interface agents use to call ACP-protected endpoints.
///
/// Cheap to clone; clones share the identity and the connection pool.
#[derive(Clone)]
pub struct AcpClient {
    identity: Arc<AgentIdentity>,
    config: ClientConfig,
    http: reqwest::Client,
}

impl AcpClient {
    pub fn new(identity: AgentIdentity, config: ClientConfig) -> Result<Self, AcpError> {
        Self::with_shared_identity(Arc::new(identity), config)
    }

    /// Build a client over an identity other clients may also use.
    pub fn with_shared_identity(
        identity: Arc<AgentIdentity>,
        config: ClientConfig,
    ) -> Result<Self, AcpError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AcpError::Transport(e.to_string()))?;
        Ok(Self {
            identity,
            config,
            http,
        })
    }

    pub fn agent_id(&self) -> &AgentId {
        self.identity.agent_id()
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute an action under a capability token.
    ///
    /// `payload` is sent as canonical JSON so the server hashes the same
    /// bytes that were signed; `None` sends no body.
    pub async fn execute(
        &self,
        method: &str,
        path: &str,
        token: &str,
        payload: Option<&Value>,
    ) -> Result<Response, AcpError> {
        let body = payload
            .map(|p| canonical_json(p).into_bytes())
            .unwrap_or_default();
        self.run(method, path, token, body, true).await
    }

    /// Like [`execute`](Self::execute) with the body bytes given verbatim.
    pub async fn execute_raw(
        &self,
        method: &str,
        path: &str,
        token: &str,
        body: Vec<u8>,
    ) -> Result<Response, AcpError> {
        self.run(method, path, token, body, false).await
    }

    /// Fetch one challenge. Any transport error or non-success status is
    /// `ChallengeRequestFailed`.
    pub async fn request_challenge(&self) -> Result<ChallengeResponse, AcpError> {
        self.fetch_challenge()
            .await
            .map_err(AcpError::ChallengeRequestFailed)
    }

    async fn fetch_challenge(&self) -> Result<ChallengeResponse, String> {
        let url = self.config.url(&self.config.challenge_path);
        let resp = self.http.get(&url).send().await.map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("challenge endpoint returned {status}"));
        }
        resp.json::<ChallengeResponse>()
            .await
            .map_err(|e| e.to_string())
    }

    async fn run(
        &self,
        method: &str,
        path: &str,
        token: &str,
        body: Vec<u8>,
        json: bool,
    ) -> Result<Response, AcpError> {
        let method = Method::from_bytes(normalize_method(method).as_bytes())
            .map_err(|_| AcpError::Handshake(format!("invalid method {method:?}")))?;

        let mut handshake = Handshake::new(&self.identity);
        handshake.begin()?;
        let challenge = match self.fetch_challenge().await {
            Ok(c) => c,
            Err(reason) => {
                warn!(agent = %self.agent_id(), %reason, "challenge request failed");
                return Err(handshake.challenge_failed(reason));
            }
        };
        handshake.receive(challenge)?;
        handshake.sign(method.as_str(), path, &body)?;
        let prepared = handshake.assemble(token)?;

        let mut headers = match header_map(&prepared.headers) {
            Ok(h) => h,
            Err(e) => {
                handshake.fail();
                return Err(e);
            }
        };
        if json && !body.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut request = self
            .http
            .request(method.clone(), self.config.url(&prepared.path))
            .headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }

        debug!(agent = %self.agent_id(), %method, path = %prepared.path, "sending bound request");
        match request.send().await {
            Ok(resp) => {
                handshake.mark_sent()?;
                info!(
                    agent = %self.agent_id(),
                    %method,
                    path = %prepared.path,
                    status = %resp.status(),
                    "action request sent"
                );
                Ok(resp)
            }
            Err(e) => {
                handshake.fail();
                warn!(agent = %self.agent_id(), %method, path = %prepared.path, error = %e, "action request failed");
                Err(AcpError::Transport(e.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for AcpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcpClient")
            .field("agent_id", self.agent_id())
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// Header values must be visible ASCII; a token with raw non-ASCII text
/// cannot travel in `Authorization`.
fn header_map(pop: &PopHeaders) -> Result<HeaderMap, AcpError> {
    let mut map = HeaderMap::with_capacity(5);
    for (name, value) in pop.pairs() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AcpError::Handshake(e.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| AcpError::Handshake(format!("{name} value is not a valid header")))?;
        map.insert(name, value);
    }
    Ok(map)
}
