use std::fmt;

use acp_identity::AgentIdentity;
use acp_types::AcpError;
use tracing::debug;

use crate::challenge::ChallengeResponse;
use crate::headers::PopHeaders;
use crate::pop::{normalize_method, normalize_path, sign_pop};

/// Progress of one handshake attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeState {
    Idle,
    ChallengeRequested,
    ChallengeReceived,
    SignatureComputed,
    RequestAssembled,
    Sent,
    Failed,
}

impl HandshakeState {
    /// Successor on the success path, `None` once terminal.
    pub fn next(self) -> Option<Self> {
        use HandshakeState::*;
        match self {
            Idle => Some(ChallengeRequested),
            ChallengeRequested => Some(ChallengeReceived),
            ChallengeReceived => Some(SignatureComputed),
            SignatureComputed => Some(RequestAssembled),
            RequestAssembled => Some(Sent),
            Sent | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }

    /// Checked transition: only the success successor, or `Failed` from any
    /// non-terminal state.
    pub fn advance(self, to: Self) -> Result<Self, AcpError> {
        let allowed = match to {
            Self::Failed => !self.is_terminal(),
            _ => self.next() == Some(to),
        };
        if allowed {
            Ok(to)
        } else {
            Err(AcpError::Handshake(format!("invalid transition {self} -> {to}")))
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ChallengeRequested => "challenge_requested",
            Self::ChallengeReceived => "challenge_received",
            Self::SignatureComputed => "signature_computed",
            Self::RequestAssembled => "request_assembled",
            Self::Sent => "sent",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Method, path and headers of an action request ready for the transport.
/// The body stays with the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: String,
    pub path: String,
    pub headers: PopHeaders,
}

/// One handshake attempt over a shared identity.
///
/// The transport drives it: [`begin`](Self::begin) before fetching the
/// challenge, [`receive`](Self::receive) with the response, then
/// [`sign`](Self::sign), [`assemble`](Self::assemble) and
/// [`mark_sent`](Self::mark_sent). Any error leaves the attempt `Failed`;
/// a new attempt needs a new `Handshake` and a fresh challenge.
pub struct Handshake<'a> {
    identity: &'a AgentIdentity,
    state: HandshakeState,
    challenge: Option<String>,
    signed: Option<(String, String, String)>,
}

impl<'a> Handshake<'a> {
    pub fn new(identity: &'a AgentIdentity) -> Self {
        Self {
            identity,
            state: HandshakeState::Idle,
            challenge: None,
            signed: None,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn begin(&mut self) -> Result<(), AcpError> {
        self.transition(HandshakeState::ChallengeRequested)
    }

    /// Record a failed challenge fetch, returning the error to propagate.
    pub fn challenge_failed(&mut self, reason: impl Into<String>) -> AcpError {
        self.fail();
        AcpError::ChallengeRequestFailed(reason.into())
    }

    pub fn receive(&mut self, response: ChallengeResponse) -> Result<(), AcpError> {
        self.require(HandshakeState::ChallengeRequested)?;
        let challenge = match response.into_challenge() {
            Ok(c) => c,
            Err(e) => {
                self.fail();
                return Err(e);
            }
        };
        self.challenge = Some(challenge);
        self.transition(HandshakeState::ChallengeReceived)
    }

    pub fn sign(&mut self, method: &str, path: &str, body: &[u8]) -> Result<(), AcpError> {
        self.require(HandshakeState::ChallengeReceived)?;
        let Some(challenge) = self.challenge.as_deref() else {
            self.fail();
            return Err(AcpError::Handshake("no challenge recorded".into()));
        };
        let signature = match sign_pop(self.identity, method, path, challenge, body) {
            Ok(sig) => sig,
            Err(e) => {
                self.fail();
                return Err(e);
            }
        };
        self.signed = Some((normalize_method(method), normalize_path(path), signature));
        self.transition(HandshakeState::SignatureComputed)
    }

    pub fn assemble(&mut self, token: &str) -> Result<PreparedRequest, AcpError> {
        self.require(HandshakeState::SignatureComputed)?;
        let (Some(challenge), Some((method, path, signature))) =
            (self.challenge.take(), self.signed.take())
        else {
            self.fail();
            return Err(AcpError::Handshake("no signature recorded".into()));
        };
        let headers = PopHeaders::assemble(token, &challenge, &signature, self.identity.agent_id());
        self.transition(HandshakeState::RequestAssembled)?;
        Ok(PreparedRequest {
            method,
            path,
            headers,
        })
    }

    pub fn mark_sent(&mut self) -> Result<(), AcpError> {
        self.transition(HandshakeState::Sent)
    }

    /// Move to `Failed` unless already terminal.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            debug!(from = %self.state, to = %HandshakeState::Failed, "handshake transition");
            self.state = HandshakeState::Failed;
        }
        self.challenge = None;
        self.signed = None;
    }

    fn require(&mut self, state: HandshakeState) -> Result<(), AcpError> {
        if self.state == state {
            return Ok(());
        }
        let err = AcpError::Handshake(format!("expected state {state}, found {}", self.state));
        self.fail();
        Err(err)
    }

    fn transition(&mut self, to: HandshakeState) -> Result<(), AcpError> {
        match self.state.advance(to) {
            Ok(next) => {
                debug!(from = %self.state, to = %next, "handshake transition");
                self.state = next;
                Ok(())
            }
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }
}
