//! Agent-side ACP client.
//!
//! Every call runs one full handshake: fetch a fresh challenge, sign the
//! request binding, attach the ACP headers and send. Nothing is retried.

mod client;
mod config;

pub use client::AcpClient;
pub use config::ClientConfig;

pub use acp_handshake::{HandshakeState, PopHeaders};
pub use acp_identity::{AgentId, AgentIdentity};
pub use acp_token::{CapabilityToken, TokenBuilder};
pub use acp_types::AcpError;
