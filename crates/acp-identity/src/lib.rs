mod keypair;
mod keystore;
mod seed;

pub use acp_types::{derive_agent_id, validate_agent_id, AgentId};
pub use keypair::{verify_signature, AgentIdentity};
pub use keystore::{KeyStore, MemoryKeyStore};
