mod challenge;
mod headers;
mod pop;
mod state;

pub use challenge::{ChallengeResponse, CHALLENGE_PATH, CHALLENGE_TTL_SECS};
pub use headers::{
    PopHeaders, BEARER_PREFIX, HEADER_AGENT_ID, HEADER_AUTHORIZATION, HEADER_CHALLENGE,
    HEADER_SIGNATURE,
};
pub use pop::{
    binding_payload, body_hash_b64, normalize_method, normalize_path, sign_pop, verify_pop,
};
pub use state::{Handshake, HandshakeState, PreparedRequest};
