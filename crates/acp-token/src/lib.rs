mod canonical;
mod claims;
mod signer;
mod token;

pub use canonical::{canonical_json, canonicalize};
pub use claims::{
    check_claims, resource_covered, verify_token, verify_token_with_store, AccessRequest,
    CLOCK_SKEW_SECS,
};
pub use signer::{
    compute_token_hash, sign_token, verify_token_json, verify_token_signature, SIG_FIELD,
};
pub use token::{
    generate_nonce, CapabilityToken, Delegation, Revocation, TokenBuilder, DEFAULT_TTL_SECS,
    MAX_DELEGATION_DEPTH, PROTOCOL_VERSION,
};
