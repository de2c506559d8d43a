//! Cross-implementation vectors. Values were produced by an independent
//! ACP-SIGN-1.0 implementation from the all-zero seed.

use acp_identity::AgentIdentity;
use acp_token::{canonicalize, compute_token_hash, sign_token, verify_token_signature};
use serde_json::{json, Map, Value};

const ZERO_SEED_AGENT_ID: &str = "2KagShR4Usj2uARXJeDw7XJEKvQ3XDr84dC47hUB3Uyd";

const CANONICAL: &str = r#"{"cap":["acp:cap:read"],"deleg":{"allowed":false,"max_depth":0},"exp":1700003600,"iat":1700000000,"iss":"a","nonce":"n","parent_hash":null,"res":"org.example/x","sub":"b","ver":"1.0"}"#;

const TOKEN_HASH: &str = "O0KFcm60YIrwYlSc30AYOMWT7KKL8D5OvRxdGYen3yI";

const TOKEN_SIG: &str =
    "NEAb_CZnoMDmegWnoqbuGCbNYUfepVdaAGVkGCwIHwc5eleXgEKTyxByVCN1L19Lu314wbZ0UNArKSbh2QJdAA";

fn zero_identity() -> AgentIdentity {
    AgentIdentity::from_seed(&[0u8; 32]).unwrap()
}

fn vector_payload() -> Map<String, Value> {
    json!({
        "ver": "1.0",
        "iss": "a",
        "sub": "b",
        "cap": ["acp:cap:read"],
        "res": "org.example/x",
        "iat": 1_700_000_000,
        "exp": 1_700_003_600,
        "nonce": "n",
        "deleg": {"allowed": false, "max_depth": 0},
        "parent_hash": null,
    })
    .as_object()
    .cloned()
    .unwrap()
}

#[test]
fn zero_seed_agent_id() {
    assert_eq!(zero_identity().agent_id().as_str(), ZERO_SEED_AGENT_ID);
}

#[test]
fn canonical_form_matches() {
    assert_eq!(
        String::from_utf8(canonicalize(&vector_payload())).unwrap(),
        CANONICAL
    );
}

#[test]
fn token_hash_matches() {
    assert_eq!(compute_token_hash(&vector_payload()), TOKEN_HASH);
}

#[test]
fn signature_matches() {
    let signed = sign_token(&vector_payload(), &zero_identity());
    assert_eq!(signed["sig"], json!(TOKEN_SIG));
}

#[test]
fn foreign_signature_verifies() {
    let mut token = vector_payload();
    token.insert("sig".into(), json!(TOKEN_SIG));
    let pk = zero_identity().public_key_bytes();
    assert!(verify_token_signature(&token, &pk));
    assert_eq!(
        hex::encode(pk),
        "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29"
    );
}
