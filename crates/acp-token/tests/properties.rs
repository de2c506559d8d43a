//! Property-based tests for canonicalization and token signatures

use acp_identity::AgentIdentity;
use acp_token::{canonicalize, compute_token_hash, sign_token, verify_token_signature};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

fn issuer() -> &'static AgentIdentity {
    static ISSUER: OnceLock<AgentIdentity> = OnceLock::new();
    ISSUER.get_or_init(|| AgentIdentity::from_seed(&[3u8; 32]).unwrap())
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::from),
    ]
}

fn payload() -> impl Strategy<Value = Map<String, Value>> {
    (
        "[a-z0-9./:-]{1,24}",
        prop::collection::vec("[a-z.:]{1,16}", 1..4),
        any::<i64>(),
        "[A-Za-z0-9_-]{22}",
        prop::collection::btree_map("[a-z_]{1,8}", leaf(), 0..4),
    )
        .prop_map(|(res, cap, iat, nonce, constraints)| {
            let constraints: Map<String, Value> = constraints.into_iter().collect();
            json!({
                "ver": "1.0",
                "iss": issuer().agent_id().as_str(),
                "sub": "8v4Rn3hUS14TBCwEDJ6Yo1p4zNoPYnitK113oUGGhRNr",
                "cap": cap,
                "res": res,
                "iat": iat,
                "exp": iat.saturating_add(3600),
                "nonce": nonce,
                "deleg": {"allowed": false, "max_depth": 0},
                "parent_hash": null,
                "constraints": constraints,
            })
            .as_object()
            .cloned()
            .unwrap()
        })
}

proptest! {
    /// Canonical bytes do not depend on insertion order
    #[test]
    fn canonical_order_independent(entries in prop::collection::vec(("\\PC{0,6}", leaf()), 0..8)) {
        let forward: Map<String, Value> = entries.iter().cloned().collect();
        let mut reversed = Map::new();
        for (k, _) in entries.iter().rev() {
            if !reversed.contains_key(k) {
                reversed.insert(k.clone(), forward[k].clone());
            }
        }
        prop_assert_eq!(canonicalize(&forward), canonicalize(&reversed));
    }

    /// Canonical bytes parse back to the same mapping
    #[test]
    fn canonical_is_valid_json(map in payload()) {
        let bytes = canonicalize(&map);
        let parsed: Map<String, Value> = serde_json::from_slice(&bytes).unwrap();
        prop_assert_eq!(parsed, map);
    }

    /// Sign/verify roundtrip always works
    #[test]
    fn sign_verify_roundtrip(map in payload()) {
        let token = sign_token(&map, issuer());
        prop_assert!(verify_token_signature(&token, &issuer().public_key_bytes()));
    }

    /// Flipping one byte of a signed string field breaks verification
    #[test]
    fn byte_flip_detected(map in payload(), field in prop::sample::select(vec!["res", "nonce", "iss", "sub", "ver"]), pos in any::<prop::sample::Index>()) {
        let token = sign_token(&map, issuer());
        let original = token[field].as_str().unwrap().to_string();
        let mut bytes = original.into_bytes();
        let i = pos.index(bytes.len());
        // Stay in ASCII so the result is still a valid string.
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let mut tampered = token.clone();
        tampered.insert(field.to_string(), Value::String(String::from_utf8(bytes).unwrap()));
        prop_assume!(tampered != token);
        prop_assert!(!verify_token_signature(&tampered, &issuer().public_key_bytes()));
    }

    /// Token hash is stable and tracks every non-sig field
    #[test]
    fn token_hash_tracks_content(map in payload(), delta in 1i64..1000) {
        let signed = sign_token(&map, issuer());
        prop_assert_eq!(compute_token_hash(&map), compute_token_hash(&signed));

        let mut changed = map.clone();
        let iat = changed["iat"].as_i64().unwrap();
        changed.insert("iat".into(), Value::from(iat.wrapping_add(delta)));
        prop_assert_ne!(compute_token_hash(&changed), compute_token_hash(&map));
    }
}
