//! Token codec tests
//!
//! Signing, verification and expiry of tracking tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use linktrkr::token::{self, OwnerId, TokenCodec, TokenError, TrackingClaim};
use linktrkr::utils::is_valid_url;

const SECRET: &[u8] = b"integration-test-secret";

fn claim() -> TrackingClaim {
    TrackingClaim::new("https://dest.example/page", 777_001i64)
}

// =============================================================================
// URL Validation
// =============================================================================

#[test]
fn test_url_validator_examples() {
    assert!(is_valid_url("https://example.com"));
    assert!(is_valid_url("http://a"));
    assert!(!is_valid_url("ftp://x.com"));
    assert!(!is_valid_url("not a url"));
    assert!(!is_valid_url(""));
    assert!(!is_valid_url("javascript:alert(1)"));
    assert!(!is_valid_url("/relative/path"));
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_round_trip_preserves_claim() {
    let t = token::encode(&claim(), SECRET, None).unwrap();
    let decoded = token::decode(&t, SECRET).unwrap();

    assert_eq!(decoded.url, "https://dest.example/page");
    assert_eq!(decoded.owner_id, OwnerId::Id(777_001));
    assert!(decoded.issued_at.is_some());
    assert!(decoded.expires_at.is_none());
}

#[test]
fn test_round_trip_username_owner() {
    let claim = TrackingClaim::new("http://a", OwnerId::Username("@somechannel".into()));
    let t = token::encode(&claim, SECRET, Some(3600)).unwrap();
    let decoded = token::decode(&t, SECRET).unwrap();

    assert_eq!(decoded.owner_id, OwnerId::Username("@somechannel".into()));
    assert!(decoded.expires_at.is_some());
}

#[test]
fn test_decode_is_idempotent() {
    let t = token::encode(&claim(), SECRET, Some(600)).unwrap();
    let before = t.clone();

    let first = token::decode(&t, SECRET).unwrap();
    let second = token::decode(&t, SECRET).unwrap();

    assert_eq!(first, second);
    assert_eq!(t, before);
}

// =============================================================================
// Tamper Detection
// =============================================================================

/// 把指定段的第 index 个 base64url 字符换成另一个合法字符
fn flip_char(token: &str, segment: usize, index: usize) -> String {
    let mut parts: Vec<String> = token.split('.').map(String::from).collect();
    let mut chars: Vec<char> = parts[segment].chars().collect();
    chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
    parts[segment] = chars.into_iter().collect();
    parts.join(".")
}

#[test]
fn test_flipping_payload_never_yields_other_claim() {
    let t = token::encode(&claim(), SECRET, None).unwrap();
    let payload_len = t.split('.').nth(1).unwrap().len();

    for i in 0..payload_len {
        let tampered = flip_char(&t, 1, i);
        match token::decode(&tampered, SECRET) {
            Err(TokenError::InvalidSignature)
            | Err(TokenError::MalformedToken)
            | Err(TokenError::MalformedPayload) => {}
            other => panic!("payload flip at {} decoded to {:?}", i, other),
        }
    }
}

#[test]
fn test_flipping_signature_is_rejected() {
    let t = token::encode(&claim(), SECRET, None).unwrap();
    let sig_len = t.split('.').nth(2).unwrap().len();

    for i in 0..sig_len {
        let tampered = flip_char(&t, 2, i);
        assert!(
            matches!(
                token::decode(&tampered, SECRET),
                Err(TokenError::InvalidSignature) | Err(TokenError::MalformedToken)
            ),
            "signature flip at {} accepted",
            i
        );
    }
}

#[test]
fn test_decode_webhook_variant_payload() {
    let data = serde_json::json!({
        "url": "https://dest.example/page",
        "userId": 7,
        "username": "alice",
        "timestamp": 1_700_000_000_000i64,
    });
    let payload = serde_json::json!({ "data": data.to_string(), "iat": 1_700_000_000 });
    let t = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &payload,
        &jsonwebtoken::EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    let decoded = token::decode(&t, SECRET).unwrap();
    assert_eq!(decoded.url, "https://dest.example/page");
    assert_eq!(decoded.owner_id, OwnerId::Id(7));
}

#[test]
fn test_forged_payload_reusing_signature() {
    let t = token::encode(&claim(), SECRET, None).unwrap();
    let parts: Vec<&str> = t.split('.').collect();

    let forged_payload = URL_SAFE_NO_PAD.encode(
        br#"{"data":"{\"url\":\"https://evil.example\",\"chat_id\":777001}","iat":1}"#,
    );
    let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

    assert_eq!(
        token::decode(&forged, SECRET),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_structurally_broken_tokens() {
    for bad in ["", "abc", "a.b", "a.b.c.d", "a..c", "!!!.@@@.###"] {
        assert_eq!(
            token::decode(bad, SECRET),
            Err(TokenError::MalformedToken),
            "{:?}",
            bad
        );
    }
}

// =============================================================================
// Keys and Expiry
// =============================================================================

#[test]
fn test_wrong_key_rejected() {
    let t = token::encode(&claim(), b"key-one", None).unwrap();
    assert_eq!(
        token::decode(&t, b"key-two"),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_zero_ttl_is_expired() {
    let t = token::encode(&claim(), SECRET, Some(0)).unwrap();
    assert_eq!(token::decode(&t, SECRET), Err(TokenError::Expired));
}

#[test]
fn test_codec_default_ttl_applies_to_issue() {
    let codec = TokenCodec::new(SECRET).with_default_ttl(Some(0));
    let t = codec.issue(&claim()).unwrap();
    assert_eq!(codec.decode(&t), Err(TokenError::Expired));

    // 显式传 None 覆盖默认值
    let t = codec.encode(&claim(), None).unwrap();
    assert!(codec.decode(&t).is_ok());
}

#[test]
fn test_encode_rejects_invalid_claim() {
    let bad = TrackingClaim::new("ftp://x.com", 1i64);
    assert!(token::encode(&bad, SECRET, None).is_err());
}
