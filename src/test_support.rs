use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use crate::api::ApiEnvelope;
use crate::auth::TokenPair;

/// Signs an access token the way the backend does. The client never checks
/// the signature, so the key is arbitrary.
pub(crate) fn access_token(username: &str, roles: &[&str], ttl_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let roles: Vec<_> = roles
        .iter()
        .map(|r| json!({ "authority": format!("ROLE_{}", r.to_uppercase()) }))
        .collect();
    encode(
        &Header::default(),
        &json!({
            "sub": username,
            "roles": roles,
            "type": "ACCESS",
            "iat": now,
            "exp": now + ttl_secs,
        }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

pub(crate) fn token_pair(username: &str, roles: &[&str]) -> TokenPair {
    TokenPair::new(
        access_token(username, roles, 900),
        Some(format!("refresh-{}", username)),
    )
}

pub(crate) fn token_envelope(username: &str, roles: &[&str]) -> ApiEnvelope<TokenPair> {
    ApiEnvelope::ok(token_pair(username, roles), None)
}
