use std::collections::BTreeSet;

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AuthError};

/// Claims carried by the backend's access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default, alias = "userId")]
    pub uid: Option<serde_json::Value>,
    #[serde(default)]
    pub roles: Vec<RoleClaim>,
    #[serde(default, rename = "type")]
    pub token_type: Option<String>,
}

/// A role as serialized by the backend: `"ROLE_ADMIN"` or
/// `{ "authority": "ROLE_ADMIN" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    Name(String),
    Authority { authority: String },
}

impl RoleClaim {
    fn raw(&self) -> &str {
        match self {
            RoleClaim::Name(name) => name,
            RoleClaim::Authority { authority } => authority,
        }
    }
}

/// Lowercases a role and strips the `ROLE_` prefix: `ROLE_ADMIN` -> `admin`.
pub fn normalize_role(role: &str) -> String {
    let role = role.trim();
    let stripped = role
        .get(..5)
        .filter(|prefix| prefix.eq_ignore_ascii_case("role_"))
        .map(|_| &role[5..])
        .unwrap_or(role);
    stripped.to_ascii_lowercase()
}

impl Claims {
    /// Reads the claims of `token` without checking its signature; the
    /// client never holds the signing key. Expiry is checked separately.
    pub fn decode_unverified(token: &str) -> Result<Self, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
        if data.claims.sub.trim().is_empty() {
            return Err(AppError::AuthError(AuthError::InvalidToken));
        }
        Ok(data.claims)
    }

    pub fn roles(&self) -> BTreeSet<String> {
        self.roles
            .iter()
            .map(|r| normalize_role(r.raw()))
            .filter(|r| !r.is_empty())
            .collect()
    }

    /// Stable identifier for the user: the `uid` claim when present,
    /// otherwise the subject.
    pub fn user_id(&self) -> String {
        match &self.uid {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => self.sub.clone(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp < now)
    }
}

/// True when `token` is missing, undecodable, or past its `exp`.
pub fn is_token_expired(token: Option<&str>) -> bool {
    match token {
        Some(token) => Claims::decode_unverified(token)
            .map(|c| c.is_expired())
            .unwrap_or(true),
        None => true,
    }
}
