use std::fmt;

use serde::{Deserialize, Serialize};

/// Login input. Lives only for the duration of a submit.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username_or_email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username_or_email", &self.username_or_email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordReset").finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// Token payload as sent by the server: either a pair object or, for
/// refresh, a bare access token string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TokenPayload {
    Pair {
        #[serde(rename = "accessToken", alias = "token")]
        access_token: String,
        #[serde(rename = "refreshToken", default)]
        refresh_token: Option<String>,
    },
    Bare(String),
}

impl From<TokenPayload> for TokenPair {
    fn from(payload: TokenPayload) -> Self {
        match payload {
            TokenPayload::Pair {
                access_token,
                refresh_token,
            } => TokenPair::new(access_token, refresh_token),
            TokenPayload::Bare(access_token) => TokenPair::new(access_token, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credentials_wire_format() {
        let body = serde_json::to_value(Credentials::new("admin", "s3cret-pass")).unwrap();
        assert_eq!(body, json!({ "usernameOrEmail": "admin", "password": "s3cret-pass" }));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds = Credentials::new("admin", "s3cret-pass");
        assert!(!format!("{:?}", creds).contains("s3cret-pass"));

        let tokens = TokenPair::new("header.payload.sig", Some("r-secret".into()));
        let debug = format!("{:?}", tokens);
        assert!(!debug.contains("header.payload.sig"));
        assert!(!debug.contains("r-secret"));
    }

    #[test]
    fn test_token_payload_shapes() {
        let pair: TokenPayload =
            serde_json::from_value(json!({ "accessToken": "a", "refreshToken": "r" })).unwrap();
        assert_eq!(TokenPair::from(pair), TokenPair::new("a", Some("r".into())));

        let legacy: TokenPayload = serde_json::from_value(json!({ "token": "a" })).unwrap();
        assert_eq!(TokenPair::from(legacy), TokenPair::new("a", None));

        let bare: TokenPayload = serde_json::from_value(json!("a")).unwrap();
        assert_eq!(TokenPair::from(bare), TokenPair::new("a", None));
    }
}
