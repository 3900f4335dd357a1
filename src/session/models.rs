use std::collections::BTreeSet;

use crate::auth::{normalize_role, Claims, TokenPair};
use crate::Result;

/// The current authenticated identity and its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub roles: BTreeSet<String>,
    pub tokens: TokenPair,
}

impl Session {
    /// Builds a session from the identity carried in the access token.
    pub fn from_tokens(tokens: TokenPair) -> Result<Self> {
        let claims = Claims::decode_unverified(&tokens.access_token)?;
        Ok(Self::from_claims(&claims, tokens))
    }

    /// Builds a session from claims already decoded from `tokens.access_token`.
    pub fn from_claims(claims: &Claims, tokens: TokenPair) -> Self {
        Self {
            user_id: claims.user_id(),
            username: claims.sub.clone(),
            roles: claims.roles(),
            tokens,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(&normalize_role(role))
    }
}

/// Everything readers of the store can observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub initializing: bool,
    /// Bumped on every login, logout and forced sign-out. A refresh only
    /// lands if it has not moved since the refresh started.
    pub generation: u64,
}

impl Default for SessionState {
    // Empty and still initializing, as at app start.
    fn default() -> Self {
        Self {
            session: None,
            initializing: true,
            generation: 0,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.session.as_ref().is_some_and(|s| s.has_role(role))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutOptions {
    pub redirect_to: Option<String>,
}

impl LogoutOptions {
    pub fn redirect_to(path: impl Into<String>) -> Self {
        Self {
            redirect_to: Some(path.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::token_pair;

    #[test]
    fn test_session_from_tokens() {
        let session = Session::from_tokens(token_pair("amina", &["admin"])).unwrap();
        assert_eq!(session.username, "amina");
        assert_eq!(session.user_id, "amina");
        assert!(session.has_role("admin"));
        assert!(session.has_role("ROLE_ADMIN"));
        assert!(!session.has_role("editor"));
    }

    #[test]
    fn test_session_rejects_garbage_token() {
        let result = Session::from_tokens(TokenPair::new("garbage", None));
        assert!(result.is_err());
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert!(state.initializing);
        assert!(!state.is_authenticated());
        assert!(!state.has_role("admin"));
    }
}
