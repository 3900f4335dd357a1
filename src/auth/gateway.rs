use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::models::{Credentials, PasswordReset, RegisterRequest, TokenPair, TokenPayload};
use crate::api::{ApiClient, ApiEnvelope};
use crate::error::ApiFailure;

/// Boundary for every authentication-related request. Each call is a single
/// attempt; the session layer decides what happens next.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<ApiEnvelope<TokenPair>, ApiFailure>;

    async fn register(&self, request: &RegisterRequest) -> Result<ApiEnvelope<Value>, ApiFailure>;

    async fn refresh_token(&self, refresh_token: &str) -> Result<ApiEnvelope<TokenPair>, ApiFailure>;

    /// Never fails: a server-side failure comes back as a failed envelope so
    /// local cleanup can always proceed.
    async fn logout(&self, access_token: Option<String>) -> ApiEnvelope<Value>;

    async fn request_password_reset(&self, email: &str) -> Result<ApiEnvelope<Value>, ApiFailure>;

    async fn reset_password(&self, reset: &PasswordReset) -> Result<ApiEnvelope<Value>, ApiFailure>;

    async fn verify_reset_token(&self, token: &str) -> Result<ApiEnvelope<Value>, ApiFailure>;
}

/// `AuthGateway` over the ranking API's `/auth` endpoints.
pub struct HttpAuthGateway {
    client: ApiClient,
}

impl HttpAuthGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &Credentials) -> Result<ApiEnvelope<TokenPair>, ApiFailure> {
        let envelope: ApiEnvelope<Option<TokenPayload>> = self
            .client
            .post_json("/auth/login", credentials, None, "login request failed")
            .await?;
        Ok(into_tokens(envelope))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<ApiEnvelope<Value>, ApiFailure> {
        self.client
            .post_json("/auth/register", request, None, "registration request failed")
            .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<ApiEnvelope<TokenPair>, ApiFailure> {
        let envelope: ApiEnvelope<Option<TokenPayload>> = self
            .client
            .post_json(
                "/auth/refresh",
                &json!({ "refreshToken": refresh_token }),
                None,
                "refreshing token failed",
            )
            .await?;
        Ok(into_tokens(envelope))
    }

    async fn logout(&self, access_token: Option<String>) -> ApiEnvelope<Value> {
        let result = self
            .client
            .post_json::<_, Value>(
                "/auth/logout",
                &json!({}),
                access_token.as_deref(),
                "logout request failed",
            )
            .await;

        match result {
            Ok(envelope) => {
                info!("Server-side logout acknowledged");
                envelope
            }
            Err(failure) => {
                warn!(
                    "Server-side logout failed (status {:?}): {}",
                    failure.status, failure.message
                );
                ApiEnvelope::failed(failure.message)
            }
        }
    }

    async fn request_password_reset(&self, email: &str) -> Result<ApiEnvelope<Value>, ApiFailure> {
        self.client
            .post_json(
                "/auth/forgot-password",
                &json!({ "email": email }),
                None,
                "triggering password reset failed",
            )
            .await
    }

    async fn reset_password(&self, reset: &PasswordReset) -> Result<ApiEnvelope<Value>, ApiFailure> {
        self.client
            .post_json("/auth/reset-password", reset, None, "resetting password failed")
            .await
    }

    async fn verify_reset_token(&self, token: &str) -> Result<ApiEnvelope<Value>, ApiFailure> {
        let path = format!("/auth/verify-reset-token/{}", urlencoding::encode(token));
        self.client
            .get_json(&path, None, "Invalid or expired reset token")
            .await
    }
}

// A success without a token payload keeps `data` empty; the session layer
// reports it.
fn into_tokens(envelope: ApiEnvelope<Option<TokenPayload>>) -> ApiEnvelope<TokenPair> {
    ApiEnvelope {
        success: envelope.success,
        data: envelope.data.flatten().map(TokenPair::from),
        message: envelope.message,
    }
}
