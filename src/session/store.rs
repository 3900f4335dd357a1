use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::models::{LogoutOptions, Session, SessionState};
use super::storage::TokenStorage;
use crate::api::{ApiClient, ApiEnvelope};
use crate::auth::validation::{
    self, validate_credentials, validate_password_reset, validate_registration,
    validate_reset_email,
};
use crate::auth::{
    is_token_expired, AuthGateway, Claims, Credentials, PasswordReset, RegisterRequest, TokenPair,
};
use crate::error::{ApiFailure, AppError, AuthError, ValidationErrors};
use crate::navigation::Navigator;
use crate::Result;

const AUTHORIZED_REQUEST_FAILED: &str = "request failed";

/// Owner of the process-wide session. Only its own mutators write the
/// state; any number of readers take snapshots or subscribe to changes.
pub struct SessionStore {
    gateway: Arc<dyn AuthGateway>,
    storage: Arc<dyn TokenStorage>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    min_password_length: usize,
    initialize_started: AtomicBool,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            gateway,
            storage,
            navigator,
            login_path: "/login".to_string(),
            min_password_length: validation::MIN_PASSWORD_LENGTH,
            initialize_started: AtomicBool::new(false),
            state,
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_min_password_length(mut self, length: usize) -> Self {
        self.min_password_length = length;
        self
    }

    pub fn min_password_length(&self) -> usize {
        self.min_password_length
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn is_initializing(&self) -> bool {
        self.state.borrow().initializing
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.tokens.access_token.clone())
    }

    /// True when there is no access token or it is past its expiry.
    pub fn is_access_token_expired(&self) -> bool {
        is_token_expired(self.access_token().as_deref())
    }

    /// Restores a session from stored tokens. Runs once; initialization
    /// ends on every path through here.
    pub async fn initialize(&self) -> SessionState {
        if self.initialize_started.swap(true, Ordering::SeqCst) || !self.is_initializing() {
            return self.snapshot();
        }

        match self.storage.load() {
            None => debug!("No stored tokens"),
            Some(tokens) => match Claims::decode_unverified(&tokens.access_token) {
                Ok(claims) if !claims.is_expired() => {
                    let session = Session::from_claims(&claims, tokens);
                    info!("Restored session for {}", session.username);
                    self.state.send_modify(|state| state.session = Some(session));
                }
                _ if tokens.refresh_token.is_some() => {
                    debug!("Stored access token expired, attempting refresh");
                    if let Err(e) = self.refresh_inner(false).await {
                        info!("Could not restore session: {}", e);
                    }
                }
                _ => {
                    debug!("Discarding expired tokens without a refresh token");
                    self.storage.clear();
                }
            },
        }

        self.finish_initialization();
        self.snapshot()
    }

    /// Authenticates through the gateway. On failure the session is left
    /// exactly as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        validate_credentials(credentials, self.min_password_length)?;

        info!("Login attempt for {}", credentials.username_or_email);
        let envelope = self.gateway.login(credentials).await.map_err(|failure| {
            warn!(
                "Login failed for {} (status {:?}): {}",
                credentials.username_or_email, failure.status, failure.message
            );
            AppError::from(failure)
        })?;

        let tokens = envelope
            .data
            .ok_or_else(|| AppError::InternalError("login response carried no tokens".into()))?;
        let session = Session::from_tokens(tokens)?;

        self.state.send_modify(|state| {
            self.storage.save(&session.tokens);
            state.session = Some(session.clone());
            state.initializing = false;
            state.generation += 1;
        });
        info!("Login successful for {}", session.username);
        Ok(session)
    }

    /// Exchanges the refresh token for a new access token. Any failure
    /// clears the session and sends the user to the login view.
    ///
    /// A login or logout that completes while the exchange is in flight
    /// wins: the outcome of the exchange is then dropped.
    pub async fn refresh(&self) -> Result<Session> {
        self.refresh_inner(true).await
    }

    async fn refresh_inner(&self, redirect_on_failure: bool) -> Result<Session> {
        let generation = self.state.borrow().generation;
        let refresh_token = self
            .session()
            .and_then(|s| s.tokens.refresh_token)
            .or_else(|| self.storage.load().and_then(|t| t.refresh_token))
            .filter(|t| !t.trim().is_empty());

        let result = match refresh_token {
            Some(refresh_token) => self.exchange_refresh_token(refresh_token).await,
            None => Err(AppError::AuthError(AuthError::MissingRefreshToken)),
        };

        match result {
            Ok(session) => {
                if !self.commit_if_current(generation, &session) {
                    debug!("Session changed during refresh, dropping new token");
                    return Err(AppError::AuthError(AuthError::SessionChanged));
                }
                info!("Access token refreshed for {}", session.username);
                Ok(session)
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                if self.clear_if_current(generation) && redirect_on_failure {
                    self.navigator.navigate(&self.login_path);
                }
                Err(e)
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: String) -> Result<Session> {
        let envelope = self.gateway.refresh_token(&refresh_token).await?;
        let fresh = envelope
            .data
            .ok_or_else(|| AppError::InternalError("refresh response carried no token".into()))?;

        // The server may rotate the refresh token or leave it as is.
        let tokens = TokenPair::new(
            fresh.access_token,
            fresh.refresh_token.or(Some(refresh_token)),
        );
        Session::from_tokens(tokens)
    }

    /// Clears the session whatever the server says; the server-side call
    /// is best effort.
    pub async fn logout(&self, options: LogoutOptions) {
        let access_token = self.access_token();
        let username = self.session().map(|s| s.username);

        let outcome = self.gateway.logout(access_token).await;
        if !outcome.success {
            warn!(
                "Ignoring server-side logout failure: {}",
                outcome.message.as_deref().unwrap_or("unknown error")
            );
        }

        self.clear();
        if let Some(username) = username {
            info!("Logged out {}", username);
        }

        if let Some(path) = options.redirect_to {
            self.navigator.navigate(&path);
        }
    }

    /// GET through `client` with the current access token. A 401 or 403
    /// triggers one refresh and one retry; a failed refresh signs the user
    /// out and sends them to the login view.
    pub async fn authorized_get<T>(&self, client: &ApiClient, path: &str) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        self.authorized(|token| async move {
            client
                .get_json::<T>(path, token.as_deref(), AUTHORIZED_REQUEST_FAILED)
                .await
        })
        .await
    }

    /// POST counterpart of [`authorized_get`](Self::authorized_get).
    pub async fn authorized_post<B, T>(
        &self,
        client: &ApiClient,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.authorized(|token| async move {
            client
                .post_json::<B, T>(path, body, token.as_deref(), AUTHORIZED_REQUEST_FAILED)
                .await
        })
        .await
    }

    async fn authorized<T, F, Fut>(&self, send: F) -> Result<ApiEnvelope<T>>
    where
        F: Fn(Option<String>) -> Fut,
        Fut: Future<Output = std::result::Result<ApiEnvelope<T>, ApiFailure>>,
    {
        match send(self.access_token()).await {
            Err(failure) if matches!(failure.status, Some(401 | 403)) => {
                debug!("Access token rejected (status {:?}), refreshing", failure.status);
                let session = self.refresh().await?;
                // Single retry: a second rejection goes back to the caller.
                Ok(send(Some(session.tokens.access_token)).await?)
            }
            result => Ok(result?),
        }
    }

    /// Creates an account. Does not sign the new user in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<String>> {
        validate_registration(request)?;
        info!("Registration attempt for {}", request.username);
        let envelope = self.gateway.register(request).await?;
        info!("Registration successful for {}", request.username);
        Ok(envelope.message)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
        validate_reset_email(email)?;
        let envelope = self.gateway.request_password_reset(email.trim()).await?;
        info!("Password reset requested");
        Ok(envelope.message)
    }

    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<Option<String>> {
        validate_password_reset(reset, self.min_password_length)?;
        let envelope = self.gateway.reset_password(reset).await?;
        info!("Password reset completed");
        Ok(envelope.message)
    }

    pub async fn verify_reset_token(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add(validation::TOKEN, "Reset token is required");
            return Err(errors.into());
        }
        self.gateway.verify_reset_token(token).await?;
        Ok(())
    }

    // Storage writes happen inside the state update so they are ordered
    // with the generation check.
    fn clear(&self) {
        self.state.send_if_modified(|state| {
            self.storage.clear();
            state.generation += 1;
            state.session.take().is_some()
        });
    }

    fn commit_if_current(&self, generation: u64, session: &Session) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            self.storage.save(&session.tokens);
            state.session = Some(session.clone());
            true
        })
    }

    /// Clears only if nothing signed in or out since `generation` was read.
    fn clear_if_current(&self, generation: u64) -> bool {
        let mut current = false;
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            current = true;
            self.storage.clear();
            state.generation += 1;
            state.session.take().is_some()
        });
        current
    }

    fn finish_initialization(&self) -> bool {
        let flipped = self.state.send_if_modified(|state| {
            let was = state.initializing;
            state.initializing = false;
            was
        });
        if flipped {
            debug!("Session initialization complete");
        }
        flipped
    }
}
