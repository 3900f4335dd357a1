pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod guard;
pub mod navigation;
pub mod session;
pub mod telemetry;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthGateway, HttpAuthGateway};
pub use dashboard::DocumentRegistry;
pub use guard::{Authenticated, RequireRole, RouteGuard};
pub use navigation::{NavigationHistory, Navigator};
pub use session::{LogoutOptions, MemoryTokenStorage, SessionStore, TokenStorage};

use api::ApiClient;
use forms::{LoginForm, RegisterForm};

/// Application state shared across all views
#[derive(Clone)]
pub struct AdminApp {
    pub config: Arc<Settings>,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<dyn Navigator>,
    api: ApiClient,
    documents: Arc<RwLock<DocumentRegistry>>,
}

impl AdminApp {
    /// Wires the HTTP gateway, in-memory token storage and an in-memory
    /// navigation history.
    pub fn new(settings: Settings) -> Result<Self> {
        let client = ApiClient::new(&settings.api.base_url)?;
        Self::with_parts(
            settings,
            Arc::new(HttpAuthGateway::new(client)),
            Arc::new(MemoryTokenStorage::new()),
            Arc::new(NavigationHistory::new()),
        )
    }

    /// Authenticated data calls go to `settings.api.base_url`; auth calls go
    /// through `gateway`.
    pub fn with_parts(
        settings: Settings,
        gateway: Arc<dyn AuthGateway>,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let api = ApiClient::new(&settings.api.base_url)?;
        let session = SessionStore::new(gateway, storage, navigator.clone())
            .with_login_path(settings.routes.login.clone())
            .with_min_password_length(settings.auth.min_password_length);

        Ok(Self {
            config: Arc::new(settings),
            session: Arc::new(session),
            navigator,
            api,
            documents: Arc::new(RwLock::new(DocumentRegistry::new())),
        })
    }

    /// Guard for the admin area.
    pub fn admin_guard(&self) -> RouteGuard<RequireRole> {
        let routes = &self.config.routes;
        RouteGuard::with_policy(
            RequireRole::new(&self.config.auth.admin_role),
            routes.login.clone(),
            routes.landing.clone(),
        )
    }

    pub fn protected_guard(&self) -> RouteGuard<Authenticated> {
        RouteGuard::authenticated(self.config.routes.login.clone())
    }

    pub fn login_form(&self) -> LoginForm {
        LoginForm::new(self.config.routes.after_login.clone())
            .with_min_password_length(self.config.auth.min_password_length)
    }

    pub fn register_form(&self) -> RegisterForm {
        RegisterForm::new()
    }

    pub async fn logout(&self) {
        self.session
            .logout(LogoutOptions::redirect_to(self.config.routes.login.clone()))
            .await;
    }

    pub fn documents(&self) -> Arc<RwLock<DocumentRegistry>> {
        self.documents.clone()
    }

    /// Authenticated GET against the ranking API, refreshing the access
    /// token once if it is rejected.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<api::ApiEnvelope<T>> {
        self.session.authorized_get(&self.api, path).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<api::ApiEnvelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.session.authorized_post(&self.api, path, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiEnvelope;
    use crate::auth::MockAuthGateway;
    use crate::forms::{LoginField, SubmitOutcome};
    use crate::guard::Guarded;
    use crate::test_support::{token_envelope, token_pair};

    fn app(gateway: MockAuthGateway, storage: MemoryTokenStorage) -> (AdminApp, Arc<NavigationHistory>) {
        let history = Arc::new(NavigationHistory::new());
        let config = Settings::new_for_test().expect("Failed to load test config");
        let app = AdminApp::with_parts(config, Arc::new(gateway), Arc::new(storage), history.clone())
            .expect("Failed to build app");
        (app, history)
    }

    #[test]
    fn test_app_new_uses_settings() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        let app = AdminApp::new(config).expect("Failed to build app");
        assert_eq!(app.session.min_password_length(), 8);
        assert_eq!(app.admin_guard().policy().role(), "admin");
        assert!(app.session.is_initializing());
    }

    #[test]
    fn test_app_clone_shares_state() {
        let (app, _) = app(MockAuthGateway::new(), MemoryTokenStorage::new());
        let cloned = app.clone();
        assert!(Arc::ptr_eq(&app.config, &cloned.config));
        assert!(Arc::ptr_eq(&app.session, &cloned.session));
        assert!(Arc::ptr_eq(&app.documents(), &cloned.documents()));
    }

    #[tokio::test]
    async fn test_login_then_admin_area_renders() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_login()
            .returning(|_| Ok(token_envelope("amina", &["admin"])));
        let (app, history) = app(gateway, MemoryTokenStorage::new());

        // Nothing stored: the guard redirects once initialization ends.
        app.session.initialize().await;
        assert_eq!(
            app.admin_guard().render(&app.session.snapshot(), || "dashboard"),
            Guarded::Redirect("/login".to_string())
        );

        let mut form = app.login_form();
        form.set_field(LoginField::UsernameOrEmail, "amina");
        form.set_field(LoginField::Password, "correct-horse");
        assert_eq!(form.submit(&app.session, app.navigator.as_ref()).await, SubmitOutcome::Succeeded);

        assert_eq!(history.current().as_deref(), Some("/admin/dashboard"));
        assert_eq!(
            app.admin_guard().render(&app.session.snapshot(), || "dashboard"),
            Guarded::Content("dashboard")
        );
    }

    #[tokio::test]
    async fn test_non_admin_is_sent_to_landing() {
        let (app, _) = app(
            MockAuthGateway::new(),
            MemoryTokenStorage::with_tokens(token_pair("kofi", &["user"])),
        );
        let state = app.session.initialize().await;
        assert!(state.is_authenticated());
        assert_eq!(
            app.admin_guard().render(&state, || ()),
            Guarded::Redirect("/".to_string())
        );
        assert_eq!(app.protected_guard().render(&state, || ()), Guarded::Content(()));
    }

    #[tokio::test]
    async fn test_logout_redirects_to_login() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_logout()
            .times(1)
            .returning(|_| ApiEnvelope::ok(serde_json::Value::Null, None));
        let (app, history) = app(
            gateway,
            MemoryTokenStorage::with_tokens(token_pair("amina", &["admin"])),
        );
        app.session.initialize().await;

        app.logout().await;

        assert!(!app.session.is_authenticated());
        assert_eq!(history.current().as_deref(), Some("/login"));
    }
}
