use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub min_password_length: usize,
    pub admin_role: String,
}

/// Paths the session layer navigates to.
#[derive(Debug, Deserialize, Clone)]
pub struct RouteConfig {
    pub login: String,
    pub landing: String,
    pub after_login: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub routes: RouteConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::with_defaults("development")?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // E.g., `APP_API__BASE_URL=https://api.example.org` sets `Settings.api.base_url`
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn new_for_test() -> Result<Self, ConfigError> {
        Self::for_base_url("http://localhost:8080/api/v1")
    }

    /// Test settings pointing at `base_url`, typically a mock server.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Self::with_defaults("test")?
            .set_override("api.base_url", base_url)?
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn with_defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("api.base_url", "http://localhost:8080/api/v1")?
            .set_default("auth.min_password_length", 8)?
            .set_default("auth.admin_role", "admin")?
            .set_default("routes.login", "/login")?
            .set_default("routes.landing", "/")?
            .set_default("routes.after_login", "/admin/dashboard")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::Message(format!("api.base_url: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "api.base_url: unsupported scheme {}",
                url.scheme()
            )));
        }
        if self.auth.min_password_length == 0 {
            return Err(ConfigError::Message(
                "auth.min_password_length must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::new_for_test().expect("Failed to load settings");
        assert_eq!(settings.environment, "test");
        assert_eq!(settings.api.base_url, "http://localhost:8080/api/v1");
        assert_eq!(settings.auth.min_password_length, 8);
        assert_eq!(settings.auth.admin_role, "admin");
        assert_eq!(settings.routes.login, "/login");
        assert_eq!(settings.routes.landing, "/");
        assert_eq!(settings.routes.after_login, "/admin/dashboard");
    }

    #[test]
    fn test_environment_override() {
        env::set_var("CONSOLE_TEST_ROUTES__AFTER_LOGIN", "/admin/documents");
        env::set_var("CONSOLE_TEST_AUTH__MIN_PASSWORD_LENGTH", "12");

        let settings = Settings::with_defaults("test")
            .unwrap()
            .add_source(
                Environment::with_prefix("console_test")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .expect("Failed to build config")
            .try_deserialize::<Settings>()
            .expect("Failed to deserialize settings");

        assert_eq!(settings.routes.after_login, "/admin/documents");
        assert_eq!(settings.auth.min_password_length, 12);
        assert_eq!(settings.routes.login, "/login");

        env::remove_var("CONSOLE_TEST_ROUTES__AFTER_LOGIN");
        env::remove_var("CONSOLE_TEST_AUTH__MIN_PASSWORD_LENGTH");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = Settings::for_base_url("not a url");
        assert!(result.is_err(), "Expected error for invalid base url");

        let result = Settings::for_base_url("ftp://example.org/api");
        let message = result.unwrap_err().to_string();
        assert!(message.contains("unsupported scheme"), "Unexpected error: {}", message);
    }
}
