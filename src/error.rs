use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown in the banner when a failure has no better description.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Validation error: {0}")]
    ValidationError(ValidationErrors),

    #[error("Request failed: {message}")]
    RequestError { message: String, status: Option<u16> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied")]
    Forbidden,

    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Session changed while the request was in flight")]
    SessionChanged,
}

/// How a failure should be presented: inline per field, or as a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Unexpected,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_) => ErrorKind::Validation,
            AppError::AuthError(_) => ErrorKind::Auth,
            _ => ErrorKind::Unexpected,
        }
    }

    /// HTTP status the failure originated from, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::AuthError(AuthError::InvalidCredentials) => Some(401),
            AppError::AuthError(AuthError::Forbidden) => Some(403),
            AppError::RequestError { status, .. } => *status,
            AppError::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Text for a general error banner. Validation errors are shown per field
    /// and have no banner of their own.
    pub fn banner_message(&self) -> Option<String> {
        match self {
            AppError::ValidationError(_) => None,
            AppError::AuthError(e) => Some(e.to_string()),
            // Client errors carry a message meant for the user.
            AppError::RequestError {
                message,
                status: Some(status),
            } if (400..500).contains(status) => Some(message.clone()),
            _ => Some(UNEXPECTED_ERROR_MESSAGE.to_string()),
        }
    }
}

/// Field-scoped validation messages keyed by the field's wire name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl From<BTreeMap<String, String>> for ValidationErrors {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(errors)
    }
}

/// Normalized failure value returned by every API call:
/// `{ success: false, message, status }`, plus any server-side field errors.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiFailure {
    pub success: bool,
    pub message: String,
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, String>,
}

impl ApiFailure {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            success: false,
            message: message.into(),
            status,
            field_errors: BTreeMap::new(),
        }
    }

    pub fn with_field_errors(mut self, field_errors: BTreeMap<String, String>) -> Self {
        self.field_errors = field_errors;
        self
    }
}

// Field errors win over the status code; 401/403 are auth failures; the rest
// is unexpected.
impl From<ApiFailure> for AppError {
    fn from(failure: ApiFailure) -> Self {
        if !failure.field_errors.is_empty() {
            return AppError::ValidationError(failure.field_errors.into());
        }
        match failure.status {
            Some(401) => AppError::AuthError(AuthError::InvalidCredentials),
            Some(403) => AppError::AuthError(AuthError::Forbidden),
            status => AppError::RequestError {
                message: failure.message,
                status,
            },
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::ConfigError(format!("invalid url: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::RequestError {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AppError::AuthError(AuthError::InvalidToken)
    }
}
