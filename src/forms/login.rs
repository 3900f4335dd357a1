use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use super::{classify_failure, FormField, FormStatus, SubmitOutcome};
use crate::auth::validation::{self, validate_credentials};
use crate::auth::Credentials;
use crate::error::ErrorKind;
use crate::navigation::Navigator;
use crate::session::{Session, SessionStore};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoginField {
    UsernameOrEmail,
    Password,
}

impl FormField for LoginField {
    const ALL: &'static [Self] = &[LoginField::UsernameOrEmail, LoginField::Password];

    fn key(self) -> &'static str {
        match self {
            LoginField::UsernameOrEmail => validation::USERNAME_OR_EMAIL,
            LoginField::Password => validation::PASSWORD,
        }
    }
}

type SuccessCallback = Box<dyn Fn(&Session) + Send + Sync>;

/// Login view state: editing, validating, submitting, error, success.
pub struct LoginForm {
    username_or_email: String,
    password: String,
    status: FormStatus,
    field_errors: BTreeMap<LoginField, String>,
    banner: Option<String>,
    redirect_to: String,
    min_password_length: usize,
    on_success: Option<SuccessCallback>,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username_or_email", &self.username_or_email)
            .field("status", &self.status)
            .field("field_errors", &self.field_errors)
            .field("banner", &self.banner)
            .field("redirect_to", &self.redirect_to)
            .finish_non_exhaustive()
    }
}

impl LoginForm {
    /// `redirect_to` is where a successful login navigates when no
    /// callback is supplied.
    pub fn new(redirect_to: impl Into<String>) -> Self {
        Self {
            username_or_email: String::new(),
            password: String::new(),
            status: FormStatus::Editing,
            field_errors: BTreeMap::new(),
            banner: None,
            redirect_to: redirect_to.into(),
            min_password_length: validation::MIN_PASSWORD_LENGTH,
            on_success: None,
        }
    }

    pub fn with_min_password_length(mut self, length: usize) -> Self {
        self.min_password_length = length;
        self
    }

    /// Replaces the default navigation on success.
    pub fn on_success(mut self, callback: impl Fn(&Session) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// Controls are disabled while a login is in flight.
    pub fn is_disabled(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn value(&self, field: LoginField) -> &str {
        match field {
            LoginField::UsernameOrEmail => &self.username_or_email,
            LoginField::Password => &self.password,
        }
    }

    pub fn field_error(&self, field: LoginField) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Edits a field and clears that field's error. Ignored while submitting.
    pub fn set_field(&mut self, field: LoginField, value: impl Into<String>) {
        if self.is_disabled() {
            return;
        }
        let value = value.into();
        match field {
            LoginField::UsernameOrEmail => self.username_or_email = value,
            LoginField::Password => self.password = value,
        }
        self.field_errors.remove(&field);
        self.status = FormStatus::Editing;
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.username_or_email.trim(), self.password.clone())
    }

    /// Runs client-side validation and records per-field errors.
    pub fn validate(&mut self) -> bool {
        self.status = FormStatus::Validating;
        self.field_errors.clear();
        match validate_credentials(&self.credentials(), self.min_password_length) {
            Ok(()) => {
                self.status = FormStatus::Editing;
                true
            }
            Err(errors) => {
                let (fields, _) = super::field_errors(&errors);
                self.field_errors = fields;
                self.status = FormStatus::Error;
                false
            }
        }
    }

    /// First half of a submit: validates and marks the form as submitting.
    /// Hands back the credentials to send, or the outcome when there is
    /// nothing to send.
    pub fn begin_submit(&mut self) -> std::result::Result<Credentials, SubmitOutcome> {
        if self.is_disabled() {
            debug!("Login already in flight, ignoring submit");
            return Err(SubmitOutcome::Ignored);
        }
        self.banner = None;
        if !self.validate() {
            return Err(SubmitOutcome::Invalid);
        }
        self.status = FormStatus::Submitting;
        Ok(self.credentials())
    }

    /// Second half of a submit: applies the login result.
    pub fn finish_submit(&mut self, result: Result<Session>, navigator: &dyn Navigator) -> SubmitOutcome {
        match result {
            Ok(session) => {
                self.status = FormStatus::Success;
                self.password.clear();
                self.field_errors.clear();
                self.banner = None;
                match &self.on_success {
                    Some(callback) => callback(&session),
                    None => {
                        info!("Redirecting {} to {}", session.username, self.redirect_to);
                        navigator.navigate(&self.redirect_to);
                    }
                }
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                let (fields, banner, kind) = classify_failure::<LoginField>(&err);
                self.field_errors = fields;
                self.banner = banner;
                if kind == ErrorKind::Validation && self.field_errors.is_empty() && self.banner.is_none() {
                    self.banner = Some(err.to_string());
                }
                self.status = FormStatus::Error;
                SubmitOutcome::Failed(kind)
            }
        }
    }

    pub async fn submit(&mut self, store: &SessionStore, navigator: &dyn Navigator) -> SubmitOutcome {
        let credentials = match self.begin_submit() {
            Ok(credentials) => credentials,
            Err(outcome) => return outcome,
        };
        let result = store.login(&credentials).await;
        self.finish_submit(result, navigator)
    }
}
