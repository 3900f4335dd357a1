use std::collections::BTreeMap;

use tracing::debug;

use super::{classify_failure, field_errors, FormField, FormStatus, SubmitOutcome};
use crate::auth::validation::{self, validate_registration};
use crate::auth::RegisterRequest;
use crate::session::SessionStore;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegisterField {
    FirstName,
    LastName,
    Username,
    Email,
    Password,
    PasswordConfirmation,
}

impl FormField for RegisterField {
    const ALL: &'static [Self] = &[
        RegisterField::FirstName,
        RegisterField::LastName,
        RegisterField::Username,
        RegisterField::Email,
        RegisterField::Password,
        RegisterField::PasswordConfirmation,
    ];

    fn key(self) -> &'static str {
        match self {
            RegisterField::FirstName => validation::FIRST_NAME,
            RegisterField::LastName => validation::LAST_NAME,
            RegisterField::Username => validation::USERNAME,
            RegisterField::Email => validation::EMAIL,
            RegisterField::Password => validation::PASSWORD,
            RegisterField::PasswordConfirmation => validation::PASSWORD_CONFIRMATION,
        }
    }
}

#[derive(Debug)]
pub struct RegisterForm {
    request: RegisterRequest,
    status: FormStatus,
    field_errors: BTreeMap<RegisterField, String>,
    banner: Option<String>,
    confirmation: Option<String>,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterForm {
    pub fn new() -> Self {
        Self {
            request: RegisterRequest::default(),
            status: FormStatus::Editing,
            field_errors: BTreeMap::new(),
            banner: None,
            confirmation: None,
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn is_disabled(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn value(&self, field: RegisterField) -> &str {
        let r = &self.request;
        match field {
            RegisterField::FirstName => &r.first_name,
            RegisterField::LastName => &r.last_name,
            RegisterField::Username => &r.username,
            RegisterField::Email => &r.email,
            RegisterField::Password => &r.password,
            RegisterField::PasswordConfirmation => &r.password_confirmation,
        }
    }

    pub fn field_error(&self, field: RegisterField) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Server message shown after a successful registration.
    pub fn confirmation(&self) -> Option<&str> {
        self.confirmation.as_deref()
    }

    pub fn set_field(&mut self, field: RegisterField, value: impl Into<String>) {
        if self.is_disabled() {
            return;
        }
        let value = value.into();
        let r = &mut self.request;
        match field {
            RegisterField::FirstName => r.first_name = value,
            RegisterField::LastName => r.last_name = value,
            RegisterField::Username => r.username = value,
            RegisterField::Email => r.email = value,
            RegisterField::Password => r.password = value,
            RegisterField::PasswordConfirmation => r.password_confirmation = value,
        }
        self.field_errors.remove(&field);
        self.status = FormStatus::Editing;
    }

    pub fn validate(&mut self) -> bool {
        self.status = FormStatus::Validating;
        match validate_registration(&self.request) {
            Ok(()) => {
                self.field_errors.clear();
                self.status = FormStatus::Editing;
                true
            }
            Err(errors) => {
                self.field_errors = field_errors(&errors).0;
                self.status = FormStatus::Error;
                false
            }
        }
    }

    pub fn begin_submit(&mut self) -> std::result::Result<RegisterRequest, SubmitOutcome> {
        if self.is_disabled() {
            debug!("Registration already in flight, ignoring submit");
            return Err(SubmitOutcome::Ignored);
        }
        self.banner = None;
        self.confirmation = None;
        if !self.validate() {
            return Err(SubmitOutcome::Invalid);
        }
        self.status = FormStatus::Submitting;
        Ok(self.request.clone())
    }

    pub fn finish_submit(&mut self, result: Result<Option<String>>) -> SubmitOutcome {
        match result {
            Ok(message) => {
                self.status = FormStatus::Success;
                self.request.password.clear();
                self.request.password_confirmation.clear();
                self.confirmation = message;
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                let (fields, banner, kind) = classify_failure::<RegisterField>(&err);
                self.field_errors = fields;
                self.banner = banner;
                self.status = FormStatus::Error;
                SubmitOutcome::Failed(kind)
            }
        }
    }

    pub async fn submit(&mut self, store: &SessionStore) -> SubmitOutcome {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        let result = store.register(&request).await;
        self.finish_submit(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiEnvelope;
    use crate::auth::MockAuthGateway;
    use crate::error::{ApiFailure, ErrorKind};
    use crate::navigation::NavigationHistory;
    use crate::session::MemoryTokenStorage;
    use serde_json::Value;
    use std::sync::Arc;

    fn store(gateway: MockAuthGateway) -> SessionStore {
        SessionStore::new(
            Arc::new(gateway),
            Arc::new(MemoryTokenStorage::new()),
            Arc::new(NavigationHistory::new()),
        )
    }

    fn filled() -> RegisterForm {
        let mut form = RegisterForm::new();
        form.set_field(RegisterField::FirstName, "Amina");
        form.set_field(RegisterField::LastName, "Diallo");
        form.set_field(RegisterField::Username, "amina_d");
        form.set_field(RegisterField::Email, "amina@example.org");
        form.set_field(RegisterField::Password, "Str0ng!pass");
        form.set_field(RegisterField::PasswordConfirmation, "Str0ng!pass");
        form
    }

    #[tokio::test]
    async fn test_successful_registration() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_register()
            .times(1)
            .returning(|_| Ok(ApiEnvelope::ok(Value::Null, Some("Admin registered".into()))));
        let store = store(gateway);

        let mut form = filled();
        assert_eq!(form.submit(&store).await, SubmitOutcome::Succeeded);
        assert_eq!(form.confirmation(), Some("Admin registered"));
        assert_eq!(form.value(RegisterField::Password), "");
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_mismatched_confirmation_is_caught_locally() {
        let mut gateway = MockAuthGateway::new();
        gateway.expect_register().never();
        let store = store(gateway);

        let mut form = filled();
        form.set_field(RegisterField::PasswordConfirmation, "Str0ng!pasS");
        assert_eq!(form.submit(&store).await, SubmitOutcome::Invalid);
        assert_eq!(
            form.field_error(RegisterField::PasswordConfirmation),
            Some("Password and confirmation must match")
        );

        form.set_field(RegisterField::PasswordConfirmation, "Str0ng!pass");
        assert_eq!(form.field_error(RegisterField::PasswordConfirmation), None);
    }

    #[tokio::test]
    async fn test_server_conflict_shows_banner() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_register()
            .returning(|_| Err(ApiFailure::new("Username already exists", Some(409))));
        let store = store(gateway);

        let mut form = filled();
        let outcome = form.submit(&store).await;
        assert_eq!(outcome, SubmitOutcome::Failed(ErrorKind::Unexpected));
        assert_eq!(form.status(), FormStatus::Error);
        assert_eq!(form.banner(), Some("Username already exists"));
    }

    #[test]
    fn test_valid_input_returns_to_editing() {
        let mut form = filled();
        assert!(form.validate());
        assert_eq!(form.status(), FormStatus::Editing);
        assert!(form.begin_submit().is_ok());
        assert_eq!(form.status(), FormStatus::Submitting);
    }
}
