//! Form state machines for the auth views.
//!
//! Forms own their field values and errors, validate locally, and hand the
//! actual work to the [`SessionStore`](crate::session::SessionStore).

mod login;
mod register;

use std::collections::BTreeMap;

pub use login::{LoginField, LoginForm};
pub use register::{RegisterField, RegisterForm};

use crate::error::{AppError, ErrorKind, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Validating,
    Submitting,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submit was already in flight.
    Ignored,
    /// Rejected by client-side validation; nothing was sent.
    Invalid,
    Failed(ErrorKind),
    Succeeded,
}

/// A form's fields, named on the wire the way the API names them.
pub trait FormField: Copy + Ord + 'static {
    const ALL: &'static [Self];

    fn key(self) -> &'static str;

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }
}

pub(crate) fn field_errors<F: FormField>(errors: &ValidationErrors) -> (BTreeMap<F, String>, Option<String>) {
    let mut fields = BTreeMap::new();
    let mut unmatched = None;
    for (key, message) in errors.iter() {
        match F::from_key(key) {
            Some(field) => {
                fields.insert(field, message.to_string());
            }
            None => {
                unmatched.get_or_insert_with(|| message.to_string());
            }
        }
    }
    (fields, unmatched)
}

/// Splits a failed submit into per-field messages and a banner.
pub(crate) fn classify_failure<F: FormField>(
    err: &AppError,
) -> (BTreeMap<F, String>, Option<String>, ErrorKind) {
    match err {
        AppError::ValidationError(errors) => {
            let (fields, banner) = field_errors(errors);
            (fields, banner, ErrorKind::Validation)
        }
        other => (BTreeMap::new(), other.banner_message(), other.kind()),
    }
}
