//! Client-side checks run before any request leaves the process.

use std::sync::LazyLock;

use regex::Regex;

use super::models::{Credentials, PasswordReset, RegisterRequest};
use crate::error::ValidationErrors;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 100;
const PASSWORD_SPECIALS: &str = "@#$%^&+=!*";

// Wire names of the validated fields.
pub const USERNAME_OR_EMAIL: &str = "usernameOrEmail";
pub const PASSWORD: &str = "password";
pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const USERNAME: &str = "username";
pub const EMAIL: &str = "email";
pub const PASSWORD_CONFIRMATION: &str = "passwordConfirmation";
pub const TOKEN: &str = "token";
pub const NEW_PASSWORD: &str = "newPassword";
pub const CONFIRM_PASSWORD: &str = "confirmPassword";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@(.+)$").expect("static email pattern"));
static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,20}$").expect("static username pattern"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

fn check_password_length(
    errors: &mut ValidationErrors,
    field: &str,
    password: &str,
    min_length: usize,
) {
    if password.is_empty() {
        errors.add(field, "Password is required");
    } else if password.chars().count() < min_length {
        errors.add(
            field,
            format!("Password must be at least {} characters", min_length),
        );
    }
}

/// Login form rules: identifier required, password at least `min_length`.
pub fn validate_credentials(
    credentials: &Credentials,
    min_length: usize,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if credentials.username_or_email.trim().is_empty() {
        errors.add(USERNAME_OR_EMAIL, "Username or email is required");
    }
    check_password_length(&mut errors, PASSWORD, &credentials.password, min_length);
    errors.into_result()
}

pub fn validate_registration(request: &RegisterRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if request.first_name.trim().is_empty() {
        errors.add(FIRST_NAME, "First name is required");
    }
    if request.last_name.trim().is_empty() {
        errors.add(LAST_NAME, "Last name is required");
    }

    let username = request.username.trim();
    if username.is_empty() {
        errors.add(USERNAME, "Username is required");
    } else if !(3..=20).contains(&username.chars().count()) {
        errors.add(USERNAME, "Username must be between 3 and 20 characters");
    } else if !USERNAME_PATTERN.is_match(username) {
        errors.add(
            USERNAME,
            "Username must contain only letters, numbers, and underscores",
        );
    }

    if request.email.trim().is_empty() {
        errors.add(EMAIL, "Email is required");
    } else if !is_valid_email(&request.email) {
        errors.add(EMAIL, "Email must be valid");
    }

    let password = &request.password;
    check_password_length(&mut errors, PASSWORD, password, MIN_PASSWORD_LENGTH);
    if password.chars().count() > MAX_PASSWORD_LENGTH {
        errors.add(
            PASSWORD,
            format!("Password must be at most {} characters", MAX_PASSWORD_LENGTH),
        );
    }
    let complex = password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if !complex {
        errors.add(
            PASSWORD,
            "Password must contain at least one digit, lowercase letter, uppercase letter, and special character",
        );
    }

    if request.password_confirmation.is_empty() {
        errors.add(PASSWORD_CONFIRMATION, "Password confirmation is required");
    } else if request.password_confirmation != request.password {
        errors.add(
            PASSWORD_CONFIRMATION,
            "Password and confirmation must match",
        );
    }

    errors.into_result()
}

pub fn validate_reset_email(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if email.trim().is_empty() {
        errors.add(EMAIL, "Email is required");
    } else if !is_valid_email(email) {
        errors.add(EMAIL, "Email must be valid");
    }
    errors.into_result()
}

pub fn validate_password_reset(
    reset: &PasswordReset,
    min_length: usize,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if reset.token.trim().is_empty() {
        errors.add(TOKEN, "Reset token is required");
    }
    check_password_length(&mut errors, NEW_PASSWORD, &reset.new_password, min_length);
    if reset.confirm_password != reset.new_password {
        errors.add(CONFIRM_PASSWORD, "Passwords do not match");
    }
    errors.into_result()
}
