//! Authentication module for the admin console
//!
//! This module talks to the ranking API's `/auth` endpoints, reads the
//! claims of the tokens it hands out, and validates form input before
//! anything is sent.

mod claims;
mod gateway;
mod models;
pub mod validation;

pub use claims::{is_token_expired, normalize_role, Claims, RoleClaim};
#[cfg(test)]
pub use gateway::MockAuthGateway;
pub use gateway::{AuthGateway, HttpAuthGateway};
pub use models::{Credentials, PasswordReset, RegisterRequest, TokenPair};
