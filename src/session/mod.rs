//! Session module for the admin console
//!
//! Holds the current identity and tokens, and the login, logout, refresh
//! and restore flows that change them.

mod models;
mod storage;
mod store;

pub use models::{LogoutOptions, Session, SessionState};
pub use storage::{MemoryTokenStorage, TokenStorage};
pub use store::SessionStore;
