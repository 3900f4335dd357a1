//! Route gating
//!
//! A guard turns the current session state into a render decision for one
//! navigation. Guards are generic over an [`AccessPolicy`] that decides
//! whether a signed-in user may view the target.

use tracing::debug;

use crate::auth::normalize_role;
use crate::navigation::Navigator;
use crate::session::{Session, SessionState};

/// "Has the right to view".
pub trait AccessPolicy: Send + Sync {
    fn permits(&self, session: &Session) -> bool;
}

/// Any signed-in user.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

impl AccessPolicy for Authenticated {
    fn permits(&self, _session: &Session) -> bool {
        true
    }
}

/// Signed-in users holding a role.
#[derive(Debug, Clone)]
pub struct RequireRole {
    role: String,
}

impl RequireRole {
    pub fn new(role: &str) -> Self {
        Self {
            role: normalize_role(role),
        }
    }

    pub fn admin() -> Self {
        Self::new("admin")
    }

    pub fn role(&self) -> &str {
        &self.role
    }
}

impl AccessPolicy for RequireRole {
    fn permits(&self, session: &Session) -> bool {
        session.has_role(&self.role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still initializing: show only a loading indicator.
    Loading,
    Render,
    Redirect(String),
}

/// Outcome of rendering a guarded view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<V> {
    Loading,
    Content(V),
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct RouteGuard<P> {
    policy: P,
    login_path: String,
    landing_path: String,
}

impl RouteGuard<Authenticated> {
    pub fn authenticated(login_path: impl Into<String>) -> Self {
        let login_path = login_path.into();
        Self {
            policy: Authenticated,
            landing_path: login_path.clone(),
            login_path,
        }
    }
}

impl RouteGuard<RequireRole> {
    pub fn admin(login_path: impl Into<String>, landing_path: impl Into<String>) -> Self {
        Self::with_policy(RequireRole::admin(), login_path, landing_path)
    }
}

impl<P: AccessPolicy> RouteGuard<P> {
    /// `login_path` is where anonymous visitors go; `landing_path` is where
    /// signed-in users without the right to view go.
    pub fn with_policy(
        policy: P,
        login_path: impl Into<String>,
        landing_path: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            login_path: login_path.into(),
            landing_path: landing_path.into(),
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn evaluate(&self, state: &SessionState) -> GuardDecision {
        if state.initializing {
            return GuardDecision::Loading;
        }
        match &state.session {
            None => GuardDecision::Redirect(self.login_path.clone()),
            Some(session) if self.policy.permits(session) => GuardDecision::Render,
            Some(session) => {
                debug!("{} may not view this route", session.username);
                GuardDecision::Redirect(self.landing_path.clone())
            }
        }
    }

    /// Builds the view only when the decision is to render it.
    pub fn render<V>(&self, state: &SessionState, view: impl FnOnce() -> V) -> Guarded<V> {
        match self.evaluate(state) {
            GuardDecision::Loading => Guarded::Loading,
            GuardDecision::Render => Guarded::Content(view()),
            GuardDecision::Redirect(path) => Guarded::Redirect(path),
        }
    }

    /// Evaluates and performs the redirect, if any. Loading never navigates.
    pub fn enforce(&self, state: &SessionState, navigator: &dyn Navigator) -> GuardDecision {
        let decision = self.evaluate(state);
        if let GuardDecision::Redirect(path) = &decision {
            navigator.navigate(path);
        }
        decision
    }
}
