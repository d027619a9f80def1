//! Request-scoped session context.
//!
//! A [`Session`] is an explicit value passed into every core operation that
//! needs an authenticated identity — there is no process-global session
//! state. The calling boundary is responsible for materializing it from
//! whatever transport it uses (the HTTP layer round-trips it through a
//! signed cookie) and for persisting it back after the operation returns.
//!
//! State machine: `Anonymous` → (successful credential check) →
//! `Authenticated` → (logout, or forced invalidation after a password
//! change) → `Anonymous`. No other transitions exist.

use serde::{Deserialize, Serialize};

/// The identity an authenticated session acts on behalf of.
///
/// `username` and `full_name` are display caches copied from the user row at
/// login time; `username` is refreshed in place when a profile update renames
/// the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    /// Extended-lifetime ("remember me") trust vs. an ordinary session.
    pub remember: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    /// Bind this session to a user after a successful credential check.
    pub fn establish(&mut self, user_id: i64, username: &str, full_name: &str, remember: bool) {
        *self = Session::Authenticated(Identity {
            user_id,
            username: username.to_string(),
            full_name: full_name.to_string(),
            remember,
        });
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(identity) => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// Refresh the cached display username without re-authenticating.
    /// No-op on an anonymous session.
    pub fn update_display_username(&mut self, new_username: &str) {
        if let Session::Authenticated(identity) = self {
            identity.username = new_username.to_string();
        }
    }

    /// Clear all session state unconditionally.
    pub fn invalidate(&mut self) {
        *self = Session::Anonymous;
    }
}
