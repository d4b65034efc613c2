//! Logged-in user session.
//!
//! The session is a single [`User`] record persisted under
//! [`keys::SESSION`]. Nothing downstream reads it implicitly: callers resolve
//! the current user once and pass it to the operations that need it.

use food_cart_core::Role;
use thiserror::Error;
use tracing::warn;

use crate::api::User;
use crate::store::{KeyValueStore, StoreError, keys};

/// The user a request is made on behalf of.
pub type SessionUser = User;

/// Authorization failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No user is logged in.
    #[error("not logged in")]
    NotLoggedIn,

    /// The logged-in user lacks the required role.
    #[error("requires role {required}, logged in as {actual}")]
    Forbidden { required: Role, actual: Role },
}

impl User {
    /// Ensure the user has `role`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Forbidden`] if the user's role differs.
    pub fn require_role(&self, role: Role) -> Result<&Self, AuthError> {
        if self.role == role {
            Ok(self)
        } else {
            Err(AuthError::Forbidden {
                required: role,
                actual: self.role,
            })
        }
    }
}

/// Session persisted in a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap a key-value store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The logged-in user, if any.
    ///
    /// An unreadable or undecodable session counts as logged out.
    #[must_use]
    pub fn current(&self) -> Option<SessionUser> {
        let raw = match self.store.get(keys::SESSION) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read session");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "Stored session is malformed"))
            .ok()
    }

    /// The logged-in user, or [`AuthError::NotLoggedIn`].
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is logged in.
    pub fn require(&self) -> Result<SessionUser, AuthError> {
        self.current().ok_or(AuthError::NotLoggedIn)
    }

    /// Persist `user` as the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub fn save(&self, user: &SessionUser) -> Result<(), StoreError> {
        let raw = serde_json::to_string(user)?;
        self.store.set(keys::SESSION, &raw)
    }

    /// Forget the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.remove(keys::SESSION)
    }
}
