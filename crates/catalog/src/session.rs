//! Session resolution.
//!
//! Sign-in and sign-out live with the external identity provider; the
//! catalog only needs to know who the current user is. Every engine
//! operation that stamps ownership or scopes favorites takes the resolved
//! [`Session`] explicitly rather than reading ambient state.

use async_trait::async_trait;
use thiserror::Error;

use widgetvault_core::UserId;

use crate::model::UserProfile;

/// The resolved current user for a sequence of catalog operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Profile of the signed-in user.
    pub user: UserProfile,
}

impl Session {
    /// Convenience accessor for the signed-in user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

/// Errors that can occur while resolving the current user.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No user is signed in.
    #[error("no user is signed in")]
    NotSignedIn,

    /// The identity provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Port to the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the currently signed-in user, or `None` when signed out.
    async fn current_user(&self) -> Result<Option<UserProfile>, IdentityError>;
}

/// Resolve a [`Session`] at the application boundary.
///
/// # Errors
///
/// Returns [`IdentityError::NotSignedIn`] when no user is signed in, or the
/// provider's own error when resolution fails.
pub async fn resolve_session(provider: &dyn IdentityProvider) -> Result<Session, IdentityError> {
    match provider.current_user().await? {
        Some(user) => Ok(Session { user }),
        None => Err(IdentityError::NotSignedIn),
    }
}

/// A fixed identity, for tests and single-user embedding.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user: Option<UserProfile>,
}

impl StaticIdentity {
    /// Provider that always reports `user` as signed in.
    #[must_use]
    pub const fn signed_in(user: UserProfile) -> Self {
        Self { user: Some(user) }
    }

    /// Provider that always reports signed out.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Result<Option<UserProfile>, IdentityError> {
        Ok(self.user.clone())
    }
}
