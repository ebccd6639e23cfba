//! User profile domain type.
//!
//! Profiles are created by the external identity provider; the catalog only
//! reads them.

use chrono::{DateTime, Utc};

use widgetvault_core::UserId;

/// A user profile (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Unique user ID, shared with the identity provider.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Public URL of the user's avatar, if set.
    pub avatar_url: Option<String>,
    /// Short bio, if set.
    pub bio: Option<String>,
    /// Number of widgets this user owns, derived at read time.
    pub widget_count: usize,
    /// When the profile was created.
    pub joined_at: DateTime<Utc>,
}
