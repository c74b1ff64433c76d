//! Represents an identity that can authenticate against the API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// An API user.
///
/// Users are provisioned out of band and authenticate with their
/// `api_token` as a bearer token. The role flags drive permission checks.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct User {
    /// Primary key.
    pub id: i64,

    /// Unique login name.
    pub username: String,

    /// Secret bearer token. Never serialized.
    #[serde(skip_serializing)]
    pub api_token: String,

    /// Inactive users are treated as anonymous.
    pub is_active: bool,

    /// Superusers may delete rabbit holes they do not own.
    pub is_superuser: bool,

    /// Foxes may sniff out nearby rabbit holes.
    pub is_fox: bool,

    /// When the user was provisioned.
    pub created_at: DateTime<Utc>,
}

/// Role flags applied when provisioning a user.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRoles {
    pub superuser: bool,
    pub fox: bool,
}
