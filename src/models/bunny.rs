//! Represents a bunny living in a rabbit hole.

use serde::Serialize;
use sqlx::FromRow;

/// Upper bound on a bunny name, in characters.
pub const MAX_NAME_LEN: usize = 64;

/// A bunny row.
#[derive(Serialize, Clone, FromRow, Debug, PartialEq)]
pub struct Bunny {
    pub id: i64,
    pub name: String,

    /// Foreign key to the rabbit hole this bunny lives in.
    pub home_id: i64,
}

/// A bunny as returned by the API.
#[derive(Serialize, Clone, Debug)]
pub struct BunnyView {
    pub id: i64,
    pub name: String,

    /// Location name of the home hole.
    pub home: String,

    /// Names of the other bunnies sharing the same hole, ordered by id.
    pub family_members: Vec<String>,
}

/// Validated partial update for a bunny.
#[derive(Debug, Clone, Default)]
pub struct BunnyChanges {
    pub name: Option<String>,
    /// Location of the hole to move into.
    pub home: Option<String>,
}
