//! Represents a rabbit hole: a named, geolocated home for bunnies.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Number of bunnies a hole accepts when the creator does not say otherwise.
pub const DEFAULT_BUNNIES_LIMIT: i64 = 5;

/// Upper bound on `location` length, in characters.
pub const MAX_LOCATION_LEN: usize = 64;

/// A rabbit hole row.
///
/// `location` is globally unique. Bunnies are gated on `bunnies_limit` at
/// insertion time only, so rows written around the service can exceed it.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct RabbitHole {
    /// Primary key.
    pub id: i64,

    /// Unique human-readable location name.
    pub location: String,

    /// ID of the user that owns this hole.
    pub owner_id: i64,

    /// Maximum number of bunnies the hole accepts.
    pub bunnies_limit: i64,

    pub latitude: f64,
    pub longitude: f64,
}

/// A rabbit hole as returned by the API, with its residents expanded.
#[derive(Serialize, Clone, Debug)]
pub struct RabbitHoleView {
    pub id: i64,
    pub location: String,
    pub owner: i64,
    pub bunnies_limit: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Names of the bunnies living here, in insertion order.
    pub bunnies: Vec<String>,
    pub bunny_count: usize,
}

impl RabbitHoleView {
    pub fn new(hole: RabbitHole, bunnies: Vec<String>) -> Self {
        Self {
            id: hole.id,
            location: hole.location,
            owner: hole.owner_id,
            bunnies_limit: hole.bunnies_limit,
            latitude: hole.latitude,
            longitude: hole.longitude,
            bunny_count: bunnies.len(),
            bunnies,
        }
    }
}

/// Validated input for creating a rabbit hole.
#[derive(Debug, Clone)]
pub struct NewRabbitHole {
    pub location: String,
    pub bunnies_limit: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Validated partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct RabbitHoleChanges {
    pub location: Option<String>,
    pub bunnies_limit: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The populated hole closest to a fox.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NearbyRabbitHole {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}
