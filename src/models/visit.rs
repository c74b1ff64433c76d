//! Per-user visit counters.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// How often and how recently a user hit the API.
///
/// One row per user, upserted on every authenticated request.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct UserVisit {
    pub id: i64,
    pub user_id: i64,
    pub last_seen: DateTime<Utc>,
    pub visits: i64,
}

/// Body of `GET /`.
#[derive(Serialize, Debug)]
pub struct VisitSummary {
    pub version: f32,
    pub time: DateTime<Utc>,
    pub recent_visitors: i64,
    pub all_visitors: i64,
    pub all_visits: i64,
}
