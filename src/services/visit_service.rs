//! VisitService: per-user visit counting and the analytics summary.
//!
//! Counting is an upsert in SQLite, so it stays correct however many
//! server processes share the database.

use super::ServiceResult;
use crate::models::visit::{UserVisit, VisitSummary};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

pub const API_VERSION: f32 = 1.0;

#[derive(Clone)]
pub struct VisitService {
    pub db: Arc<SqlitePool>,
}

impl VisitService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Bump the visit counter for `user_id`, creating the row on first sight.
    pub async fn record_visit(&self, user_id: i64, at: DateTime<Utc>) -> ServiceResult<UserVisit> {
        let visit = sqlx::query_as::<_, UserVisit>(
            r#"
            INSERT INTO user_visits (user_id, last_seen, visits)
            VALUES (?, ?, 1)
            ON CONFLICT(user_id) DO UPDATE SET
                visits = visits + 1,
                last_seen = excluded.last_seen
            RETURNING id, user_id, last_seen, visits
            "#,
        )
        .bind(user_id)
        .bind(at)
        .fetch_one(&*self.db)
        .await?;

        Ok(visit)
    }

    pub async fn get(&self, user_id: i64) -> ServiceResult<Option<UserVisit>> {
        let visit = sqlx::query_as::<_, UserVisit>(
            "SELECT id, user_id, last_seen, visits FROM user_visits WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(visit)
    }

    /// Totals as of `now`. A visitor is recent when seen within the last hour.
    pub async fn summary(&self, now: DateTime<Utc>) -> ServiceResult<VisitSummary> {
        let since = now - Duration::hours(1);

        let (all_visitors, all_visits): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(visits), 0) FROM user_visits",
        )
        .fetch_one(&*self.db)
        .await?;

        let recent_visitors: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_visits WHERE last_seen >= ?")
                .bind(since)
                .fetch_one(&*self.db)
                .await?;

        Ok(VisitSummary {
            version: API_VERSION,
            time: now,
            recent_visitors,
            all_visitors,
            all_visits,
        })
    }
}
