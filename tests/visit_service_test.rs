//! Integration tests for visit counting and the analytics summary.

mod common;

use chrono::{Duration, Utc};
use common::{setup, user};

#[tokio::test]
async fn first_visit_creates_the_record() {
    let state = setup().await;
    let u = user(&state, "visitor").await;
    assert!(state.visits.get(u.id).await.unwrap().is_none());

    let now = Utc::now();
    let visit = state.visits.record_visit(u.id, now).await.unwrap();
    assert_eq!(visit.visits, 1);
    assert_eq!(visit.user_id, u.id);
}

#[tokio::test]
async fn repeat_visits_increment_and_refresh() {
    let state = setup().await;
    let u = user(&state, "visitor").await;
    let earlier = Utc::now() - Duration::hours(3);
    let later = Utc::now();

    state.visits.record_visit(u.id, earlier).await.unwrap();
    state.visits.record_visit(u.id, earlier).await.unwrap();
    let visit = state.visits.record_visit(u.id, later).await.unwrap();

    assert_eq!(visit.visits, 3);
    assert_eq!(visit.last_seen.timestamp(), later.timestamp());
}

#[tokio::test]
async fn summary_splits_recent_from_stale_visitors() {
    let state = setup().await;
    let recent = user(&state, "recent").await;
    let stale = user(&state, "stale").await;
    let now = Utc::now();

    state.visits.record_visit(recent.id, now - Duration::minutes(5)).await.unwrap();
    state.visits.record_visit(recent.id, now - Duration::minutes(1)).await.unwrap();
    state.visits.record_visit(stale.id, now - Duration::hours(2)).await.unwrap();

    let summary = state.visits.summary(now).await.unwrap();
    assert_eq!(summary.all_visitors, 2);
    assert_eq!(summary.all_visits, 3);
    assert_eq!(summary.recent_visitors, 1);
    assert_eq!(summary.version, 1.0);
}

#[tokio::test]
async fn empty_summary_reports_zero_visits() {
    let state = setup().await;
    let summary = state.visits.summary(Utc::now()).await.unwrap();
    assert_eq!(summary.all_visitors, 0);
    assert_eq!(summary.all_visits, 0);
    assert_eq!(summary.recent_visitors, 0);
}
