//! Counts authenticated requests per user.
//!
//! Runs after identity resolution. A failed upsert is logged and the request
//! carries on: counting never gates a request.

use crate::{models::user::User, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

pub async fn track_visits(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Some(user_id) = req.extensions().get::<User>().map(|user| user.id) {
        if let Err(err) = state.visits.record_visit(user_id, Utc::now()).await {
            tracing::warn!(user_id, "failed to record visit: {}", err);
        }
    }

    next.run(req).await
}
