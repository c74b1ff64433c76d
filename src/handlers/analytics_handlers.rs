//! `GET /`: API version, server time and visit totals.

use crate::{errors::ApiError, models::visit::VisitSummary, state::AppState};
use axum::{Json, extract::State};
use chrono::Utc;

pub async fn visit_summary(State(state): State<AppState>) -> Result<Json<VisitSummary>, ApiError> {
    let summary = state.visits.summary(Utc::now()).await?;
    Ok(Json(summary))
}
