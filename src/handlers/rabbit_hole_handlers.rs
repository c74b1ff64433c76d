//! HTTP handlers for `/rabbitholes`.
//!
//! All routes require an authenticated caller and only ever expose holes the
//! caller owns. On create the owner is always the caller; an `owner` member in
//! the body is ignored along with any other unknown member.

use crate::{
    errors::ApiError,
    handlers::validation::{self, Validator},
    middleware::identity::AuthUser,
    models::rabbit_hole::{
        DEFAULT_BUNNIES_LIMIT, MAX_LOCATION_LEN, NewRabbitHole, RabbitHoleChanges, RabbitHoleView,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

/// Body accepted by create, replace and partial update.
#[derive(Debug, Default, Deserialize)]
pub struct RabbitHolePayload {
    pub location: Option<String>,
    pub bunnies_limit: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RabbitHolePayload {
    fn validated(self, partial: bool) -> Result<RabbitHoleChanges, ApiError> {
        let mut v = Validator::new();
        let (location, latitude, longitude) = if partial {
            (self.location, self.latitude, self.longitude)
        } else {
            (
                v.required("location", self.location),
                v.required("latitude", self.latitude),
                v.required("longitude", self.longitude),
            )
        };

        let changes = RabbitHoleChanges {
            location: v.text("location", location, MAX_LOCATION_LEN),
            bunnies_limit: v.non_negative("bunnies_limit", self.bunnies_limit),
            latitude: validation::latitude(&mut v, latitude),
            longitude: validation::longitude(&mut v, longitude),
        };
        v.finish()?;
        Ok(changes)
    }

    fn into_new(self) -> Result<NewRabbitHole, ApiError> {
        let changes = self.validated(false)?;
        match (changes.location, changes.latitude, changes.longitude) {
            (Some(location), Some(latitude), Some(longitude)) => Ok(NewRabbitHole {
                location,
                bunnies_limit: changes.bunnies_limit.unwrap_or(DEFAULT_BUNNIES_LIMIT),
                latitude,
                longitude,
            }),
            _ => Err(ApiError::invalid("body", "location, latitude and longitude are required")),
        }
    }
}

/// GET `/rabbitholes`: the caller's holes.
pub async fn list_rabbit_holes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<RabbitHoleView>>, ApiError> {
    let holes = state.warren.list_holes(&user).await?;
    Ok(Json(holes))
}

/// POST `/rabbitholes`: create a hole owned by the caller.
pub async fn create_rabbit_hole(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<RabbitHolePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let new = payload.into_new()?;
    let hole = state.warren.create_hole(&user, new).await?;
    Ok((StatusCode::CREATED, Json(hole)))
}

/// GET `/rabbitholes/{id}`
pub async fn get_rabbit_hole(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<RabbitHoleView>, ApiError> {
    let Path(id) = path?;
    let hole = state.warren.get_hole(&user, id).await?;
    Ok(Json(hole))
}

/// PUT `/rabbitholes/{id}`: location and coordinates are required.
pub async fn replace_rabbit_hole(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RabbitHolePayload>, JsonRejection>,
) -> Result<Json<RabbitHoleView>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let changes = payload.validated(false)?;
    let hole = state.warren.update_hole(&user, id, changes).await?;
    Ok(Json(hole))
}

/// PATCH `/rabbitholes/{id}`: any subset of fields.
pub async fn patch_rabbit_hole(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RabbitHolePayload>, JsonRejection>,
) -> Result<Json<RabbitHoleView>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let changes = payload.validated(true)?;
    let hole = state.warren.update_hole(&user, id, changes).await?;
    Ok(Json(hole))
}

/// DELETE `/rabbitholes/{id}`: owner or superuser.
pub async fn delete_rabbit_hole(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    state.warren.delete_hole(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
