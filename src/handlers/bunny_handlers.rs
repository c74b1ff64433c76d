//! HTTP handlers for `/bunnies`.
//!
//! Bunnies are reached through their home: a caller sees and edits only the
//! bunnies living in holes they own. `home` is addressed by location name.

use crate::{
    errors::ApiError,
    handlers::validation::Validator,
    middleware::identity::AuthUser,
    models::{
        bunny::{BunnyChanges, BunnyView, MAX_NAME_LEN},
        rabbit_hole::MAX_LOCATION_LEN,
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

#[derive(Debug, Default, Deserialize)]
pub struct BunnyPayload {
    pub name: Option<String>,
    pub home: Option<String>,
}

impl BunnyPayload {
    fn validated(self, partial: bool) -> Result<BunnyChanges, ApiError> {
        let mut v = Validator::new();
        let (name, home) = if partial {
            (self.name, self.home)
        } else {
            (v.required("name", self.name), v.required("home", self.home))
        };
        let changes = BunnyChanges {
            name: v.text("name", name, MAX_NAME_LEN),
            home: v.text("home", home, MAX_LOCATION_LEN),
        };
        v.finish()?;
        Ok(changes)
    }
}

/// GET `/bunnies`
pub async fn list_bunnies(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<BunnyView>>, ApiError> {
    let bunnies = state.warren.list_bunnies(&user).await?;
    Ok(Json(bunnies))
}

/// POST `/bunnies`: fails with 400 once the home is full.
pub async fn create_bunny(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<BunnyPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let changes = payload.validated(false)?;
    let (Some(name), Some(home)) = (changes.name, changes.home) else {
        return Err(ApiError::invalid("body", "name and home are required"));
    };

    let bunny = state.warren.create_bunny_in(&user, &home, &name).await?;
    Ok((StatusCode::CREATED, Json(bunny)))
}

/// GET `/bunnies/{id}`
pub async fn get_bunny(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<BunnyView>, ApiError> {
    let Path(id) = path?;
    let bunny = state.warren.get_bunny(&user, id).await?;
    Ok(Json(bunny))
}

/// PUT `/bunnies/{id}`
pub async fn replace_bunny(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BunnyPayload>, JsonRejection>,
) -> Result<Json<BunnyView>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let changes = payload.validated(false)?;
    let bunny = state.warren.update_bunny(&user, id, changes).await?;
    Ok(Json(bunny))
}

/// PATCH `/bunnies/{id}`
pub async fn patch_bunny(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BunnyPayload>, JsonRejection>,
) -> Result<Json<BunnyView>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let changes = payload.validated(true)?;
    let bunny = state.warren.update_bunny(&user, id, changes).await?;
    Ok(Json(bunny))
}

/// DELETE `/bunnies/{id}`
pub async fn delete_bunny(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    state.warren.delete_bunny(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
