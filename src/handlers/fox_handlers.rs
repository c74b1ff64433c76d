//! `GET /foxes/nearby`: for foxes looking for dinner.

use crate::{
    errors::ApiError,
    handlers::validation::{self, Validator},
    middleware::identity::FoxUser,
    models::rabbit_hole::NearbyRabbitHole,
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Closest rabbit hole with at least one bunny in it, measured from the
/// fox's current position.
pub async fn nearby_rabbit_hole(
    State(state): State<AppState>,
    FoxUser(fox): FoxUser,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<NearbyRabbitHole>, ApiError> {
    let Query(query) = query?;

    let mut v = Validator::new();
    let latitude = v.required("latitude", query.latitude);
    let latitude = validation::latitude(&mut v, latitude);
    let longitude = v.required("longitude", query.longitude);
    let longitude = validation::longitude(&mut v, longitude);
    v.finish()?;

    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(ApiError::invalid("query", "latitude and longitude are required"));
    };

    tracing::debug!(fox_id = fox.id, latitude, longitude, "fox sniffing");
    let nearest = state.foxes.nearest_populated(latitude, longitude).await?;
    Ok(Json(nearest))
}
