//! Defines every HTTP route of the service.
//!
//! ## Structure
//! - `GET    /`                 : visit analytics summary
//! - `GET    /healthz`, `/readyz`: probes
//! - `GET    /rabbitholes`      : list the caller's holes
//! - `POST   /rabbitholes`      : create a hole owned by the caller
//! - `GET|PUT|PATCH|DELETE /rabbitholes/{id}`
//! - `GET    /bunnies`          : list bunnies in the caller's holes
//! - `POST   /bunnies`          : create a bunny (quota-gated)
//! - `GET|PUT|PATCH|DELETE /bunnies/{id}`
//! - `GET    /foxes/nearby`     : nearest populated hole (foxes only)

use crate::{
    handlers::{
        analytics_handlers::visit_summary,
        bunny_handlers::{
            create_bunny, delete_bunny, get_bunny, list_bunnies, patch_bunny, replace_bunny,
        },
        fox_handlers::nearby_rabbit_hole,
        health_handlers::{healthz, readyz},
        rabbit_hole_handlers::{
            create_rabbit_hole, delete_rabbit_hole, get_rabbit_hole, list_rabbit_holes,
            patch_rabbit_hole, replace_rabbit_hole,
        },
    },
    middleware::{identity::authenticate, request_id::request_id, visits::track_visits},
    state::AppState,
};
use axum::{Router, middleware, routing::get};

/// Build the route table. Handlers expect the identity layers from [`app`].
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(visit_summary))
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route(
            "/rabbitholes",
            get(list_rabbit_holes).post(create_rabbit_hole),
        )
        .route(
            "/rabbitholes/{id}",
            get(get_rabbit_hole)
                .put(replace_rabbit_hole)
                .patch(patch_rabbit_hole)
                .delete(delete_rabbit_hole),
        )
        .route("/bunnies", get(list_bunnies).post(create_bunny))
        .route(
            "/bunnies/{id}",
            get(get_bunny)
                .put(replace_bunny)
                .patch(patch_bunny)
                .delete(delete_bunny),
        )
        .route("/foxes/nearby", get(nearby_rabbit_hole))
}

/// The full application: routes wrapped in the request pipeline.
///
/// Layers run outermost first: request id, identity resolution, visit
/// tracking, then the handler.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(middleware::from_fn_with_state(state.clone(), track_visits))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn(request_id))
        .with_state(state)
}
