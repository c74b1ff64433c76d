//! Shared helpers: in-memory database, users, and a oneshot HTTP client.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use warren::{
    db,
    models::{
        rabbit_hole::{NewRabbitHole, RabbitHole},
        user::{User, UserRoles},
    },
    routes::routes::app,
    state::AppState,
};

/// Fresh in-memory database with the schema applied.
pub async fn setup() -> AppState {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    AppState::new(Arc::new(pool))
}

pub async fn user(state: &AppState, username: &str) -> User {
    state
        .users
        .create_user(username, UserRoles::default())
        .await
        .unwrap()
}

pub async fn user_with_roles(state: &AppState, username: &str, roles: UserRoles) -> User {
    state.users.create_user(username, roles).await.unwrap()
}

pub async fn hole(
    state: &AppState,
    owner: &User,
    location: &str,
    bunnies_limit: i64,
    latitude: f64,
    longitude: f64,
) -> RabbitHole {
    let view = state
        .warren
        .create_hole(
            owner,
            NewRabbitHole {
                location: location.into(),
                bunnies_limit,
                latitude,
                longitude,
            },
        )
        .await
        .unwrap();
    state.warren.fetch_hole(view.id).await.unwrap()
}

/// Insert bunnies directly, bypassing the quota gate (bulk fixtures).
pub async fn raw_bunnies(state: &AppState, hole: &RabbitHole, names: &[&str]) {
    for name in names {
        sqlx::query("INSERT INTO bunnies (name, home_id) VALUES (?, ?)")
            .bind(name)
            .bind(hole.id)
            .execute(&*state.db)
            .await
            .unwrap();
    }
}

/// Send one request through the full app and decode the JSON reply.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn router(state: &AppState) -> Router {
    app(state.clone())
}
