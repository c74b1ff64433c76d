//! Bearer-token identity resolution and the extractors built on it.
//!
//! [`authenticate`] never rejects: it attaches the resolved [`User`] to the
//! request extensions when the token matches an active user and otherwise
//! leaves the request anonymous. Handlers decide what anonymity means by
//! asking for [`AuthUser`] or [`FoxUser`].

use crate::{errors::ApiError, models::user::User, state::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = bearer_token(req.headers()).map(str::to_owned);
    if let Some(token) = token {
        let resolved = state.users.find_by_token(&token).await;
        match resolved {
            Ok(Some(user)) => {
                tracing::debug!(user_id = user.id, "authenticated request");
                req.extensions_mut().insert(user);
            }
            Ok(None) => tracing::debug!("unknown or inactive bearer token"),
            Err(err) => tracing::warn!("identity lookup failed: {}", err),
        }
    }

    next.run(req).await
}

/// The authenticated caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError::AuthenticationRequired)
    }
}

/// An authenticated caller holding the fox role.
#[derive(Debug, Clone)]
pub struct FoxUser(pub User);

impl<S> FromRequestParts<S> for FoxUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.is_fox {
            Ok(FoxUser(user))
        } else {
            Err(ApiError::permission_denied(
                "not_a_fox",
                "Only foxes may sniff out rabbit holes.",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_bearer_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn ignores_other_schemes_and_blank_tokens() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
