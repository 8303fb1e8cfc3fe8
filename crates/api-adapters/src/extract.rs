//! Request extractors: bearer tokens and the acting user.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domains::{Actor, DomainError};

use crate::error::{ActionRejection, ApiError};
use crate::state::AppState;

/// The raw token from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    fn from_parts(parts: &Parts) -> Option<Self> {
        let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| Self(token.to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts).ok_or(ApiError::Unauthorized)
    }
}

/// Verifies the token and syncs the local user.
async fn resolve_actor(parts: &Parts, state: &AppState) -> Result<Actor, ApiError> {
    let token = BearerToken::from_parts(parts).ok_or(ApiError::Unauthorized)?;
    state
        .users
        .authenticate(&token.0)
        .await?
        .ok_or(ApiError::from(DomainError::NotAuthenticated))
}

/// Actor for read routes. Rejects with `{"error": "Unauthorized"}`.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_actor(parts, state).await.map(Self)
    }
}

/// Actor for mutating routes. Rejects with
/// `{"success": false, "error": "Unauthorized"}`.
#[derive(Debug, Clone)]
pub struct ActingUser(pub Actor);

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = ActionRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_actor(parts, state).await.map(Self).map_err(ActionRejection)
    }
}
