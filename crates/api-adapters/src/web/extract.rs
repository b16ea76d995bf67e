use std::sync::Arc;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use domains::{User, UserId};

use crate::state::AppState;
use crate::web::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";

/// The user named by the `x-user-id` header, loaded fresh per request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let id: UserId = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .ok_or(ApiError::Unauthenticated)?;

        match state.profile.me(id).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(services::ServiceError::NotFound { .. }) => Err(ApiError::Unauthenticated),
            Err(err) => Err(err.into()),
        }
    }
}

/// No header means an anonymous caller; a header naming an unknown user is
/// still rejected.
impl OptionalFromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(USER_HEADER) {
            return Ok(None);
        }
        <CurrentUser as FromRequestParts<Arc<AppState>>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
