//! Mapping from service errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use services::{ErrorClass, QuestError, RedemptionError, ServiceError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, malformed or unknown `x-user-id`
    #[error("unknown or missing user")]
    Unauthenticated,

    #[error("{message}")]
    Service { class: ErrorClass, message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Service { class, .. } => match class {
                ErrorClass::Input => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorClass::Precondition | ErrorClass::InvalidTransition => StatusCode::CONFLICT,
                ErrorClass::NotFound => StatusCode::NOT_FOUND,
                ErrorClass::Forbidden => StatusCode::FORBIDDEN,
                ErrorClass::External => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }
}

macro_rules! from_service_error {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    ApiError::Service {
                        class: err.class(),
                        message: err.user_message(),
                    }
                }
            }
        )+
    };
}

from_service_error!(QuestError, RedemptionError, ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
