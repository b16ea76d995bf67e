//! # Axum HTTP API
//!
//! JSON over HTTP. Callers identify themselves with the `x-user-id` header;
//! authentication proper is left to whatever sits in front of the service.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use extract::{CurrentUser, USER_HEADER};
pub use routes::router;
