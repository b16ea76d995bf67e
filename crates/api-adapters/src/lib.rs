//! api-adapters
//!
//! Outer surfaces for QuestHub. The HTTP API lives behind the `web-axum`
//! feature; [`AppState`] is always available so other front ends can reuse
//! the per-user redemption flows.

pub mod state;

#[cfg(feature = "web-axum")]
pub mod web;

pub use state::{AppOptions, AppState};
