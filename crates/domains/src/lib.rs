//! domains
//!
//! Data model and port definitions for QuestHub. No I/O happens here.

pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;
