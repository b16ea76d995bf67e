//! storage-adapters
//!
//! Implementations of the `domains` ports.
//!
//! - [`memory`]: DashMap-backed stores. The default backend for local runs
//!   and tests.
//! - `postgres` (feature `db-postgres`): sqlx-backed stores sharing one pool.
//! - [`seed`]: the sample quest and reward catalog.

pub mod memory;
pub mod seed;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::{
    InMemoryActivityStore, InMemoryProgressStore, InMemoryQuestCatalog, InMemoryRewardCatalog,
    InMemorySubmissionStore, InMemoryUserStore,
};

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
