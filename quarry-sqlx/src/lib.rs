//! # quarry-sqlx: relational backend for Quarry
//!
//! Runs [`quarry_core`] searches as SQL through an `sqlx::AnyPool`.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxAdapter`] | `SearchAdapter` over a pool and a base [`Select`] |
//! | [`Select`] | `SELECT` builder used as base query and metadata statement |
//! | [`DatabaseConfig`] | `search.database.*` section, opens the pool |
//! | [`DatabaseSearch`] | `searcher.database(pool, select)` |
//! | [`SqlxErrorExt`] | `sqlx::Error` → `SearchError` (`.into_search_error()`) |
//!
//! # Feature flags
//!
//! Enable the drivers the `Any` pool should be able to reach:
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//! | `mysql`    | MySQL via `sqlx/mysql` |
//!
//! # Quick start
//!
//! ```ignore
//! use quarry_sqlx::{DatabaseConfig, DatabaseSearch, Select};
//!
//! let database = DatabaseConfig::from_config(&config)?;
//! let pool = database.connect().await?;
//!
//! let people = searcher
//!     .database::<Person>(pool, Select::new("person").dialect(database.dialect()))
//!     .filters(["first_name", "last_name"])
//!     .search_filters(["first_name", "last_name"])
//!     .query(&params)
//!     .path("/people")
//!     .exec()
//!     .await?;
//! ```
//!
//! Filter values are bound as strings; the database coerces them to the
//! column type.

pub mod adapter;
pub mod config;
pub mod error;
pub mod query;

pub use adapter::{DatabaseSearch, SqlxAdapter};
pub use config::DatabaseConfig;
pub use error::{SqlxErrorExt, SqlxResult};
pub use query::{Dialect, IdentifierPolicy, QueryError, Select};

/// Re-exports of the most commonly used types from both `quarry-core` and this crate.
pub mod prelude {
    pub use crate::{DatabaseConfig, DatabaseSearch, Dialect, Select, SqlxAdapter, SqlxErrorExt};
    pub use quarry_core::prelude::*;
}
