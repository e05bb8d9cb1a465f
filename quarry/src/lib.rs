//! Quarry: backend-agnostic search and listing.
//!
//! This facade crate re-exports the Quarry sub-crates through a single
//! dependency with feature flags:
//!
//! ```ignore
//! use quarry::prelude::*;
//!
//! let searcher = Searcher::from_config(&QuarryConfig::load("prod")?)?;
//! let people = searcher
//!     .database::<Person>(pool, Select::new("person"))
//!     .filters(["first_name", "last_name"])
//!     .query(&params)
//!     .path("/people")
//!     .exec()
//!     .await?;
//! ```
//!
//! # Feature flags
//!
//! | Feature    | Default | Crate                      |
//! |------------|---------|----------------------------|
//! | `sqlx`     | no      | `quarry-sqlx`              |
//! | `sqlite`   | no      | `quarry-sqlx/sqlite`       |
//! | `postgres` | no      | `quarry-sqlx/postgres`     |
//! | `mysql`    | no      | `quarry-sqlx/mysql`        |
//! | `elastic`  | no      | `quarry-elastic`           |
//! | `test`     | no      | `quarry-test`              |
//! | `full`     | no      | All of the above           |

pub extern crate quarry_core;

// Re-export everything from quarry-core at the top level for convenience.
pub use quarry_core::*;

#[cfg(feature = "sqlx")]
pub use quarry_sqlx;

#[cfg(feature = "elastic")]
pub use quarry_elastic;

#[cfg(feature = "test")]
pub use quarry_test;

/// Unified prelude. Import everything with `use quarry::prelude::*`.
///
/// Includes the core prelude plus types from all enabled backend crates.
pub mod prelude {
    pub use quarry_core::prelude::*;
    pub use quarry_core::{QuarryConfig, SearchConfig};

    #[cfg(feature = "sqlx")]
    pub use quarry_sqlx::prelude::*;

    #[cfg(feature = "elastic")]
    pub use quarry_elastic::prelude::*;

    #[cfg(feature = "test")]
    pub use quarry_test::{Call, Collection, MemoryAdapter};
}
