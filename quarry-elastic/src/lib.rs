//! # quarry-elastic: search-index backend for Quarry
//!
//! Runs [`quarry_core`] searches against an Elasticsearch-compatible HTTP API.
//!
//! - Filters become `term` clauses in a boolean `must` list.
//! - The free-text term becomes one `query_string` clause over the search
//!   columns.
//! - Paging maps to `from`/`size`, orders to the `sort` list.
//! - With pagination enabled a `_count` call runs first; a zero count skips
//!   the `_search` call and metadata entirely.
//!
//! ```ignore
//! use quarry_elastic::{ElasticConfig, ElasticSearch, IndexQuery};
//!
//! let client = ElasticConfig::from_config(&config)?.client()?;
//! let people = searcher
//!     .elastic::<Person>(client, IndexQuery::new("people"))
//!     .filters(["last_name"])
//!     .search_filters(["first_name", "last_name"])
//!     .query(&params)
//!     .exec()
//!     .await?;
//! ```

pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod template;

pub use adapter::{ElasticAdapter, ElasticSearch};
pub use client::ElasticClient;
pub use config::ElasticConfig;
pub use error::ReqwestErrorExt;
pub use query::{IndexQuery, SearchBody};

pub mod prelude {
    pub use crate::{ElasticAdapter, ElasticClient, ElasticConfig, ElasticSearch, IndexQuery};
    pub use quarry_core::prelude::*;
}
