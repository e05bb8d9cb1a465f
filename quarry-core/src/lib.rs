//! Backend-agnostic search and listing.
//!
//! A [`SearchHandler`] collects filters, free text, ordering, paging and
//! metadata entries, freezes them into a [`SearchRequest`] and hands that to
//! a [`SearchAdapter`]. The adapter populates the bound result and returns
//! the total; the handler turns it into a [`SearchResult`] with
//! [`Pagination`] links.

pub mod adapter;
pub mod config;
pub mod error;
pub mod handler;
pub mod layers;
pub mod metadata;
pub mod order;
pub mod pagination;
pub mod request;
pub mod result;
pub mod searcher;

pub use adapter::{Backend, Bindings, SearchAdapter};
pub use config::{
    ConfigError, ConfigSection, ConfigValue, FromConfigValue, QuarryConfig, SearchConfig,
};
pub use error::SearchError;
pub use handler::SearchHandler;
pub use layers::{init_tracing, init_tracing_from};
pub use metadata::{MetadataContext, MetadataSet, MetadataSource};
pub use order::{Direction, Order};
pub use pagination::Pagination;
pub use request::{SearchRequest, PAGE_PARAM, SEARCH_PARAM, SIZE_PARAM};
pub use result::SearchResult;
pub use searcher::Searcher;

pub mod prelude {
    //! Re-exports of the most commonly used search types.
    pub use crate::{
        Backend, Bindings, Direction, MetadataContext, Order, Pagination, SearchAdapter,
        SearchError, SearchHandler, SearchRequest, SearchResult, Searcher,
    };
}
