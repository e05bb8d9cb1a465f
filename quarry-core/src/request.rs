use std::collections::BTreeMap;

use crate::adapter::Backend;
use crate::metadata::MetadataSet;
use crate::order::Order;

/// Query key interpreted as the page number instead of a filter.
pub const PAGE_PARAM: &str = "page";
/// Query key interpreted as the page size instead of a filter.
pub const SIZE_PARAM: &str = "size";
/// Query key interpreted as the free-text term instead of a filter.
pub const SEARCH_PARAM: &str = "search";

/// Immutable description of one search, produced by
/// [`SearchHandler`](crate::SearchHandler) when it is executed.
///
/// This is the only thing an adapter sees of the caller's configuration.
pub struct SearchRequest<A: Backend, T> {
    pub(crate) filters: BTreeMap<String, String>,
    pub(crate) search: Option<String>,
    pub(crate) search_filters: Vec<String>,
    pub(crate) orders: Vec<Order>,
    pub(crate) page: u64,
    pub(crate) size: u64,
    pub(crate) max_size: u64,
    pub(crate) path: String,
    pub(crate) pagination: bool,
    pub(crate) metadata_enabled: bool,
    pub(crate) metadata: MetadataSet<A, T>,
}

impl<A: Backend, T> SearchRequest<A, T> {
    /// Equality filters keyed by internal column name.
    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// The raw free-text term, if one was given.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn search_filters(&self) -> &[String] {
        &self.search_filters
    }

    /// The free-text term when it applies, i.e. there is a term and at least
    /// one column to match it against.
    pub fn free_text(&self) -> Option<&str> {
        match (&self.search, self.search_filters.is_empty()) {
            (Some(term), false) => Some(term),
            _ => None,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// 1-based page; `0` means unset.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Effective page size, already clamped to the max size.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Row limit, present only for a positive size.
    pub fn limit(&self) -> Option<u64> {
        (self.size > 0).then_some(self.size)
    }

    /// Row offset `(page - 1) * size`, present only for a set page.
    /// Saturates at `u64::MAX` instead of overflowing.
    pub fn offset(&self) -> Option<u64> {
        (self.page > 0).then(|| (self.page - 1).saturating_mul(self.size))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn has_pagination(&self) -> bool {
        self.pagination
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata_enabled
    }

    pub fn metadata(&self) -> &MetadataSet<A, T> {
        &self.metadata
    }
}

impl<A: Backend, T> std::fmt::Debug for SearchRequest<A, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRequest")
            .field("filters", &self.filters)
            .field("search", &self.search)
            .field("search_filters", &self.search_filters)
            .field("orders", &self.orders)
            .field("page", &self.page)
            .field("size", &self.size)
            .field("max_size", &self.max_size)
            .field("path", &self.path)
            .field("pagination", &self.pagination)
            .field("metadata_enabled", &self.metadata_enabled)
            .field("metadata", &self.metadata.names().collect::<Vec<_>>())
            .finish()
    }
}
