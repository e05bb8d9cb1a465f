use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;

use crate::adapter::{Backend, Bindings, SearchAdapter};
use crate::error::SearchError;
use crate::metadata::{MetadataContext, MetadataSet, MetadataSource};
use crate::order::{Direction, Order};
use crate::pagination::Pagination;
use crate::request::{SearchRequest, PAGE_PARAM, SEARCH_PARAM, SIZE_PARAM};
use crate::result::SearchResult;

/// Fluent configuration of one search.
///
/// Create one per call, configure it, then [`exec`](Self::exec) it; the
/// handler is consumed by execution.
///
/// # Example
///
/// ```ignore
/// let result = searcher
///     .database(pool, Select::new("person"))
///     .filters(["first_name", "last_name"])
///     .query(&params)
///     .search_filters(["first_name", "last_name"])
///     .order_by("age", Direction::Asc)
///     .path("http://api.local/people")
///     .max_size(10)
///     .bind(Vec::<Person>::new())
///     .exec()
///     .await?;
/// ```
pub struct SearchHandler<A: Backend, T> {
    adapter: A,
    allowed: BTreeMap<String, String>,
    candidates: Vec<(String, String)>,
    search: Option<String>,
    search_filters: Vec<String>,
    orders: Vec<Order>,
    page: u64,
    size: u64,
    max_size: u64,
    path: String,
    pagination: bool,
    metadata_enabled: bool,
    metadata: MetadataSet<A, T>,
    target: Vec<T>,
}

impl<A, T> SearchHandler<A, T>
where
    A: SearchAdapter<T>,
    T: Send + Sync + 'static,
{
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            allowed: BTreeMap::new(),
            candidates: Vec::new(),
            search: None,
            search_filters: Vec::new(),
            orders: Vec::new(),
            page: 0,
            size: 0,
            max_size: 0,
            path: String::new(),
            pagination: true,
            metadata_enabled: true,
            metadata: MetadataSet::new(),
            target: Vec::new(),
        }
    }

    /// Ingest caller-supplied key/value pairs (typically a query string).
    ///
    /// `page`, `size` and `search` set the matching controls; any other key
    /// becomes an equality filter only if it was allow-listed with
    /// [`filters`](Self::filters) or [`filter`](Self::filter), and is dropped
    /// silently otherwise. Values are HTML-entity decoded.
    pub fn query<I, K, V>(mut self, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        for (key, value) in query {
            let key = key.into();
            let value = html_escape::decode_html_entities(value.as_ref()).into_owned();
            match key.as_str() {
                PAGE_PARAM => self.page = parse_control(&value),
                SIZE_PARAM => self.size = parse_control(&value),
                SEARCH_PARAM => self.search = Some(value),
                _ => self.candidates.push((key, value)),
            }
        }
        self
    }

    /// Allow-list columns whose external and internal names match.
    pub fn filters<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            self.allowed.insert(column.clone(), column);
        }
        self
    }

    /// Allow-list one external query key, filtering on `internal` instead.
    pub fn filter(mut self, external: impl Into<String>, internal: impl Into<String>) -> Self {
        self.allowed.insert(external.into(), internal.into());
        self
    }

    /// Columns the free-text term is matched against (ORed).
    pub fn search_filters<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_filters.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Append a sort clause; clauses apply in the order they were added.
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.orders.push(Order::new(column, direction));
        self
    }

    pub fn page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    /// Requested page size. Clamped to [`max_size`](Self::max_size) at execution.
    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Upper bound for the page size; `0` disables the ceiling.
    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Base path the pagination links are rendered against.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn without_pagination(mut self) -> Self {
        self.pagination = false;
        self
    }

    pub fn without_metadata(mut self) -> Self {
        self.metadata_enabled = false;
        self
    }

    /// Register a native sub-query whose rows are exposed under `name`.
    pub fn metadata<M>(mut self, name: impl Into<String>, statement: A::Statement, target: Vec<M>) -> Self
    where
        A: SearchAdapter<M>,
        M: Serialize + Send + Sync + 'static,
    {
        self.metadata
            .insert(name, MetadataSource::statement(statement, target));
        self
    }

    /// Register a callback that populates `target` from the primary result.
    pub fn metadata_function<M, F, Fut>(mut self, name: impl Into<String>, callback: F, target: M) -> Self
    where
        F: for<'c> Fn(MetadataContext<'c, T>, M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<M, SearchError>> + Send + 'static,
        M: Clone + Serialize + Send + Sync + 'static,
    {
        self.metadata
            .insert(name, MetadataSource::function(callback, target));
        self
    }

    /// Initial value of the primary result; left untouched when nothing matches.
    pub fn bind(mut self, target: Vec<T>) -> Self {
        self.target = target;
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Clamp the size, promote allow-listed query keys to filters and freeze
    /// everything into a [`SearchRequest`].
    pub fn freeze(self) -> (A, SearchRequest<A, T>, Bindings<T>) {
        let size = if self.max_size > 0 && self.size > self.max_size {
            self.max_size
        } else {
            self.size
        };

        let mut filters = BTreeMap::new();
        for (key, value) in self.candidates {
            match self.allowed.get(&key) {
                Some(internal) => {
                    filters.insert(internal.clone(), value);
                }
                None => tracing::trace!(key = %key, "dropping query key that is not a declared filter"),
            }
        }

        let request = SearchRequest {
            filters,
            search: self.search,
            search_filters: self.search_filters,
            orders: self.orders,
            page: self.page,
            size,
            max_size: self.max_size,
            path: self.path,
            pagination: self.pagination,
            metadata_enabled: self.metadata_enabled,
            metadata: self.metadata,
        };
        (self.adapter, request, Bindings::new(self.target))
    }

    /// Run the search and assemble the envelope.
    pub async fn exec(self) -> Result<SearchResult<T>, SearchError> {
        let (adapter, request, mut bindings) = self.freeze();
        tracing::debug!(
            backend = adapter.name(),
            page = request.page(),
            size = request.size(),
            filters = request.filters().len(),
            metadata = request.metadata().len(),
            "executing search"
        );

        let total = match adapter.exec(&request, &mut bindings).await {
            Ok(total) => total,
            Err(err) => {
                tracing::warn!(backend = adapter.name(), error = %err, "search failed");
                return Err(err);
            }
        };
        tracing::debug!(backend = adapter.name(), total, "search completed");

        let metadata = if request.has_metadata() {
            Some(request.metadata().envelope(bindings.metadata)?)
        } else {
            None
        };
        let pagination = request
            .has_pagination()
            .then(|| Pagination::new(total, request.page(), request.size(), request.path()));

        Ok(SearchResult {
            result: bindings.result,
            metadata,
            pagination,
        })
    }
}

/// Unparseable page/size values count as unset.
fn parse_control(value: &str) -> u64 {
    value.trim().parse().unwrap_or(0)
}
