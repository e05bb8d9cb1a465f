use quarry_core::{
    Backend, Bindings, SearchAdapter, SearchError, SearchHandler, SearchRequest, Searcher,
};
use serde::de::DeserializeOwned;

use crate::client::ElasticClient;
use crate::query::{IndexQuery, SearchBody};

/// Search-index adapter: runs searches as `_count` / `_search` calls against
/// one index.
#[derive(Debug, Clone)]
pub struct ElasticAdapter {
    client: ElasticClient,
    base: IndexQuery,
}

impl ElasticAdapter {
    pub fn new(client: ElasticClient, base: IndexQuery) -> Self {
        Self { client, base }
    }

    pub fn client(&self) -> &ElasticClient {
        &self.client
    }

    pub fn base(&self) -> &IndexQuery {
        &self.base
    }

    /// The base statement narrowed by the request's filters and free text.
    pub fn scoped<T>(&self, request: &SearchRequest<Self, T>) -> SearchBody {
        let mut body = self.base.body();
        for (field, value) in request.filters() {
            body = body.term(field, value);
        }
        if let Some(term) = request.free_text() {
            body = body.query_string(term, request.search_filters().iter().cloned());
        }
        body
    }
}

impl Backend for ElasticAdapter {
    type Statement = IndexQuery;

    fn name(&self) -> &'static str {
        "elastic"
    }
}

impl<T> SearchAdapter<T> for ElasticAdapter
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn exec(
        &self,
        request: &SearchRequest<Self, T>,
        bindings: &mut Bindings<T>,
    ) -> Result<u64, SearchError> {
        let index = self.base.index();
        let mut body = self.scoped(request);

        let mut total = 0;
        if request.has_pagination() {
            total = self.client.count(index, &body.count_body()).await?;
            if total == 0 {
                tracing::debug!(index, "no matching documents, skipping load");
                return Ok(0);
            }
        }

        // Unset size means every match, capped at the client's window.
        let size = match request.limit() {
            Some(size) => size,
            None if request.has_pagination() => total.min(self.client.max_window()),
            None => self.client.max_window(),
        };
        body = body.size(size);
        if let Some(from) = request.offset() {
            body = body.from(from);
        }
        for order in request.orders() {
            body = body.sort(order.clone());
        }

        bindings.result = self.client.search(index, &body.search_body()).await?;

        if request.has_metadata() {
            request
                .metadata()
                .resolve(self, &bindings.result, total, &mut bindings.metadata)
                .await?;
        }
        Ok(total)
    }

    async fn load(&self, statement: &IndexQuery) -> Result<Vec<T>, SearchError> {
        let body = statement.body().size(self.client.max_window());
        self.client.search(statement.index(), &body.search_body()).await
    }
}

/// Index handlers straight from a [`Searcher`].
pub trait ElasticSearch {
    /// A handler over `client`, scoped to `query`.
    fn elastic<T>(&self, client: ElasticClient, query: IndexQuery) -> SearchHandler<ElasticAdapter, T>
    where
        ElasticAdapter: SearchAdapter<T>,
        T: Send + Sync + 'static;
}

impl ElasticSearch for Searcher {
    fn elastic<T>(&self, client: ElasticClient, query: IndexQuery) -> SearchHandler<ElasticAdapter, T>
    where
        ElasticAdapter: SearchAdapter<T>,
        T: Send + Sync + 'static,
    {
        self.handler(ElasticAdapter::new(client, query))
    }
}
