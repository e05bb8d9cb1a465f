use quarry_core::{
    Backend, Bindings, SearchAdapter, SearchError, SearchHandler, SearchRequest, Searcher,
};
use sqlx::any::AnyRow;
use sqlx::{Any, AnyPool, FromRow};

use crate::error::SqlxErrorExt;
use crate::query::Select;

/// Relational adapter: runs searches as SQL over an `sqlx` pool.
///
/// The base [`Select`] scopes every search (table, joins, projection and any
/// fixed conditions); filters, free text, paging and orders are layered on
/// top of a clone of it.
#[derive(Debug, Clone)]
pub struct SqlxAdapter {
    pool: AnyPool,
    base: Select,
}

impl SqlxAdapter {
    pub fn new(pool: AnyPool, base: Select) -> Self {
        Self { pool, base }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn base(&self) -> &Select {
        &self.base
    }

    /// The base statement narrowed by the request's filters and free text.
    pub fn scoped<T>(&self, request: &SearchRequest<Self, T>) -> Select {
        let mut select = self.base.clone();
        for (column, value) in request.filters() {
            select = select.where_text_eq(column, value);
        }
        if let Some(term) = request.free_text() {
            select = select.where_any_ilike(request.search_filters(), &format!("%{term}%"));
        }
        select
    }

    async fn count(&self, select: &Select) -> Result<u64, SearchError> {
        let (sql, params) = select.build_count()?;
        tracing::debug!(sql = %sql, params = params.len(), "counting search rows");
        let mut query = sqlx::query_scalar::<Any, i64>(&sql);
        for param in params {
            query = query.bind(param);
        }
        let total = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.into_search_error())?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn fetch<T>(&self, select: &Select) -> Result<Vec<T>, SearchError>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        let (sql, params) = select.build_select()?;
        tracing::debug!(sql = %sql, params = params.len(), "loading search rows");
        let mut query = sqlx::query_as::<Any, T>(&sql);
        for param in params {
            query = query.bind(param);
        }
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into_search_error())
    }
}

impl Backend for SqlxAdapter {
    type Statement = Select;

    fn name(&self) -> &'static str {
        "sqlx"
    }
}

impl<T> SearchAdapter<T> for SqlxAdapter
where
    T: for<'r> FromRow<'r, AnyRow> + Send + Sync + Unpin + 'static,
{
    async fn exec(
        &self,
        request: &SearchRequest<Self, T>,
        bindings: &mut Bindings<T>,
    ) -> Result<u64, SearchError> {
        let mut select = self.scoped(request);

        let mut total = 0;
        if request.has_pagination() {
            total = self.count(&select).await?;
            if total == 0 {
                tracing::debug!(table = select.table(), "no matching rows, skipping load");
                return Ok(0);
            }
        }

        if let Some(limit) = request.limit() {
            select = select.limit(limit);
        }
        if let Some(offset) = request.offset() {
            select = select.offset(offset);
        }
        for order in request.orders() {
            select = select.order_by(&order.column, order.direction);
        }

        bindings.result = self.fetch(&select).await?;

        if request.has_metadata() {
            request
                .metadata()
                .resolve(self, &bindings.result, total, &mut bindings.metadata)
                .await?;
        }
        Ok(total)
    }

    async fn load(&self, statement: &Select) -> Result<Vec<T>, SearchError> {
        self.fetch(statement).await
    }
}

/// Relational handlers straight from a [`Searcher`].
pub trait DatabaseSearch {
    /// A handler over `pool`, scoped to `base`.
    fn database<T>(&self, pool: AnyPool, base: Select) -> SearchHandler<SqlxAdapter, T>
    where
        SqlxAdapter: SearchAdapter<T>,
        T: Send + Sync + 'static;
}

impl DatabaseSearch for Searcher {
    fn database<T>(&self, pool: AnyPool, base: Select) -> SearchHandler<SqlxAdapter, T>
    where
        SqlxAdapter: SearchAdapter<T>,
        T: Send + Sync + 'static,
    {
        self.handler(SqlxAdapter::new(pool, base))
    }
}
