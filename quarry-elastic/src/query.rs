use std::path::Path;

use quarry_core::{Direction, Order, SearchError};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::template;

/// Index statement: the index a search runs against plus an optional base
/// clause and sort.
///
/// Used both as the scope of an [`ElasticAdapter`](crate::ElasticAdapter) and
/// as a metadata sub-query.
#[derive(Debug, Clone)]
pub struct IndexQuery {
    index: String,
    query: Option<Value>,
    sort: Vec<Order>,
}

impl IndexQuery {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            query: None,
            sort: Vec::new(),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Base query clause, ANDed with everything the search adds.
    pub fn query(mut self, clause: Value) -> Self {
        self.query = Some(clause);
        self
    }

    /// Base query clause rendered from the template file at `path`.
    pub fn template<D: Serialize>(self, path: impl AsRef<Path>, data: &D) -> Result<Self, SearchError> {
        let clause = template::render_file(path.as_ref(), data)?;
        Ok(self.query(clause))
    }

    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort.push(Order::new(field, direction));
        self
    }

    pub fn base_query(&self) -> Option<&Value> {
        self.query.as_ref()
    }

    /// Body builder seeded with this statement's clause and sort.
    pub fn body(&self) -> SearchBody {
        let mut body = SearchBody::new();
        if let Some(clause) = &self.query {
            body = body.must(clause.clone());
        }
        for order in &self.sort {
            body = body.sort(order.clone());
        }
        body
    }
}

/// Request body of a `_search` or `_count` call.
///
/// ```ignore
/// let body = SearchBody::new()
///     .term("last_name", "silva")
///     .query_string("jo*", ["first_name", "last_name"])
///     .from(20)
///     .size(10)
///     .sort(Order::asc("age"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchBody {
    must: Vec<Value>,
    from: Option<u64>,
    size: Option<u64>,
    sort: Vec<Order>,
}

impl SearchBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause to the boolean `must` list.
    pub fn must(mut self, clause: Value) -> Self {
        self.must.push(clause);
        self
    }

    /// Exact-term match on one field.
    pub fn term(self, field: &str, value: &str) -> Self {
        self.must(json!({ "term": { field: value } }))
    }

    /// One multi-field `query_string` clause.
    pub fn query_string<I, S>(self, query: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        self.must(json!({ "query_string": { "query": query, "fields": fields } }))
    }

    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sort(mut self, order: Order) -> Self {
        self.sort.push(order);
        self
    }

    fn query_clause(&self) -> Value {
        match self.must.as_slice() {
            [] => json!({ "match_all": {} }),
            clauses => json!({ "bool": { "must": clauses } }),
        }
    }

    /// Body for `_count`: the query only.
    pub fn count_body(&self) -> Value {
        json!({ "query": self.query_clause() })
    }

    /// Body for `_search`: query, window and sort.
    pub fn search_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), self.query_clause());
        if let Some(from) = self.from {
            body.insert("from".into(), from.into());
        }
        if let Some(size) = self.size {
            body.insert("size".into(), size.into());
        }
        if !self.sort.is_empty() {
            let sort: Vec<Value> = self
                .sort
                .iter()
                .map(|order| json!({ (order.column.as_str()): { "order": order.direction } }))
                .collect();
            body.insert("sort".into(), Value::Array(sort));
        }
        Value::Object(body)
    }
}
