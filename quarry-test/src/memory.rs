use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use quarry_core::{
    Backend, Bindings, Direction, Order, SearchAdapter, SearchError, SearchRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// One backend operation observed by a [`MemoryAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Count of the filtered collection.
    Count { collection: String },
    /// Primary load with the window and orders it was given.
    Load {
        collection: String,
        limit: Option<u64>,
        offset: Option<u64>,
        orders: Vec<Order>,
    },
    /// Metadata statement run through `load`.
    Statement { collection: String },
}

/// Statement type of the [`MemoryAdapter`]: a collection name plus optional
/// equality conditions and sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    name: String,
    conditions: BTreeMap<String, String>,
    orders: Vec<Order>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: BTreeMap::new(),
            orders: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.orders.push(Order::new(field, direction));
        self
    }
}

#[derive(Default)]
struct Store {
    collections: HashMap<String, Vec<Value>>,
    failures: HashSet<String>,
    calls: Vec<Call>,
}

/// In-memory backend over collections of JSON documents.
///
/// Filters are string equality on top-level fields, free text is a
/// case-insensitive substring match. Every count and load is recorded so
/// tests can assert exactly what a search asked the backend for.
///
/// ```ignore
/// let adapter = MemoryAdapter::new("people")
///     .with_documents("people", [json!({"id": 1, "name": "joao"})]);
/// let result = SearchHandler::<_, Person>::new(adapter.clone()).exec().await?;
/// assert_eq!(adapter.calls().len(), 2);
/// ```
#[derive(Clone)]
pub struct MemoryAdapter {
    collection: String,
    store: Arc<Mutex<Store>>,
}

impl MemoryAdapter {
    /// Adapter whose searches run against `collection`.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            store: Arc::new(Mutex::new(Store::default())),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Append documents to a collection, creating it if needed.
    pub fn with_documents<I, D>(self, collection: &str, documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Serialize,
    {
        self.insert(collection, documents);
        self
    }

    /// Append documents; documents that do not serialize are skipped.
    pub fn insert<I, D>(&self, collection: &str, documents: I)
    where
        I: IntoIterator<Item = D>,
        D: Serialize,
    {
        let documents = documents
            .into_iter()
            .filter_map(|doc| serde_json::to_value(doc).ok());
        self.lock()
            .collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    /// Make every operation touching `collection` fail.
    pub fn fail_on(self, collection: &str) -> Self {
        self.lock().failures.insert(collection.to_string());
        self
    }

    /// Everything recorded so far, in call order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `call`, then return the collection's documents or the
    /// injected failure.
    fn access(&self, collection: &str, call: Call) -> Result<Vec<Value>, SearchError> {
        let mut store = self.lock();
        store.calls.push(call);
        if store.failures.contains(collection) {
            tracing::debug!(collection, "injected failure");
            return Err(SearchError::other(format!("injected failure on `{collection}`")));
        }
        Ok(store.collections.get(collection).cloned().unwrap_or_default())
    }

    fn matching<T>(&self, request: &SearchRequest<Self, T>, documents: Vec<Value>) -> Vec<Value> {
        let term = request.free_text().map(str::to_lowercase);
        documents
            .into_iter()
            .filter(|doc| {
                request
                    .filters()
                    .iter()
                    .all(|(field, value)| field_equals(doc, field, value))
            })
            .filter(|doc| match &term {
                Some(term) => request
                    .search_filters()
                    .iter()
                    .any(|field| field_text(doc, field).to_lowercase().contains(term.as_str())),
                None => true,
            })
            .collect()
    }
}

impl Backend for MemoryAdapter {
    type Statement = Collection;

    fn name(&self) -> &'static str {
        "memory"
    }
}

impl<T> SearchAdapter<T> for MemoryAdapter
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn exec(
        &self,
        request: &SearchRequest<Self, T>,
        bindings: &mut Bindings<T>,
    ) -> Result<u64, SearchError> {
        let collection = self.collection.as_str();

        let mut total = 0;
        if request.has_pagination() {
            let documents = self.access(
                collection,
                Call::Count {
                    collection: collection.to_string(),
                },
            )?;
            total = self.matching(request, documents).len() as u64;
            if total == 0 {
                return Ok(0);
            }
        }

        let documents = self.access(
            collection,
            Call::Load {
                collection: collection.to_string(),
                limit: request.limit(),
                offset: request.offset(),
                orders: request.orders().to_vec(),
            },
        )?;
        let mut documents = self.matching(request, documents);
        sort_documents(&mut documents, request.orders());
        let window = documents
            .into_iter()
            .skip(request.offset().unwrap_or(0) as usize)
            .take(request.limit().map_or(usize::MAX, |limit| limit as usize));

        bindings.result = decode(window)?;

        if request.has_metadata() {
            request
                .metadata()
                .resolve(self, &bindings.result, total, &mut bindings.metadata)
                .await?;
        }
        Ok(total)
    }

    async fn load(&self, statement: &Collection) -> Result<Vec<T>, SearchError> {
        let documents = self.access(
            &statement.name,
            Call::Statement {
                collection: statement.name.clone(),
            },
        )?;
        let mut documents: Vec<Value> = documents
            .into_iter()
            .filter(|doc| {
                statement
                    .conditions
                    .iter()
                    .all(|(field, value)| field_equals(doc, field, value))
            })
            .collect();
        sort_documents(&mut documents, &statement.orders);
        decode(documents)
    }
}

fn decode<T: DeserializeOwned>(documents: impl IntoIterator<Item = Value>) -> Result<Vec<T>, SearchError> {
    documents
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(SearchError::from))
        .collect()
}

fn field_text(doc: &Value, field: &str) -> String {
    match doc.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn field_equals(doc: &Value, field: &str, expected: &str) -> bool {
    doc.get(field).is_some() && field_text(doc, field) == expected
}

fn sort_documents(documents: &mut [Value], orders: &[Order]) {
    documents.sort_by(|a, b| {
        orders
            .iter()
            .map(|order| {
                let ordering = compare(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_by_several_orders() {
        let mut docs = vec![
            json!({ "age": 30, "name": "b" }),
            json!({ "age": 25, "name": "z" }),
            json!({ "age": 30, "name": "c" }),
        ];
        sort_documents(&mut docs, &[Order::asc("age"), Order::desc("name")]);
        let names: Vec<_> = docs.iter().map(|d| d["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["z", "c", "b"]);
    }

    #[test]
    fn test_field_equality_is_textual() {
        let doc = json!({ "age": 30, "name": "ana", "gone": null });
        assert!(field_equals(&doc, "age", "30"));
        assert!(field_equals(&doc, "name", "ana"));
        assert!(!field_equals(&doc, "missing", ""));
        assert!(field_equals(&doc, "gone", ""));
    }

    #[test]
    fn test_injected_failure_is_recorded() {
        let adapter = MemoryAdapter::new("people").fail_on("people");
        let err = adapter
            .access("people", Call::Count { collection: "people".into() })
            .unwrap_err();
        assert!(matches!(err, SearchError::Other(_)));
        assert_eq!(adapter.calls().len(), 1);
    }
}
