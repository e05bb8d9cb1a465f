use std::future::Future;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::SearchError;
use crate::request::SearchRequest;

/// A storage technology a search can run against.
///
/// New backends are added by implementing this trait and [`SearchAdapter`];
/// the handler never branches on the concrete backend.
pub trait Backend: Send + Sync + Sized + 'static {
    /// Backend-native statement: the base query the adapter is scoped to, and
    /// the type of metadata sub-queries.
    type Statement: Clone + Send + Sync + 'static;

    /// Short backend name used in log events.
    fn name(&self) -> &'static str;
}

/// The objects a search populates: the primary result and the resolved
/// metadata targets, keyed by entry name.
#[derive(Debug)]
pub struct Bindings<T> {
    pub result: Vec<T>,
    pub metadata: IndexMap<String, Value>,
}

impl<T> Bindings<T> {
    pub fn new(result: Vec<T>) -> Self {
        Self {
            result,
            metadata: IndexMap::new(),
        }
    }
}

/// Executes a frozen [`SearchRequest`] against a native engine.
///
/// Implementations follow the same sequence so adapters can be swapped
/// without drift:
///
/// 1. equality filters, ANDed;
/// 2. free-text term ORed across the search-filter columns, ANDed with (1);
/// 3. when pagination is enabled, count the filtered rows and return
///    `Ok(0)` right away if there are none;
/// 4. limit (`size > 0`) and offset `(page - 1) * size` (`page > 0`);
/// 5. orders, in declaration order;
/// 6. load into `bindings.result`;
/// 7. when metadata is enabled, [`resolve`](crate::MetadataSet::resolve) the entries;
/// 8. return the total (`0` when pagination is disabled).
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait` needed.
pub trait SearchAdapter<T>: Backend {
    fn exec(
        &self,
        request: &SearchRequest<Self, T>,
        bindings: &mut Bindings<T>,
    ) -> impl Future<Output = Result<u64, SearchError>> + Send;

    /// Run a native statement as-is and decode every row/document.
    fn load(
        &self,
        statement: &Self::Statement,
    ) -> impl Future<Output = Result<Vec<T>, SearchError>> + Send;
}
