//! Named auxiliary fetches resolved after the primary load.
//!
//! An entry is either a backend-native statement (run through
//! [`SearchAdapter::load`]) or a callback that receives the finished primary
//! result. Either way the entry owns a typed target; once resolved, the target
//! is exposed in the envelope's metadata map under the entry's name.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::adapter::{Backend, SearchAdapter};
use crate::error::SearchError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a metadata callback can see: the complete primary result, the total
/// reported by the count, and the names of every declared entry.
pub struct MetadataContext<'a, T> {
    result: &'a [T],
    total: u64,
    entries: &'a [&'a str],
}

impl<'a, T> MetadataContext<'a, T> {
    pub fn new(result: &'a [T], total: u64, entries: &'a [&'a str]) -> Self {
        Self {
            result,
            total,
            entries,
        }
    }

    pub fn result(&self) -> &'a [T] {
        self.result
    }

    /// Total matching rows, or `0` when pagination is disabled.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn entries(&self) -> &'a [&'a str] {
        self.entries
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.contains(&name)
    }
}

impl<T> Clone for MetadataContext<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MetadataContext<'_, T> {}

/// Type-erased metadata entry backed by a native statement.
pub trait StatementTarget<A: Backend>: Send + Sync {
    fn resolve<'a>(&'a self, adapter: &'a A) -> BoxFuture<'a, Result<Value, SearchError>>;

    /// The target as registered, before any resolution.
    fn initial(&self) -> Result<Value, SearchError>;
}

/// Type-erased metadata entry backed by a callback.
pub trait FunctionTarget<T>: Send + Sync {
    fn resolve<'a>(&'a self, ctx: MetadataContext<'a, T>) -> BoxFuture<'a, Result<Value, SearchError>>;

    fn initial(&self) -> Result<Value, SearchError>;
}

/// Exactly one of a native statement or a callback.
pub enum MetadataSource<A: Backend, T> {
    Statement(Box<dyn StatementTarget<A>>),
    Function(Box<dyn FunctionTarget<T>>),
}

impl<A: Backend, T> MetadataSource<A, T> {
    /// Entry that runs `statement` on the search's own backend, decoding rows
    /// into `Vec<M>`. Loaded rows replace `target`.
    pub fn statement<M>(statement: A::Statement, target: Vec<M>) -> Self
    where
        A: SearchAdapter<M>,
        M: Serialize + Send + Sync + 'static,
    {
        MetadataSource::Statement(Box::new(StatementEntry::<A, M> {
            statement,
            target,
            _backend: PhantomData,
        }))
    }

    /// Entry that hands `target` to `callback` together with the primary
    /// result; whatever the callback returns becomes the exposed target.
    ///
    /// The returned future cannot borrow from the context: copy what you need
    /// out of it before the `async` block.
    pub fn function<M, F, Fut>(callback: F, target: M) -> Self
    where
        T: Sync + 'static,
        F: for<'c> Fn(MetadataContext<'c, T>, M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<M, SearchError>> + Send + 'static,
        M: Clone + Serialize + Send + Sync + 'static,
    {
        MetadataSource::Function(Box::new(FunctionEntry {
            callback,
            target,
            _future: PhantomData,
        }))
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, MetadataSource::Statement(_))
    }

    pub fn initial(&self) -> Result<Value, SearchError> {
        match self {
            MetadataSource::Statement(entry) => entry.initial(),
            MetadataSource::Function(entry) => entry.initial(),
        }
    }
}

struct StatementEntry<A: Backend, M> {
    statement: A::Statement,
    target: Vec<M>,
    _backend: PhantomData<fn() -> A>,
}

impl<A, M> StatementTarget<A> for StatementEntry<A, M>
where
    A: SearchAdapter<M>,
    M: Serialize + Send + Sync + 'static,
{
    fn resolve<'a>(&'a self, adapter: &'a A) -> BoxFuture<'a, Result<Value, SearchError>> {
        Box::pin(async move {
            let rows = <A as SearchAdapter<M>>::load(adapter, &self.statement).await?;
            Ok(serde_json::to_value(&rows)?)
        })
    }

    fn initial(&self) -> Result<Value, SearchError> {
        Ok(serde_json::to_value(&self.target)?)
    }
}

struct FunctionEntry<F, M, Fut> {
    callback: F,
    target: M,
    _future: PhantomData<fn() -> Fut>,
}

impl<T, F, M, Fut> FunctionTarget<T> for FunctionEntry<F, M, Fut>
where
    T: Sync,
    F: for<'c> Fn(MetadataContext<'c, T>, M) -> Fut + Send + Sync,
    Fut: Future<Output = Result<M, SearchError>> + Send + 'static,
    M: Clone + Serialize + Send + Sync,
{
    fn resolve<'a>(&'a self, ctx: MetadataContext<'a, T>) -> BoxFuture<'a, Result<Value, SearchError>> {
        let pending = (self.callback)(ctx, self.target.clone());
        Box::pin(async move {
            let populated = pending.await?;
            Ok(serde_json::to_value(&populated)?)
        })
    }

    fn initial(&self) -> Result<Value, SearchError> {
        Ok(serde_json::to_value(&self.target)?)
    }
}

/// The metadata entries of one request, in declaration order. Names are unique.
pub struct MetadataSet<A: Backend, T> {
    entries: IndexMap<String, MetadataSource<A, T>>,
}

impl<A: Backend, T> MetadataSet<A, T> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Register an entry. A name registered twice keeps its original position
    /// but the later entry wins.
    pub fn insert(&mut self, name: impl Into<String>, source: MetadataSource<A, T>) {
        self.entries.insert(name.into(), source);
    }

    pub fn get(&self, name: &str) -> Option<&MetadataSource<A, T>> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every entry in declaration order, storing each target in `out`.
    ///
    /// Stops at the first failure; targets resolved before it stay in `out`.
    pub async fn resolve(
        &self,
        adapter: &A,
        result: &[T],
        total: u64,
        out: &mut IndexMap<String, Value>,
    ) -> Result<(), SearchError>
    where
        T: Sync,
    {
        let names: Vec<&str> = self.names().collect();
        for (name, source) in &self.entries {
            let resolved = match source {
                MetadataSource::Statement(entry) => entry.resolve(adapter).await,
                MetadataSource::Function(entry) => {
                    entry.resolve(MetadataContext::new(result, total, &names)).await
                }
            };
            match resolved {
                Ok(value) => {
                    tracing::debug!(backend = adapter.name(), entry = %name, "metadata resolved");
                    out.insert(name.clone(), value);
                }
                Err(err) => {
                    tracing::warn!(backend = adapter.name(), entry = %name, error = %err, "metadata resolution failed");
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Build the envelope map: each entry's resolved target, or its initial
    /// target when it was never resolved (e.g. the count short-circuited).
    pub fn envelope(
        &self,
        mut resolved: IndexMap<String, Value>,
    ) -> Result<IndexMap<String, Value>, SearchError> {
        let mut out = IndexMap::with_capacity(self.entries.len());
        for (name, source) in &self.entries {
            let value = match resolved.shift_remove(name) {
                Some(value) => value,
                None => source.initial()?,
            };
            out.insert(name.clone(), value);
        }
        Ok(out)
    }
}

impl<A: Backend, T> Default for MetadataSet<A, T> {
    fn default() -> Self {
        Self::new()
    }
}
