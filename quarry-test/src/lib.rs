//! Test utilities for Quarry.
//!
//! [`MemoryAdapter`] implements the adapter contract over in-memory JSON
//! documents and records every backend call, so handler behavior (filters,
//! paging, the zero-count short-circuit, metadata order) can be asserted
//! without a database or a search engine.

mod memory;

pub use memory::{Call, Collection, MemoryAdapter};
