use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::pagination::Pagination;

/// What a search returns: the bound result, the metadata targets and the
/// navigation links.
///
/// Serializes as `{ "result": [...], "metadata": {...}, "pagination": {...} }`;
/// `metadata` is omitted when metadata was disabled and `pagination` when
/// pagination was disabled.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<T> {
    pub result: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IndexMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> SearchResult<T> {
    /// Decode one metadata target back into a concrete type.
    pub fn metadata_as<M: serde::de::DeserializeOwned>(&self, name: &str) -> Option<Result<M, serde_json::Error>> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.get(name))
            .map(|value| M::deserialize(value))
    }
}
