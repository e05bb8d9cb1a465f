use quarry_core::SearchError;
use serde::Deserialize;

/// Extension trait for converting `reqwest::Error` into `SearchError`.
///
/// Due to Rust's orphan rules, we can't implement `From<reqwest::Error> for SearchError`
/// in this crate. Use `.into_search_error()` instead.
pub trait ReqwestErrorExt {
    fn into_search_error(self) -> SearchError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_search_error(self) -> SearchError {
        if self.is_decode() {
            SearchError::decode(self)
        } else {
            SearchError::backend(self)
        }
    }
}

/// Error document returned by the engine alongside (or instead of) a failure
/// status, e.g. `{"error": {"type": "...", "reason": "..."}, "status": 404}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDocument {
    pub error: serde_json::Value,
    #[serde(default)]
    pub status: Option<u16>,
}

impl ErrorDocument {
    /// Parse `body` as an error document, if it is one.
    pub(crate) fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<ErrorDocument>(body)
            .ok()
            .filter(|doc| !doc.error.is_null())
    }
}

/// Map an engine answer to `SearchError::Status` when it is a failure.
pub(crate) fn check_response(status: u16, body: &str) -> Result<(), SearchError> {
    let document = ErrorDocument::parse(body);
    let failed = !(200..300).contains(&status) || document.is_some();
    if !failed {
        return Ok(());
    }
    let status = document.and_then(|doc| doc.status).unwrap_or(status);
    Err(SearchError::Status {
        status,
        body: body.to_string(),
    })
}
