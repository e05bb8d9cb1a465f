use crate::config::ConfigError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while executing a search.
///
/// Adapter and metadata failures surface through the same variants, so a
/// caller cannot (and need not) tell a failed primary load from a failed
/// metadata entry.
#[derive(Debug)]
pub enum SearchError {
    /// Connectivity problems or a query the backend rejected.
    Backend(BoxError),
    /// A row or document could not be decoded into the bound type, or a
    /// metadata target could not be encoded for the envelope.
    Decode(BoxError),
    /// The search engine answered with a non-success status or an error document.
    Status { status: u16, body: String },
    Config(ConfigError),
    Other(String),
}

impl SearchError {
    /// Construct a `Backend` variant from any error type.
    ///
    /// Used by adapter crates (e.g. `quarry-sqlx`, `quarry-elastic`) to wrap
    /// driver-specific errors.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SearchError::Backend(Box::new(err))
    }

    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SearchError::Decode(Box::new(err))
    }

    pub fn other(msg: impl Into<String>) -> Self {
        SearchError::Other(msg.into())
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Backend(err) => write!(f, "Backend error: {err}"),
            SearchError::Decode(err) => write!(f, "Decode error: {err}"),
            SearchError::Status { status, body } => {
                write!(f, "Search engine returned status {status}: {body}")
            }
            SearchError::Config(err) => write!(f, "{err}"),
            SearchError::Other(msg) => write!(f, "Search error: {msg}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Backend(err) | SearchError::Decode(err) => Some(err.as_ref()),
            SearchError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SearchError {
    fn from(err: ConfigError) -> Self {
        SearchError::Config(err)
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::decode(err)
    }
}
