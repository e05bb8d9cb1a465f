use quarry_core::SearchError;

use crate::query::QueryError;

/// Extension trait for converting `sqlx::Error` into `SearchError`.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for SearchError`
/// in this crate. Use `.into_search_error()` instead.
pub trait SqlxErrorExt {
    fn into_search_error(self) -> SearchError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_search_error(self) -> SearchError {
        match &self {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. } => SearchError::decode(self),
            _ => SearchError::backend(self),
        }
    }
}

impl From<QueryError> for SearchError {
    fn from(err: QueryError) -> Self {
        SearchError::backend(err)
    }
}

/// Convenience alias for search results produced by this crate.
pub type SqlxResult<T> = Result<T, SearchError>;
