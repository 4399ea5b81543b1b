//! Caller-visible failures of the scoped search.

/// Errors surfaced by [`crate::query::ScopedSearch`].
///
/// Unauthorized items are never an error: they are dropped from the
/// results before counting.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Component id '{0}' not found")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    /// Failure inside a catalog or permission collaborator, passed through as is.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl SearchError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SearchError::InvalidArgument(msg.into())
    }

    pub fn is_client_error(&self) -> bool {
        !matches!(self, SearchError::Collaborator(_))
    }
}

pub type SearchResult<T> = std::result::Result<T, SearchError>;
