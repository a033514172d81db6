use connectors::error::DbError;
use thiserror::Error;

/// Request-level failures surfaced to the HTTP layer. Cursor problems are
/// deliberately absent: an invalid cursor degrades to the first page and is
/// never an error.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A free-text query arrived with no bounds and no derivable center.
    /// An unbounded full-text scan over the whole table is not supported.
    #[error("bounds required for text search")]
    BoundsRequired,

    /// Bounds were present but unusable (non-finite coordinates).
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// A request parameter failed validation before any datastore access.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The v2 search path is switched off by configuration.
    #[error("search v2 is disabled")]
    SearchDisabled,

    /// Any datastore failure. Detail goes to the logs; the caller only sees
    /// this opaque condition.
    #[error("failed to fetch search results")]
    Datastore(#[from] DbError),
}

impl SearchError {
    /// True for validation-class errors that map to a 400 response.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SearchError::BoundsRequired
                | SearchError::InvalidBounds(_)
                | SearchError::InvalidParameter(_)
        )
    }
}
