/// Error types for sqlx-named-params
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An argument was empty or blank
    #[error("Argument '{name}' {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    /// The statement has no placeholder with this name
    #[error("Parameter name '{0}' unknown")]
    UnknownParameter(String),

    /// Placeholder has no value at execution time
    #[error("Placeholder '{0}' was not bound")]
    UnboundPlaceholder(String),

    /// Positional slot has no value at execution time
    #[error("Position {0} was not bound")]
    UnboundPosition(usize),

    /// Positional bind outside of the statement's placeholders
    #[error("Position {position} out of range, statement has {count} placeholder(s)")]
    PositionOutOfRange { position: usize, count: usize },

    /// The server counts a different number of parameters than the rewrite
    #[error("Statement has {expected} placeholder(s), server reported {reported}")]
    ParameterCountMismatch { expected: usize, reported: usize },

    /// The running operation was aborted through a `CancelHandle`
    #[error("Operation cancelled")]
    Cancelled,

    /// Error from SQLx database operations
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub(crate) fn blank(name: &'static str) -> Self {
        Error::InvalidArgument {
            name,
            reason: "must not be empty or blank",
        }
    }
}

/// Result type alias for sqlx-named-params operations
pub type Result<T> = std::result::Result<T, Error>;
