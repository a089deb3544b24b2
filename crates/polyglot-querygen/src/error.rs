//! Error types for polyglot-querygen

use thiserror::Error;

/// The result type for generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Input-contract violations detected while normalizing or generating a query.
///
/// Generation is deterministic, so none of these are retryable: the caller has
/// to fix the query tree or the parameter map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A parameter referenced by the tree has no entry in the parameter-value map
    #[error("No value supplied for parameter '{0}'")]
    MissingParameter(String),

    /// OFFSET requested without an ORDER BY clause
    #[error("OFFSET is not supported without an ORDER BY clause")]
    OffsetWithoutOrdering,

    /// Empty or otherwise unusable identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A node or operator the generator cannot render in the given position
    #[error("Unsupported: {construct} cannot be rendered {context}")]
    Unsupported { construct: String, context: String },

    /// Structurally malformed input (mismatched tuple arity, bad template, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create an unsupported construct error
    pub fn unsupported(construct: impl Into<String>, context: impl Into<String>) -> Self {
        Error::Unsupported {
            construct: construct.into(),
            context: context.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Error::InvalidIdentifier(message.into())
    }
}
