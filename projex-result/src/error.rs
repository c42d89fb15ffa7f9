use std::fmt;
use thiserror::Error;

/// Unified error type for all projex operations.
///
/// Every crate in the workspace returns this enum so failures cross crate
/// boundaries with `?` and callers can match on the variant that matters to
/// them. None of the variants is retryable: each one reports either a caller
/// programming error or a tree that a backend cannot run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A projection marker was executed directly.
    ///
    /// The marker only has meaning as tree structure consumed by the
    /// expander. Reaching it during evaluation means the query source was
    /// never wrapped with `with_projections()`, so the tree was handed to the
    /// backend without being expanded.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The projection reference at a call site could not be turned into a
    /// lambda.
    ///
    /// Raised when isolated evaluation of the reference sub-tree fails (an
    /// unbound parameter, a failing host function, an unavailable query
    /// source) or when it produces something other than a lambda value.
    #[error("projection evaluation failed: {0}")]
    EvaluationError(String),

    /// A call site supplies a different number of actual arguments than the
    /// resolved lambda declares.
    #[error("projection declares {expected} parameter(s) but the call site supplies {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// Nested projection expansion went deeper than the configured limit.
    ///
    /// A projection whose body invokes itself, directly or through other
    /// projections, never reaches a fixed point. The expander stops at
    /// `ExpandConfig::max_projection_depth` instead of exhausting the stack.
    #[error("projection expansion exceeded the nesting limit of {limit}")]
    CyclicProjection { limit: usize },

    /// A value did not have the shape an operator needs.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Invalid user input or API parameter.
    ///
    /// Also used by the reference engine for trees it refuses to translate,
    /// such as host function calls that a remote backend could never run.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// A named query source is not registered with the engine.
    #[error("query source not found: {0}")]
    NotFound(String),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// Raised when a traversal invariant breaks, for example a result stack
    /// underflow or a child count that does not match the node being rebuilt.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create an evaluation error from any displayable error.
    ///
    /// # Examples
    ///
    /// ```
    /// use projex_result::Error;
    ///
    /// let err = Error::evaluation("parameter 'p' is not bound");
    /// assert!(matches!(err, Error::EvaluationError(msg) if msg.contains("'p'")));
    /// ```
    #[inline]
    pub fn evaluation<E: fmt::Display>(err: E) -> Self {
        Error::EvaluationError(err.to_string())
    }

    /// Create an unsupported-operation error from any displayable message.
    #[inline]
    pub fn unsupported<E: fmt::Display>(msg: E) -> Self {
        Error::UnsupportedOperation(msg.to_string())
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
