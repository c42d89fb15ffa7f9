use crate::error::Error;

/// Result type alias used throughout projex.
pub type Result<T> = std::result::Result<T, Error>;
