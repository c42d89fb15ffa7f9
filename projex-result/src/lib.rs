//! Error types and result definitions for projex.
//!
//! Every crate in the workspace reports failures through the single
//! [`Error`] enum and the [`Result<T>`] alias, so errors raised deep inside
//! projection expansion reach the query caller unchanged through `?`.
//!
//! # Error Categories
//!
//! - **Marker misuse** ([`Error::UnsupportedOperation`]): a projection marker reached execution
//! - **Resolution failures** ([`Error::EvaluationError`]): a projection reference did not yield a lambda
//! - **Call shape errors** ([`Error::ArityMismatch`]): argument count disagrees with the lambda
//! - **Runaway nesting** ([`Error::CyclicProjection`]): self-referential projections
//! - **Evaluation errors** ([`Error::TypeMismatch`], [`Error::InvalidArgumentError`], [`Error::NotFound`])
//! - **Internal errors** ([`Error::Internal`]): bugs or unexpected states

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
