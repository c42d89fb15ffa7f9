//! Evaluation of projex expression trees.
//!
//! The [`Evaluator`] walks a tree directly. It is used in two places: the
//! projection resolver evaluates reference expressions in a closed context
//! to obtain lambdas, and the in-memory provider evaluates whole queries
//! against its catalog.

mod builtins;
pub mod evaluator;
pub mod ops;

pub use evaluator::{evaluate_closed, member_of, Evaluator, SourceResolver};
