//! Expression trees for composable queries.
//!
//! Trees are immutable and structurally shared: every [`Expr`] is an `Arc`
//! handle, rewrites rebuild only the paths that change, and
//! [`Expr::ptr_eq`] tells a reused subtree from a rebuilt one.
//!
//! Projection markers ([`sentinel`]) are ordinary call nodes with the
//! well-known [`Function::Project`] target; the expander in `projex-expand`
//! replaces them with the body of the referenced lambda.

pub mod expr;
pub use expr::*;

pub mod format;
pub mod literal;
pub mod param;
pub mod sentinel;
pub mod traversal;
pub mod value;

pub use literal::Literal;
pub use param::{DataType, Param, ParamArena, ParamId};
pub use traversal::{fold_postorder, rewrite_postorder, Rewriter};
pub use value::{Record, Value};
