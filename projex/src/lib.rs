//! Reusable lambda projections for composable queries.
//!
//! A projection is an ordinary lambda kept outside the query that uses it.
//! The query refers to it through a marker call (`project1`..`project5`);
//! wrapping the query with [`Queryable::with_projections`] splices the
//! lambda's body into the tree, rebinding its parameters to the call-site
//! arguments, before any backend sees the tree.
//!
//! ```
//! use projex::prelude::*;
//!
//! let catalog = MemoryCatalog::new().with_source(
//!     "users",
//!     ["ada", "grace"].map(|name| Value::from(Record::new("User").with_field("name", name))),
//! );
//! let provider = MemoryProvider::new(catalog);
//!
//! let mut arena = ParamArena::new();
//! let u = arena.declare("u", DataType::record("User"));
//! let greeting = Lambda::new([u.clone()], Expr::literal("hi ") + Expr::param(&u).member("name"));
//!
//! let row = arena.declare("row", DataType::record("User"));
//! let greetings = provider
//!     .source("users")?
//!     .with_projections()
//!     .select(Lambda::new(
//!         [row.clone()],
//!         Expr::captured("greeting", greeting).project1(Expr::param(&row)),
//!     ))?
//!     .to_vec()?;
//! assert_eq!(greetings, vec![Value::from("hi ada"), Value::from("hi grace")]);
//! # Ok::<(), projex::Error>(())
//! ```

pub use projex_eval::{evaluate_closed, Evaluator, SourceResolver};
pub use projex_expand::{
    expand, expand_with, rebind, resolve, ExpandConfig, ParameterRebinder, ProjectionExpander,
    ProjectionRef, Substitution,
};
pub use projex_expr::sentinel::{self, project1, project2, project3, project4, project5, project_n};
pub use projex_expr::{
    BinaryOp, Builtin, CompareOp, DataType, Expr, ExprKind, Function, HostFunction, Lambda,
    Literal, Param, ParamArena, ParamId, Record, UnaryOp, Value,
};
pub use projex_query::{
    AsyncRows, MemoryCatalog, MemoryProvider, MemoryProviderConfig, ProjectionProvider,
    ProjectionQuery, QueryProvider, QuerySource, Queryable, RowIter,
};
pub use projex_result::{Error, Result};

pub mod prelude {
    pub use crate::{
        DataType, Error, Expr, HostFunction, Lambda, MemoryCatalog, MemoryProvider, Param,
        ParamArena, Queryable, Record, Result, Value,
    };
}
