//! Composable queries with projection expansion.
//!
//! [`Queryable::with_projections`] wraps any [`QuerySource`] so that every
//! derived, executed or enumerated tree has its projection markers expanded
//! before the backend sees it. [`MemoryProvider`] is an in-memory backend
//! that evaluates trees directly.

pub mod async_rows;
pub mod memory;
pub mod queryable;
pub mod source;
pub mod wrapper;

pub use async_rows::AsyncRows;
pub use memory::{MemoryCatalog, MemoryProvider, MemoryProviderConfig, MemoryQuery};
pub use queryable::Queryable;
pub use source::{list_rows, QueryProvider, QuerySource, RowIter};
pub use wrapper::{ProjectionProvider, ProjectionQuery};
