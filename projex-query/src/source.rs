//! Composable query traits.
//!
//! A [`QuerySource`] is an expression tree bound to the [`QueryProvider`]
//! that can run it. Deriving a query hands the extended tree back to the
//! provider; terminating a query asks the provider to execute it.

use std::any::Any;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use projex_expr::{Expr, Value};
use projex_result::{Error, Result};

use crate::async_rows::AsyncRows;

/// Synchronous row iterator returned by sequence execution.
pub type RowIter = Box<dyn Iterator<Item = Value> + Send>;

/// A query: an expression tree plus the provider that runs it.
pub trait QuerySource: Send + Sync {
    fn expression(&self) -> &Expr;

    fn provider(&self) -> Arc<dyn QueryProvider>;

    /// Enumerate the rows of this query.
    fn rows(&self) -> Result<RowIter>;

    fn as_any(&self) -> &dyn Any;
}

/// Builds and executes queries for one backend.
pub trait QueryProvider: Send + Sync {
    /// Bind `expression` to this provider as a new query.
    fn create_query(&self, expression: Expr) -> Result<Arc<dyn QuerySource>>;

    /// Execute `expression` to a single value (scalar or list).
    fn execute(&self, expression: &Expr) -> Result<Value>;

    /// Execute `expression` as a sequence of rows.
    fn execute_sequence(&self, expression: &Expr) -> Result<RowIter> {
        match self.execute(expression)? {
            Value::List(items) => Ok(list_rows(items)),
            other => Err(Error::type_mismatch("row sequence", other.type_name())),
        }
    }

    /// Asynchronous form of [`execute`](Self::execute). The default runs the
    /// query on the calling thread and returns an already completed future.
    fn execute_async(&self, expression: &Expr) -> BoxFuture<'static, Result<Value>> {
        future::ready(self.execute(expression)).boxed()
    }

    /// Asynchronous form of [`execute_sequence`](Self::execute_sequence).
    fn execute_stream(&self, expression: &Expr) -> Result<AsyncRows> {
        Ok(AsyncRows::new(self.execute_sequence(expression)?))
    }
}

/// Row iterator over a shared list.
pub fn list_rows(items: Arc<[Value]>) -> RowIter {
    let len = items.len();
    Box::new((0..len).map(move |i| items[i].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Value);

    impl QueryProvider for Fixed {
        fn create_query(&self, _expression: Expr) -> Result<Arc<dyn QuerySource>> {
            Err(Error::unsupported("fixed provider"))
        }

        fn execute(&self, _expression: &Expr) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn default_sequence_execution_iterates_lists() {
        let provider = Fixed(Value::list([Value::Integer(1), Value::Integer(2)]));
        let rows: Vec<Value> = provider
            .execute_sequence(&Expr::source("any"))
            .unwrap()
            .collect();
        assert_eq!(rows, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn default_sequence_execution_rejects_scalars() {
        let provider = Fixed(Value::Integer(7));
        assert!(matches!(
            provider.execute_sequence(&Expr::source("any")),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn default_async_execution_completes_immediately() {
        let provider = Fixed(Value::Integer(7));
        let value = futures::executor::block_on(provider.execute_async(&Expr::source("any")));
        assert_eq!(value.unwrap(), Value::Integer(7));
    }
}
