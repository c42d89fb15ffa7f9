//! Fluent handle over a [`QuerySource`].

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use projex_expand::ExpandConfig;
use projex_expr::{Expr, Lambda, Value};
use projex_result::{Error, Result};

use crate::async_rows::AsyncRows;
use crate::source::{QueryProvider, QuerySource, RowIter};
use crate::wrapper::ProjectionQuery;

/// Cloneable handle to a query. Composition operators derive a new query
/// through the source's provider; terminal operators execute it.
#[derive(Clone)]
pub struct Queryable {
    source: Arc<dyn QuerySource>,
}

impl Queryable {
    pub fn new(source: Arc<dyn QuerySource>) -> Self {
        Self { source }
    }

    #[inline]
    pub fn source(&self) -> &Arc<dyn QuerySource> {
        &self.source
    }

    #[inline]
    pub fn expression(&self) -> &Expr {
        self.source.expression()
    }

    pub fn provider(&self) -> Arc<dyn QueryProvider> {
        self.source.provider()
    }

    /// Route this query through projection expansion.
    ///
    /// Calling this on a query that is already wrapped returns a handle to
    /// the same wrapper.
    pub fn with_projections(&self) -> Self {
        Self::new(ProjectionQuery::wrap(Arc::clone(&self.source)))
    }

    pub fn with_projections_config(&self, config: ExpandConfig) -> Self {
        Self::new(ProjectionQuery::wrap_with_config(
            Arc::clone(&self.source),
            config,
        ))
    }

    pub fn is_projection_aware(&self) -> bool {
        self.source.as_any().is::<ProjectionQuery>()
    }

    // --- composition ---

    fn derive(&self, extend: impl FnOnce(Expr) -> Expr) -> Result<Self> {
        let expression = extend(self.expression().clone());
        Ok(Self::new(self.provider().create_query(expression)?))
    }

    pub fn filter(&self, predicate: Lambda) -> Result<Self> {
        self.derive(|expr| expr.filter(predicate))
    }

    pub fn select(&self, selector: Lambda) -> Result<Self> {
        self.derive(|expr| expr.select(selector))
    }

    pub fn order_by(&self, key: Lambda) -> Result<Self> {
        self.derive(|expr| expr.order_by(key))
    }

    // --- termination ---

    fn terminate(&self, finish: impl FnOnce(Expr) -> Expr) -> Result<Value> {
        let expression = finish(self.expression().clone());
        self.provider().execute(&expression)
    }

    pub fn count(&self) -> Result<i64> {
        match self.terminate(Expr::count)? {
            Value::Integer(n) => Ok(n),
            other => Err(Error::type_mismatch("int", other.type_name())),
        }
    }

    pub fn any(&self, predicate: Option<Lambda>) -> Result<bool> {
        match self.terminate(|expr| expr.any(predicate))? {
            Value::Boolean(b) => Ok(b),
            other => Err(Error::type_mismatch("bool", other.type_name())),
        }
    }

    pub fn sum(&self, selector: Lambda) -> Result<Value> {
        self.terminate(|expr| expr.sum(selector))
    }

    /// Mean of the selected values; `null` for an empty query.
    pub fn average(&self, selector: Lambda) -> Result<Value> {
        self.terminate(|expr| expr.average(selector))
    }

    pub fn min(&self, selector: Lambda) -> Result<Value> {
        self.terminate(|expr| expr.min(selector))
    }

    pub fn max(&self, selector: Lambda) -> Result<Value> {
        self.terminate(|expr| expr.max(selector))
    }

    /// Execute the query tree itself to a value.
    pub fn execute(&self) -> Result<Value> {
        self.provider().execute(self.expression())
    }

    pub fn execute_async(&self) -> BoxFuture<'static, Result<Value>> {
        self.provider().execute_async(self.expression())
    }

    // --- enumeration ---

    pub fn rows(&self) -> Result<RowIter> {
        self.source.rows()
    }

    pub fn to_vec(&self) -> Result<Vec<Value>> {
        Ok(self.rows()?.collect())
    }

    /// Rows as a [`futures::Stream`] whose polls complete immediately.
    pub fn stream(&self) -> Result<AsyncRows> {
        Ok(AsyncRows::new(self.rows()?))
    }
}

impl fmt::Debug for Queryable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queryable")
            .field("expression", &format_args!("{}", self.expression()))
            .field("projection_aware", &self.is_projection_aware())
            .finish()
    }
}
