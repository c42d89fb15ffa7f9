//! Projection-aware query wrapper.
//!
//! [`ProjectionQuery`] presents the same surface as the source it wraps. It
//! expands projection markers in the accumulated tree at every interception
//! point (deriving a query, executing it, enumerating it) before handing the
//! tree to the wrapped provider, so the backend never sees a marker call.

use std::any::Any;
use std::sync::{Arc, Weak};

use futures::future::{self, BoxFuture, FutureExt};
use projex_expand::{expand_with, ExpandConfig};
use projex_expr::{Expr, Value};
use projex_result::{Error, Result};

use crate::source::{QueryProvider, QuerySource, RowIter};

/// Provider shared by every query derived from one wrapped source.
pub struct ProjectionProvider {
    inner: Arc<dyn QueryProvider>,
    config: ExpandConfig,
    this: Weak<ProjectionProvider>,
}

impl ProjectionProvider {
    pub fn new(inner: Arc<dyn QueryProvider>) -> Arc<Self> {
        Self::with_config(inner, ExpandConfig::default())
    }

    pub fn with_config(inner: Arc<dyn QueryProvider>, config: ExpandConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            inner,
            config,
            this: this.clone(),
        })
    }

    /// The wrapped backend provider.
    pub fn inner(&self) -> &Arc<dyn QueryProvider> {
        &self.inner
    }

    pub fn config(&self) -> &ExpandConfig {
        &self.config
    }

    /// Expand projection markers in `expression`.
    pub fn expand(&self, expression: &Expr) -> Result<Expr> {
        expand_with(expression, &self.config)
    }

    fn shared(&self) -> Result<Arc<Self>> {
        self.this
            .upgrade()
            .ok_or_else(|| Error::Internal("projection provider is no longer alive".into()))
    }
}

impl QueryProvider for ProjectionProvider {
    fn create_query(&self, expression: Expr) -> Result<Arc<dyn QuerySource>> {
        tracing::debug!(expression = %expression, "create_query: expanding projections");
        let expanded = self.expand(&expression)?;
        let inner = self.inner.create_query(expanded)?;
        Ok(Arc::new(ProjectionQuery {
            inner,
            provider: self.shared()?,
        }))
    }

    fn execute(&self, expression: &Expr) -> Result<Value> {
        tracing::debug!(expression = %expression, "execute: expanding projections");
        let expanded = self.expand(expression)?;
        self.inner.execute(&expanded)
    }

    fn execute_sequence(&self, expression: &Expr) -> Result<RowIter> {
        tracing::debug!(expression = %expression, "execute_sequence: expanding projections");
        let expanded = self.expand(expression)?;
        self.inner.execute_sequence(&expanded)
    }

    fn execute_async(&self, expression: &Expr) -> BoxFuture<'static, Result<Value>> {
        tracing::debug!(expression = %expression, "execute_async: expanding projections");
        match self.expand(expression) {
            Ok(expanded) => self.inner.execute_async(&expanded),
            Err(err) => future::ready(Err(err)).boxed(),
        }
    }
}

/// A query whose tree is expanded before it reaches the wrapped source.
pub struct ProjectionQuery {
    inner: Arc<dyn QuerySource>,
    provider: Arc<ProjectionProvider>,
}

impl ProjectionQuery {
    /// Wrap `source`, or return it unchanged when it is already wrapped.
    pub fn wrap(source: Arc<dyn QuerySource>) -> Arc<dyn QuerySource> {
        Self::wrap_with_config(source, ExpandConfig::default())
    }

    /// As [`wrap`](Self::wrap), with an explicit expansion config. An already
    /// wrapped source keeps the config it was wrapped with.
    pub fn wrap_with_config(
        source: Arc<dyn QuerySource>,
        config: ExpandConfig,
    ) -> Arc<dyn QuerySource> {
        if source.as_any().is::<ProjectionQuery>() {
            return source;
        }
        let provider = ProjectionProvider::with_config(source.provider(), config);
        Arc::new(ProjectionQuery {
            inner: source,
            provider,
        })
    }

    /// The wrapped query.
    pub fn inner(&self) -> &Arc<dyn QuerySource> {
        &self.inner
    }

    pub fn projection_provider(&self) -> &Arc<ProjectionProvider> {
        &self.provider
    }
}

impl QuerySource for ProjectionQuery {
    fn expression(&self) -> &Expr {
        self.inner.expression()
    }

    fn provider(&self) -> Arc<dyn QueryProvider> {
        Arc::clone(&self.provider) as Arc<dyn QueryProvider>
    }

    fn rows(&self) -> Result<RowIter> {
        let expression = self.inner.expression();
        let expanded = self.provider.expand(expression)?;
        if Expr::ptr_eq(expression, &expanded) {
            tracing::debug!("rows: enumerating wrapped query");
            return self.inner.rows();
        }
        tracing::debug!(expression = %expanded, "rows: enumerating expanded query");
        self.provider.inner().create_query(expanded)?.rows()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
