//! The projection expander.
//!
//! A single bottom-up pass over the tree. Ordinary nodes are rebuilt only
//! when a child changed. A marker call `project(reference, a1, .., aN)` is
//! replaced by the body of the referenced lambda, itself fully expanded, with
//! the lambda's parameters rebound to `a1..aN`.
//!
//! Because children are rewritten before their parent, marker calls nested
//! inside actual arguments are gone by the time the enclosing marker is
//! inlined, and one top-level pass leaves no marker behind.

use projex_expr::{rewrite_postorder, sentinel, Expr, Param, Rewriter};
use projex_result::{Error, Result};

use crate::config::ExpandConfig;
use crate::rebind::{rebind, Substitution};
use crate::resolve::ProjectionRef;

/// Expands projection markers. Holds no state between [`expand`](Self::expand) calls.
#[derive(Debug, Default)]
pub struct ProjectionExpander {
    config: ExpandConfig,
    depth: usize,
    inlined: usize,
}

impl ProjectionExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExpandConfig) -> Self {
        Self {
            config,
            depth: 0,
            inlined: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &ExpandConfig {
        &self.config
    }

    /// Return `expr` with every marker call inlined.
    ///
    /// A tree without marker calls comes back as the same handle.
    ///
    /// # Errors
    /// - [`Error::EvaluationError`] when a projection reference cannot be
    ///   resolved to a lambda.
    /// - [`Error::ArityMismatch`] when a call site supplies the wrong number
    ///   of actual arguments.
    /// - [`Error::CyclicProjection`] when projections nest deeper than
    ///   [`ExpandConfig::max_projection_depth`].
    pub fn expand(&mut self, expr: &Expr) -> Result<Expr> {
        self.depth = 0;
        self.inlined = 0;
        let expanded = rewrite_postorder(expr, self)?;
        if self.inlined > 0 {
            tracing::debug!(sites = self.inlined, "expanded projection tree");
        }
        Ok(expanded)
    }

    fn inline(&mut self, reference: &Expr, actuals: &[Expr]) -> Result<Expr> {
        let projection = ProjectionRef::classify(reference);
        let lambda = projection.resolve()?;
        if lambda.arity() != actuals.len() {
            return Err(Error::ArityMismatch {
                expected: lambda.arity(),
                actual: actuals.len(),
            });
        }

        let limit = self.config.max_projection_depth;
        if self.depth >= limit {
            tracing::warn!(limit, reference = %reference, "projection nesting limit reached");
            return Err(Error::CyclicProjection { limit });
        }
        tracing::debug!(
            shape = projection.shape(),
            arity = lambda.arity(),
            depth = self.depth,
            "inlining projection"
        );

        self.depth += 1;
        let body = rewrite_postorder(lambda.body(), self);
        self.depth -= 1;
        let body = body?;

        let substitution: Substitution = lambda
            .params()
            .iter()
            .map(Param::id)
            .zip(actuals.iter().cloned())
            .collect();
        self.inlined += 1;
        rebind(&body, &substitution)
    }
}

impl Rewriter for ProjectionExpander {
    fn exit(&mut self, _original: &Expr, rebuilt: Expr) -> Result<Expr> {
        if !sentinel::is_marker(&rebuilt) {
            return Ok(rebuilt);
        }
        match sentinel::marker_parts(&rebuilt) {
            Some((reference, actuals)) => self.inline(reference, actuals),
            None => Err(Error::InvalidArgumentError(
                "projection marker call is missing its projection reference".into(),
            )),
        }
    }
}

/// Expand with the default configuration.
pub fn expand(expr: &Expr) -> Result<Expr> {
    ProjectionExpander::new().expand(expr)
}

/// Expand with an explicit configuration.
pub fn expand_with(expr: &Expr, config: &ExpandConfig) -> Result<Expr> {
    ProjectionExpander::with_config(config.clone()).expand(expr)
}
