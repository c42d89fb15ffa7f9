//! Parameter rebinding.

use projex_expr::{rewrite_postorder, Expr, ExprKind, ParamId, Rewriter};
use projex_result::Result;
use rustc_hash::FxHashMap;

/// Parameter identity to replacement subtree.
pub type Substitution = FxHashMap<ParamId, Expr>;

/// Replaces parameter leaves whose identity is a key of the substitution.
///
/// Matching is by [`ParamId`]; a nested lambda parameter that merely shares
/// a display name with a key is left alone. Replacements are inserted as-is
/// and never revisited.
pub struct ParameterRebinder<'a> {
    substitution: &'a Substitution,
    replaced: usize,
}

impl<'a> ParameterRebinder<'a> {
    pub fn new(substitution: &'a Substitution) -> Self {
        Self {
            substitution,
            replaced: 0,
        }
    }

    /// Number of parameter occurrences replaced so far.
    pub fn replaced(&self) -> usize {
        self.replaced
    }

    pub fn rebind(&mut self, expr: &Expr) -> Result<Expr> {
        if self.substitution.is_empty() {
            return Ok(expr.clone());
        }
        rewrite_postorder(expr, self)
    }
}

impl Rewriter for ParameterRebinder<'_> {
    fn enter(&mut self, node: &Expr) -> Result<Option<Expr>> {
        if let ExprKind::Parameter(param) = node.kind() {
            if let Some(replacement) = self.substitution.get(&param.id()) {
                tracing::trace!(param = param.name(), replacement = %replacement, "rebinding parameter");
                self.replaced += 1;
                return Ok(Some(replacement.clone()));
            }
        }
        Ok(None)
    }

    fn exit(&mut self, _original: &Expr, rebuilt: Expr) -> Result<Expr> {
        Ok(rebuilt)
    }
}

/// Rebind `expr` under `substitution`. An empty substitution returns `expr`.
pub fn rebind(expr: &Expr, substitution: &Substitution) -> Result<Expr> {
    ParameterRebinder::new(substitution).rebind(expr)
}
