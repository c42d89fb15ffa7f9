//! Iterative postorder traversal utilities for expression trees.
//!
//! Both helpers use explicit work and result stacks instead of recursion, so
//! deeply nested trees (long `+` chains built in a loop, thousands of chained
//! operators) do not overflow the thread stack.
//!
//! # Two Approaches
//!
//! ## 1. Rewriting ([`Rewriter`] and [`rewrite_postorder`])
//!
//! Produces a new tree. `enter` may short-circuit a subtree with a
//! replacement; otherwise children are rewritten first, the node is rebuilt
//! with [`Expr::with_children`] (sharing it when no child changed), and `exit`
//! sees the rebuilt node.
//!
//! ## 2. Folding ([`fold_postorder`])
//!
//! Computes a value from child values, e.g. counting marker calls.
//!
//! # Example
//!
//! ```
//! use projex_expr::{Expr, fold_postorder};
//!
//! let expr = (Expr::literal(1) + Expr::literal(2)) * Expr::literal(3);
//! let leaves = fold_postorder(&expr, |_, children: Vec<usize>| {
//!     Ok(if children.is_empty() { 1 } else { children.iter().sum() })
//! })
//! .unwrap();
//! assert_eq!(leaves, 3);
//! ```

use projex_result::{Error, Result};

use crate::expr::Expr;

/// A frame in the traversal work stack.
///
/// - `Enter`: begin visiting a node (descend to children)
/// - `Exit`: complete a node visit (combine child results)
/// - `Done`: a result that needs no further work
enum Frame<'a, T> {
    Enter(&'a Expr),
    Exit(&'a Expr, usize),
    Done(T),
}

/// Callbacks driven by [`rewrite_postorder`].
pub trait Rewriter {
    /// Called when first encountering a node.
    ///
    /// Returning `Some(replacement)` substitutes the whole subtree without
    /// descending into it; the replacement is not visited.
    fn enter(&mut self, _node: &Expr) -> Result<Option<Expr>> {
        Ok(None)
    }

    /// Called after all children have been rewritten.
    ///
    /// `rebuilt` is `original` itself when no child changed.
    fn exit(&mut self, original: &Expr, rebuilt: Expr) -> Result<Expr>;
}

/// Rewrite `root` bottom-up without recursion.
///
/// # Errors
/// Returns errors from the rewriter callbacks, or [`Error::Internal`] if the
/// traversal reaches an inconsistent state.
pub fn rewrite_postorder<R>(root: &Expr, rewriter: &mut R) -> Result<Expr>
where
    R: Rewriter + ?Sized,
{
    let mut work_stack: Vec<Frame<'_, Expr>> = vec![Frame::Enter(root)];
    let mut result_stack: Vec<Expr> = Vec::new();

    while let Some(frame) = work_stack.pop() {
        match frame {
            Frame::Enter(node) => {
                if let Some(replacement) = rewriter.enter(node)? {
                    result_stack.push(replacement);
                    continue;
                }
                let children = node.children();
                work_stack.push(Frame::Exit(node, children.len()));
                for child in children.into_iter().rev() {
                    work_stack.push(Frame::Enter(child));
                }
            }
            Frame::Exit(node, child_count) => {
                let children = drain_children(&mut result_stack, child_count, "rewrite_postorder")?;
                let rebuilt = node.with_children(children)?;
                let output = rewriter.exit(node, rebuilt)?;
                result_stack.push(output);
            }
            Frame::Done(output) => result_stack.push(output),
        }
    }

    single_result(result_stack, "rewrite_postorder")
}

/// Fold `root` bottom-up without recursion.
///
/// `combine` receives each node together with the outputs of its children in
/// [`Expr::children`] order.
pub fn fold_postorder<T, F>(root: &Expr, mut combine: F) -> Result<T>
where
    F: FnMut(&Expr, Vec<T>) -> Result<T>,
{
    let mut work_stack: Vec<Frame<'_, T>> = vec![Frame::Enter(root)];
    let mut result_stack: Vec<T> = Vec::new();

    while let Some(frame) = work_stack.pop() {
        match frame {
            Frame::Enter(node) => {
                let children = node.children();
                if children.is_empty() {
                    work_stack.push(Frame::Done(combine(node, Vec::new())?));
                    continue;
                }
                work_stack.push(Frame::Exit(node, children.len()));
                for child in children.into_iter().rev() {
                    work_stack.push(Frame::Enter(child));
                }
            }
            Frame::Exit(node, child_count) => {
                let children = drain_children(&mut result_stack, child_count, "fold_postorder")?;
                result_stack.push(combine(node, children)?);
            }
            Frame::Done(output) => result_stack.push(output),
        }
    }

    single_result(result_stack, "fold_postorder")
}

fn drain_children<T>(result_stack: &mut Vec<T>, count: usize, context: &str) -> Result<Vec<T>> {
    if result_stack.len() < count {
        return Err(Error::Internal(format!(
            "{context}: result stack underflow"
        )));
    }
    let start = result_stack.len() - count;
    Ok(result_stack.drain(start..).collect())
}

fn single_result<T>(mut result_stack: Vec<T>, context: &str) -> Result<T> {
    if result_stack.len() != 1 {
        return Err(Error::Internal(format!(
            "{context}: expected 1 result, got {}",
            result_stack.len()
        )));
    }
    result_stack
        .pop()
        .ok_or_else(|| Error::Internal(format!("{context}: empty result stack")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExprKind;
    use crate::literal::Literal;

    struct DoubleIntegers;

    impl Rewriter for DoubleIntegers {
        fn exit(&mut self, _original: &Expr, rebuilt: Expr) -> Result<Expr> {
            match rebuilt.kind() {
                ExprKind::Literal(Literal::Integer(v)) => Ok(Expr::literal(v * 2)),
                _ => Ok(rebuilt),
            }
        }
    }

    struct Untouched;

    impl Rewriter for Untouched {
        fn exit(&mut self, _original: &Expr, rebuilt: Expr) -> Result<Expr> {
            Ok(rebuilt)
        }
    }

    #[test]
    fn rewrite_rebuilds_changed_paths() {
        let expr = Expr::literal(2) + Expr::literal(3);
        let doubled = rewrite_postorder(&expr, &mut DoubleIntegers).unwrap();
        assert_eq!(doubled, Expr::literal(4i64) + Expr::literal(6i64));
    }

    #[test]
    fn identity_rewrite_preserves_sharing() {
        let expr = (Expr::literal(2) + Expr::literal(3)).member("x");
        let same = rewrite_postorder(&expr, &mut Untouched).unwrap();
        assert!(Expr::ptr_eq(&expr, &same));
    }

    #[test]
    fn enter_replacement_skips_subtree() {
        struct ReplaceMembers;
        impl Rewriter for ReplaceMembers {
            fn enter(&mut self, node: &Expr) -> Result<Option<Expr>> {
                Ok(matches!(node.kind(), ExprKind::Member { .. }).then(|| Expr::literal(0)))
            }
            fn exit(&mut self, _original: &Expr, rebuilt: Expr) -> Result<Expr> {
                Ok(rebuilt)
            }
        }
        let expr = Expr::literal(1).member("a") + Expr::literal(1);
        let out = rewrite_postorder(&expr, &mut ReplaceMembers).unwrap();
        assert_eq!(out, Expr::literal(0) + Expr::literal(1));
    }

    #[test]
    fn fold_counts_nodes_in_deep_chain() {
        let mut expr = Expr::literal(1);
        for _ in 0..2_000 {
            expr = expr + Expr::literal(1);
        }
        let nodes = fold_postorder(&expr, |_, children: Vec<usize>| {
            Ok(1 + children.iter().sum::<usize>())
        })
        .unwrap();
        assert_eq!(nodes, 4_001);
    }
}
