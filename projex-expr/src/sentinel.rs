//! The projection marker.
//!
//! A marker call `project(reference, a1, .., aN)` stands for "splice the
//! lambda produced by `reference` here, with its parameters bound to
//! `a1..aN`". It is recognised structurally by [`Function::Project`]; the
//! display name of the call plays no part. The marker has no runtime meaning:
//! [`invoke`] always fails, and only the expander may consume it.

use projex_result::{Error, Result};

use crate::expr::{Expr, ExprKind, Function};
use crate::value::Value;

/// Well-known call target of every projection marker.
pub const PROJECT: Function = Function::Project;

/// Message attached to [`Error::UnsupportedOperation`] when a marker is executed.
pub const UNEXPANDED_MARKER_MESSAGE: &str =
    "project() cannot be invoked directly; it must be routed through the wrapped query source first (call with_projections() on the source being queried)";

/// Build a marker call with one actual argument.
pub fn project1(reference: Expr, a1: Expr) -> Expr {
    project_n(reference, [a1])
}

pub fn project2(reference: Expr, a1: Expr, a2: Expr) -> Expr {
    project_n(reference, [a1, a2])
}

pub fn project3(reference: Expr, a1: Expr, a2: Expr, a3: Expr) -> Expr {
    project_n(reference, [a1, a2, a3])
}

pub fn project4(reference: Expr, a1: Expr, a2: Expr, a3: Expr, a4: Expr) -> Expr {
    project_n(reference, [a1, a2, a3, a4])
}

pub fn project5(reference: Expr, a1: Expr, a2: Expr, a3: Expr, a4: Expr, a5: Expr) -> Expr {
    project_n(reference, [a1, a2, a3, a4, a5])
}

/// Build a marker call with any number of actual arguments.
pub fn project_n(reference: Expr, actuals: impl IntoIterator<Item = Expr>) -> Expr {
    let mut args = vec![reference];
    args.extend(actuals);
    Expr::call(PROJECT, args)
}

/// Split a marker call into its projection reference and actual arguments.
///
/// Returns `None` for every other node, including a malformed marker call
/// without a reference argument.
pub fn marker_parts(expr: &Expr) -> Option<(&Expr, &[Expr])> {
    match expr.kind() {
        ExprKind::Call {
            function: Function::Project,
            args,
        } => args.split_first(),
        _ => None,
    }
}

#[inline]
pub fn is_marker(expr: &Expr) -> bool {
    matches!(
        expr.kind(),
        ExprKind::Call {
            function: Function::Project,
            ..
        }
    )
}

/// Direct execution of a marker. Always fails.
pub fn invoke(_reference: &Value, _actuals: &[Value]) -> Result<Value> {
    Err(Error::unsupported(UNEXPANDED_MARKER_MESSAGE))
}

impl Expr {
    /// Marker call using `self` as the projection reference.
    pub fn project1(self, a1: Expr) -> Expr {
        project1(self, a1)
    }

    pub fn project2(self, a1: Expr, a2: Expr) -> Expr {
        project2(self, a1, a2)
    }

    pub fn project3(self, a1: Expr, a2: Expr, a3: Expr) -> Expr {
        project3(self, a1, a2, a3)
    }

    pub fn project4(self, a1: Expr, a2: Expr, a3: Expr, a4: Expr) -> Expr {
        project4(self, a1, a2, a3, a4)
    }

    pub fn project5(self, a1: Expr, a2: Expr, a3: Expr, a4: Expr, a5: Expr) -> Expr {
        project5(self, a1, a2, a3, a4, a5)
    }

    pub fn project_n(self, actuals: impl IntoIterator<Item = Expr>) -> Expr {
        project_n(self, actuals)
    }
}
