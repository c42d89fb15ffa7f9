//! Resolution of projection references to lambda definitions.

use projex_eval::Evaluator;
use projex_expr::{Expr, ExprKind, Lambda, Param, Value};
use projex_result::{Error, Result};

/// Shape of the argument-0 subtree of a marker call.
#[derive(Debug, Clone, Copy)]
pub enum ProjectionRef<'a> {
    /// A lambda written directly at the call site.
    Inline(&'a Lambda),
    /// A value held by the host: a local variable, a static or an instance
    /// field captured into the tree.
    Constant { name: &'a str, value: &'a Value },
    /// Anything else, typically a static or instance method call producing
    /// the lambda.
    Invocation(&'a Expr),
}

impl<'a> ProjectionRef<'a> {
    pub fn classify(reference: &'a Expr) -> Self {
        match reference.kind() {
            ExprKind::Lambda(lambda) => ProjectionRef::Inline(lambda),
            ExprKind::Captured { name, value } => ProjectionRef::Constant {
                name: &**name,
                value,
            },
            _ => ProjectionRef::Invocation(reference),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            ProjectionRef::Inline(_) => "inline",
            ProjectionRef::Constant { .. } => "constant",
            ProjectionRef::Invocation(_) => "invocation",
        }
    }

    /// Produce the referenced lambda.
    ///
    /// Invocation shapes are evaluated as the body of a zero-argument lambda
    /// in a closed context: no query sources and no outer parameters are
    /// visible, so a reference that depends on row data fails here.
    pub fn resolve(&self) -> Result<Lambda> {
        match self {
            ProjectionRef::Inline(lambda) => Ok((*lambda).clone()),
            ProjectionRef::Constant { name, value } => match value {
                Value::Lambda(lambda) => Ok(lambda.clone()),
                other => Err(Error::evaluation(format!(
                    "projection reference `{name}` holds a {} value, expected a lambda",
                    other.type_name()
                ))),
            },
            ProjectionRef::Invocation(expr) => {
                let thunk = Lambda::new(Vec::<Param>::new(), (*expr).clone());
                let value = Evaluator::closed()
                    .apply(&thunk, Vec::new())
                    .map_err(|err| match err {
                        Error::EvaluationError(_) => err,
                        other => Error::evaluation(format!(
                            "projection reference `{expr}` failed: {other}"
                        )),
                    })?;
                match value {
                    Value::Lambda(lambda) => Ok(lambda),
                    other => Err(Error::evaluation(format!(
                        "projection reference `{expr}` evaluated to a {} value, expected a lambda",
                        other.type_name()
                    ))),
                }
            }
        }
    }
}

/// Resolve a projection reference subtree to its lambda definition.
pub fn resolve(reference: &Expr) -> Result<Lambda> {
    ProjectionRef::classify(reference).resolve()
}
