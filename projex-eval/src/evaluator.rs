//! Tree-walking evaluator.

use std::sync::Arc;

use projex_expr::{
    sentinel, BinaryOp, Expr, ExprKind, Function, Lambda, Param, ParamId, Record, Value,
};
use projex_result::{Error, Result};

use crate::{builtins, ops};

/// Supplies the rows behind [`ExprKind::Source`] leaves.
pub trait SourceResolver {
    fn resolve_source(&self, name: &str) -> Result<Value>;
}

/// Evaluates expression trees against a stack of lambda parameter bindings.
///
/// A *closed* evaluator has no sources: it can only evaluate trees that
/// depend on literals, captured values and host functions. That is the
/// mode used to obtain lambdas from projection references.
pub struct Evaluator<'a> {
    sources: Option<&'a dyn SourceResolver>,
    scope: Vec<(ParamId, Value)>,
}

impl<'a> Evaluator<'a> {
    pub fn closed() -> Self {
        Self {
            sources: None,
            scope: Vec::new(),
        }
    }

    pub fn with_sources(sources: &'a dyn SourceResolver) -> Self {
        Self {
            sources: Some(sources),
            scope: Vec::new(),
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr.kind() {
            ExprKind::Literal(lit) => Ok(Value::from(lit)),
            ExprKind::Captured { value, .. } => Ok(value.clone()),
            ExprKind::Source(name) => match self.sources {
                Some(sources) => sources.resolve_source(name),
                None => Err(Error::evaluation(format!(
                    "query source '{name}' is not available in a closed context"
                ))),
            },
            ExprKind::Parameter(param) => self.lookup(param),
            ExprKind::Member { base, member } => {
                let base = self.evaluate(base)?;
                member_of(&base, member)
            }
            ExprKind::Call { function, args } => self.call(function, args),
            ExprKind::Lambda(lambda) => Ok(Value::Lambda(lambda.clone())),
            ExprKind::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                ops::unary(*op, value)
            }
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                if !ops::truthy(&self.evaluate(left)?)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(ops::truthy(&self.evaluate(right)?)?))
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                if ops::truthy(&self.evaluate(left)?)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(ops::truthy(&self.evaluate(right)?)?))
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                ops::binary(*op, left, right)
            }
            ExprKind::Compare { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                ops::compare(*op, &left, &right)
            }
            ExprKind::Conditional {
                test,
                then,
                otherwise,
            } => {
                if ops::truthy(&self.evaluate(test)?)? {
                    self.evaluate(then)
                } else {
                    self.evaluate(otherwise)
                }
            }
            ExprKind::Record { type_name, fields } => {
                let mut record = Record::new(Arc::clone(type_name));
                for (name, field) in fields {
                    let value = self.evaluate(field)?;
                    record.set(name, value);
                }
                Ok(Value::from(record))
            }
        }
    }

    /// Invoke `lambda` with `args` bound to its parameters.
    pub fn apply(&mut self, lambda: &Lambda, args: Vec<Value>) -> Result<Value> {
        if lambda.arity() != args.len() {
            return Err(Error::ArityMismatch {
                expected: lambda.arity(),
                actual: args.len(),
            });
        }
        let mark = self.scope.len();
        self.scope.extend(
            lambda
                .params()
                .iter()
                .map(Param::id)
                .zip(args),
        );
        let result = self.evaluate(lambda.body());
        self.scope.truncate(mark);
        result
    }

    /// Obtain a lambda from an argument position: either a quoted lambda
    /// node or any expression evaluating to a lambda value.
    pub(crate) fn callable(&mut self, expr: &Expr) -> Result<Lambda> {
        if let ExprKind::Lambda(lambda) = expr.kind() {
            return Ok(lambda.clone());
        }
        match self.evaluate(expr)? {
            Value::Lambda(lambda) => Ok(lambda),
            other => Err(Error::type_mismatch("lambda", other.type_name())),
        }
    }

    fn lookup(&self, param: &Param) -> Result<Value> {
        self.scope
            .iter()
            .rev()
            .find(|(id, _)| *id == param.id())
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                Error::evaluation(format!("parameter '{}' is not bound", param.name()))
            })
    }

    fn call(&mut self, function: &Function, args: &[Expr]) -> Result<Value> {
        match function {
            Function::Builtin(builtin) => builtins::apply(self, *builtin, args),
            Function::Host(host) => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>>>()?;
                tracing::trace!(function = host.name(), args = values.len(), "invoking host function");
                host.invoke(&values)
            }
            Function::Project => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>>>()?;
                match values.split_first() {
                    Some((reference, actuals)) => sentinel::invoke(reference, actuals),
                    None => sentinel::invoke(&Value::Null, &[]),
                }
            }
        }
    }
}

/// Evaluate `expr` with no sources and no bound parameters.
pub fn evaluate_closed(expr: &Expr) -> Result<Value> {
    Evaluator::closed().evaluate(expr)
}

/// Member access on a runtime value. `null` propagates.
pub fn member_of(value: &Value, member: &str) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Record(record) => record.get(member).cloned().ok_or_else(|| {
            Error::InvalidArgumentError(format!(
                "{} has no member '{member}'",
                record.type_name()
            ))
        }),
        Value::List(items) if member == "count" => Ok(Value::Integer(items.len() as i64)),
        Value::String(s) if member == "length" => Ok(Value::Integer(s.chars().count() as i64)),
        other => Err(Error::InvalidArgumentError(format!(
            "{} has no member '{member}'",
            other.type_name()
        ))),
    }
}
