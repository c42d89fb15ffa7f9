//! Lightweight formatting helpers for expression trees.
//!
//! The rendering is a compact method-chain form meant for logs and test
//! diagnostics, e.g. `$projects.select(p => Row { aea: p.subprojects.average(sp => sp.area) })`.

use std::fmt;

use crate::expr::{BinaryOp, Builtin, CompareOp, Expr, ExprKind, Function, Lambda, UnaryOp};
use crate::literal::Literal;
use crate::value::Value;

impl BinaryOp {
    /// Render the operator as a human-readable symbol.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl CompareOp {
    /// Render the operator as a human-readable symbol.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
        }
    }
}

impl Builtin {
    /// Operator name as written in method-chain form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Builtin::Where => "where",
            Builtin::Select => "select",
            Builtin::OrderBy => "order_by",
            Builtin::Average => "average",
            Builtin::Sum => "sum",
            Builtin::Count => "count",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Any => "any",
            Builtin::ToString => "to_string",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Boolean(v) => write!(f, "{v}"),
            Literal::Integer(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v:?}"),
            Literal::String(v) => write!(f, "{v:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Record(record) => {
                write!(f, "{} {{ ", record.type_name())?;
                for (i, (name, value)) in record.fields().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str(" }")
            }
            Value::List(items) => {
                f.write_str("[")?;
                write_separated(f, items.iter())?;
                f.write_str("]")
            }
            Value::Lambda(lambda) => write!(f, "{lambda}"),
        }
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params() {
            [single] => write!(f, "{}", single.name())?,
            params => {
                f.write_str("(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(param.name())?;
                }
                f.write_str(")")?;
            }
        }
        write!(f, " => {}", self.body())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::Captured { name, .. } => write!(f, "${name}"),
            ExprKind::Source(name) => write!(f, "{name}"),
            ExprKind::Parameter(param) => f.write_str(param.name()),
            ExprKind::Member { base, member } => write!(f, "{base}.{member}"),
            ExprKind::Call { function, args } => match function {
                Function::Builtin(builtin) => match args.split_first() {
                    Some((receiver, rest)) => {
                        write!(f, "{receiver}.{}(", builtin.as_str())?;
                        write_separated(f, rest.iter())?;
                        f.write_str(")")
                    }
                    None => write!(f, "{}()", builtin.as_str()),
                },
                Function::Host(host) => {
                    write!(f, "{}(", host.name())?;
                    write_separated(f, args.iter())?;
                    f.write_str(")")
                }
                Function::Project => {
                    f.write_str("project(")?;
                    write_separated(f, args.iter())?;
                    f.write_str(")")
                }
            },
            ExprKind::Lambda(lambda) => write!(f, "{lambda}"),
            ExprKind::Unary { op, operand } => write!(f, "{}{operand}", op.as_str()),
            ExprKind::Binary { op, left, right } => write!(f, "({left} {} {right})", op.as_str()),
            ExprKind::Compare { op, left, right } => write!(f, "({left} {} {right})", op.as_str()),
            ExprKind::Conditional {
                test,
                then,
                otherwise,
            } => write!(f, "({test} ? {then} : {otherwise})"),
            ExprKind::Record { type_name, fields } => {
                write!(f, "{type_name} {{ ")?;
                for (i, (name, expr)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {expr}")?;
                }
                f.write_str(" }")
            }
        }
    }
}

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{DataType, ParamArena};

    #[test]
    fn renders_method_chain() {
        let mut arena = ParamArena::new();
        let p = arena.declare("p", DataType::record("Project"));
        let sp = arena.declare("sp", DataType::record("Subproject"));
        let expr = Expr::source("projects").select(Lambda::new(
            [p.clone()],
            Expr::param(&p)
                .member("subprojects")
                .filter(Lambda::new(
                    [sp.clone()],
                    Expr::param(&sp).member("area").lt(Expr::literal(1000)),
                ))
                .count(),
        ));
        assert_eq!(
            expr.to_string(),
            "projects.select(p => p.subprojects.where(sp => (sp.area < 1000)).count())"
        );
    }

    #[test]
    fn renders_multi_parameter_lambda_and_strings() {
        let mut arena = ParamArena::new();
        let a = arena.declare("a", DataType::String);
        let b = arena.declare("b", DataType::String);
        let lambda = Lambda::new(
            [a.clone(), b.clone()],
            Expr::param(&a) + Expr::literal("::") + Expr::param(&b),
        );
        assert_eq!(lambda.to_string(), "(a, b) => ((a + \"::\") + b)");
    }
}
