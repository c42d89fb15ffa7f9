//! Scalar operator kernels shared by the evaluator and the query operators.

use std::cmp::Ordering;
use std::sync::Arc;

use projex_expr::{BinaryOp, CompareOp, UnaryOp, Value};
use projex_result::{Error, Result};

/// Interpret a value as a condition. `null` counts as false.
pub fn truthy(value: &Value) -> Result<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Null => Ok(false),
        other => Err(Error::type_mismatch("bool", other.type_name())),
    }
}

pub fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    match (op, value) {
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Negate, Value::Integer(v)) => v
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| Error::InvalidArgumentError(format!("negating {v} overflows"))),
        (UnaryOp::Negate, Value::Float(v)) => Ok(Value::Float(-v)),
        (UnaryOp::Not, other) => Err(Error::type_mismatch("bool", other.type_name())),
        (UnaryOp::Negate, other) => Err(Error::type_mismatch("number", other.type_name())),
    }
}

/// Apply an arithmetic or logical operator.
///
/// `+` concatenates when either side is a string, rendering `null` as an
/// empty string. Otherwise a `null` operand yields `null`.
pub fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    if op == BinaryOp::Add
        && (matches!(left, Value::String(_)) || matches!(right, Value::String(_)))
    {
        return Ok(Value::String(Arc::from(format!(
            "{}{}",
            concat_operand(&left),
            concat_operand(&right)
        ))));
    }

    match op {
        BinaryOp::And => return Ok(Value::Boolean(truthy(&left)? && truthy(&right)?)),
        BinaryOp::Or => return Ok(Value::Boolean(truthy(&left)? || truthy(&right)?)),
        _ => {}
    }

    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Integer(l), Value::Integer(r)) => integer_arithmetic(op, l, r),
        (l, r) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) => Ok(Value::Float(float_arithmetic(op, l, r))),
            _ => Err(Error::type_mismatch(
                "numbers",
                format!("{} {} {}", l.type_name(), op.as_str(), r.type_name()),
            )),
        },
    }
}

fn concat_operand(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn integer_arithmetic(op: BinaryOp, l: i64, r: i64) -> Result<Value> {
    let result = match op {
        BinaryOp::Add => l.checked_add(r),
        BinaryOp::Subtract => l.checked_sub(r),
        BinaryOp::Multiply => l.checked_mul(r),
        BinaryOp::Divide | BinaryOp::Modulo if r == 0 => {
            return Err(Error::InvalidArgumentError("division by zero".into()));
        }
        BinaryOp::Divide => l.checked_div(r),
        BinaryOp::Modulo => l.checked_rem(r),
        BinaryOp::And | BinaryOp::Or => {
            return Err(Error::type_mismatch("bool", "int"));
        }
    };
    result.map(Value::Integer).ok_or_else(|| {
        Error::InvalidArgumentError(format!("integer overflow in {l} {} {r}", op.as_str()))
    })
}

fn float_arithmetic(op: BinaryOp, l: f64, r: f64) -> f64 {
    match op {
        BinaryOp::Add => l + r,
        BinaryOp::Subtract => l - r,
        BinaryOp::Multiply => l * r,
        BinaryOp::Divide => l / r,
        BinaryOp::Modulo => l % r,
        // unreachable: logical operators return before numeric dispatch
        BinaryOp::And | BinaryOp::Or => f64::NAN,
    }
}

/// Compare two values. Ordering comparisons against `null` are false;
/// `null == null` is true.
pub fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        let both = left.is_null() && right.is_null();
        return Ok(Value::Boolean(match op {
            CompareOp::Eq => both,
            CompareOp::NotEq => !both,
            _ => false,
        }));
    }

    let outcome = match op {
        CompareOp::Eq => equal(left, right)?,
        CompareOp::NotEq => !equal(left, right)?,
        CompareOp::Lt => order(left, right)? == Ordering::Less,
        CompareOp::LtEq => order(left, right)? != Ordering::Greater,
        CompareOp::Gt => order(left, right)? == Ordering::Greater,
        CompareOp::GtEq => order(left, right)? != Ordering::Less,
    };
    Ok(Value::Boolean(outcome))
}

fn equal(left: &Value, right: &Value) -> Result<bool> {
    match (left, right) {
        (Value::Record(_), _) | (Value::List(_), _) | (Value::Lambda(_), _) => Ok(left == right),
        _ => Ok(order(left, right)? == Ordering::Equal),
    }
}

/// Total order over comparable scalars: numbers (mixed integer/float),
/// strings, and booleans.
pub fn order(left: &Value, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => Ok(l.cmp(r)),
        (Value::String(l), Value::String(r)) => Ok(l.cmp(r)),
        (Value::Boolean(l), Value::Boolean(r)) => Ok(l.cmp(r)),
        (l, r) => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).ok_or_else(|| {
                Error::InvalidArgumentError("cannot order NaN".into())
            }),
            _ => Err(Error::type_mismatch(
                "comparable values",
                format!("{} and {}", l.type_name(), r.type_name()),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_concatenation_renders_numbers() {
        let out = binary(BinaryOp::Add, Value::from("Area: "), Value::Integer(100)).unwrap();
        assert_eq!(out, Value::from("Area: 100"));
        let out = binary(BinaryOp::Add, Value::from("x"), Value::Null).unwrap();
        assert_eq!(out, Value::from("x"));
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(
            binary(BinaryOp::Add, Value::Integer(3), Value::Integer(5)).unwrap(),
            Value::Integer(8)
        );
        assert_eq!(
            binary(BinaryOp::Multiply, Value::Integer(10), Value::Float(0.5)).unwrap(),
            Value::Float(5.0)
        );
        assert!(binary(BinaryOp::Divide, Value::Integer(1), Value::Integer(0)).is_err());
        assert!(binary(BinaryOp::Add, Value::Integer(i64::MAX), Value::Integer(1)).is_err());
    }

    #[test]
    fn null_propagates_through_arithmetic() {
        assert_eq!(
            binary(BinaryOp::Subtract, Value::Null, Value::Integer(1)).unwrap(),
            Value::Null
        );
        assert_eq!(unary(UnaryOp::Negate, Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn comparisons_mix_integer_and_float() {
        assert_eq!(
            compare(CompareOp::Lt, &Value::Integer(350), &Value::Float(1000.0)).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            compare(CompareOp::Lt, &Value::Null, &Value::Integer(1)).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            compare(CompareOp::Eq, &Value::Null, &Value::Null).unwrap(),
            Value::Boolean(true)
        );
        assert!(compare(CompareOp::Lt, &Value::from("a"), &Value::Integer(1)).is_err());
    }

    #[test]
    fn truthiness_rejects_non_booleans() {
        assert!(!truthy(&Value::Null).unwrap());
        assert!(truthy(&Value::Integer(1)).is_err());
    }
}
