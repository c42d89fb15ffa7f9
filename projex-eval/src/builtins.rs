//! Sequence operators (`where`, `select`, aggregates, ...).
//!
//! Every builtin call carries its receiver as argument 0 and an optional
//! lambda as argument 1. Lambdas are applied in place: they are never
//! materialised as values unless the argument expression itself evaluates to
//! one.

use std::cmp::Ordering;
use std::sync::Arc;

use projex_expr::{Builtin, Expr, Lambda, Value};
use projex_result::{Error, Result};

use crate::evaluator::Evaluator;
use crate::ops;

pub(crate) fn apply(eval: &mut Evaluator<'_>, builtin: Builtin, args: &[Expr]) -> Result<Value> {
    let (receiver, rest) = args.split_first().ok_or_else(|| {
        Error::InvalidArgumentError(format!("{} requires a receiver", builtin.as_str()))
    })?;
    let lambda = match rest {
        [] => None,
        [lambda] => Some(eval.callable(lambda)?),
        _ => {
            return Err(Error::InvalidArgumentError(format!(
                "{} takes at most one lambda argument, got {}",
                builtin.as_str(),
                rest.len()
            )))
        }
    };
    let receiver = eval.evaluate(receiver)?;

    match builtin {
        Builtin::ToString => Ok(match receiver {
            Value::Null => Value::Null,
            Value::String(s) => Value::String(s),
            other => Value::String(Arc::from(other.to_string())),
        }),
        Builtin::Where => {
            let predicate = required(builtin, lambda)?;
            let mut kept = Vec::new();
            for item in sequence(builtin, receiver)?.iter() {
                if ops::truthy(&eval.apply(&predicate, vec![item.clone()])?)? {
                    kept.push(item.clone());
                }
            }
            Ok(Value::list(kept))
        }
        Builtin::Select => {
            let selector = required(builtin, lambda)?;
            let items = sequence(builtin, receiver)?;
            let mapped = items
                .iter()
                .map(|item| eval.apply(&selector, vec![item.clone()]))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::list(mapped))
        }
        Builtin::OrderBy => {
            let key = required(builtin, lambda)?;
            let items = sequence(builtin, receiver)?;
            let mut keyed = items
                .iter()
                .map(|item| Ok((eval.apply(&key, vec![item.clone()])?, item.clone())))
                .collect::<Result<Vec<_>>>()?;
            let mut failure = None;
            keyed.sort_by(|(a, _), (b, _)| order_keys(a, b).unwrap_or_else(|err| {
                failure.get_or_insert(err);
                Ordering::Equal
            }));
            match failure {
                Some(err) => Err(err),
                None => Ok(Value::list(keyed.into_iter().map(|(_, item)| item))),
            }
        }
        Builtin::Count => {
            let items = sequence(builtin, receiver)?;
            let count = match lambda {
                None => items.len(),
                Some(predicate) => {
                    let mut count = 0;
                    for item in items.iter() {
                        if ops::truthy(&eval.apply(&predicate, vec![item.clone()])?)? {
                            count += 1;
                        }
                    }
                    count
                }
            };
            Ok(Value::Integer(count as i64))
        }
        Builtin::Any => {
            let items = sequence(builtin, receiver)?;
            match lambda {
                None => Ok(Value::Boolean(!items.is_empty())),
                Some(predicate) => {
                    for item in items.iter() {
                        if ops::truthy(&eval.apply(&predicate, vec![item.clone()])?)? {
                            return Ok(Value::Boolean(true));
                        }
                    }
                    Ok(Value::Boolean(false))
                }
            }
        }
        Builtin::Average | Builtin::Sum | Builtin::Min | Builtin::Max => {
            let values = project_values(eval, builtin, receiver, lambda.as_ref())?;
            match builtin {
                Builtin::Average => average(&values),
                Builtin::Sum => sum(&values),
                Builtin::Min => extreme(&values, Ordering::Less),
                _ => extreme(&values, Ordering::Greater),
            }
        }
    }
}

fn required(builtin: Builtin, lambda: Option<Lambda>) -> Result<Lambda> {
    lambda.ok_or_else(|| {
        Error::InvalidArgumentError(format!("{} requires a lambda argument", builtin.as_str()))
    })
}

/// Receiver as a sequence. A `null` receiver behaves as an empty sequence.
fn sequence(builtin: Builtin, receiver: Value) -> Result<Arc<[Value]>> {
    match receiver {
        Value::List(items) => Ok(items),
        Value::Null => Ok(Arc::from(Vec::new())),
        other => Err(Error::type_mismatch(
            format!("list receiver for {}", builtin.as_str()),
            other.type_name(),
        )),
    }
}

/// Items mapped through the optional selector, with nulls dropped.
fn project_values(
    eval: &mut Evaluator<'_>,
    builtin: Builtin,
    receiver: Value,
    selector: Option<&Lambda>,
) -> Result<Vec<Value>> {
    let items = sequence(builtin, receiver)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items.iter() {
        let value = match selector {
            Some(selector) => eval.apply(selector, vec![item.clone()])?,
            None => item.clone(),
        };
        if !value.is_null() {
            out.push(value);
        }
    }
    Ok(out)
}

fn order_keys(a: &Value, b: &Value) -> Result<Ordering> {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ok(Ordering::Equal),
        (true, false) => Ok(Ordering::Less),
        (false, true) => Ok(Ordering::Greater),
        (false, false) => ops::order(a, b),
    }
}

fn numeric(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::type_mismatch("number", value.type_name()))
}

/// Mean as a float; `null` for an empty sequence.
fn average(values: &[Value]) -> Result<Value> {
    if values.is_empty() {
        return Ok(Value::Null);
    }
    let mut total = 0.0;
    for value in values {
        total += numeric(value)?;
    }
    Ok(Value::Float(total / values.len() as f64))
}

/// Integer sum while every input is an integer, float otherwise.
fn sum(values: &[Value]) -> Result<Value> {
    let mut acc = Value::Integer(0);
    for value in values {
        acc = match (acc, value) {
            (Value::Integer(a), Value::Integer(b)) => a
                .checked_add(*b)
                .map(Value::Integer)
                .ok_or_else(|| Error::InvalidArgumentError("integer overflow in sum".into()))?,
            (a, b) => Value::Float(numeric(&a)? + numeric(b)?),
        };
    }
    Ok(acc)
}

fn extreme(values: &[Value], wanted: Ordering) -> Result<Value> {
    let mut best: Option<&Value> = None;
    for value in values {
        best = match best {
            Some(current) if ops::order(value, current)? != wanted => Some(current),
            _ => Some(value),
        };
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}
