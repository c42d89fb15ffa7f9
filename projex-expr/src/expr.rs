//! Immutable, structurally shared expression trees.
#![forbid(unsafe_code)]

use std::fmt;
use std::ops;
use std::sync::Arc;

use projex_result::{Error, Result};

use crate::literal::Literal;
use crate::param::Param;
use crate::value::Value;

/// Handle to an immutable expression node.
///
/// Cloning is a reference-count bump. Rewrites never mutate a node; they
/// build new parents along changed paths and reuse every other subtree, which
/// [`Expr::ptr_eq`] makes observable.
#[derive(Clone)]
pub struct Expr(Arc<ExprKind>);

/// Node variants of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    /// Value closed over by the query author: a local variable, a static
    /// field, or an object whose fields or methods are used further up.
    Captured { name: Arc<str>, value: Value },
    /// Root collection of a composed query, bound by the executing engine.
    Source(Arc<str>),
    Parameter(Param),
    Member { base: Expr, member: Arc<str> },
    Call { function: Function, args: Vec<Expr> },
    Lambda(Lambda),
    Unary { op: UnaryOp, operand: Expr },
    Binary { op: BinaryOp, left: Expr, right: Expr },
    Compare { op: CompareOp, left: Expr, right: Expr },
    Conditional { test: Expr, then: Expr, otherwise: Expr },
    /// Construction of a record, e.g. the row shape produced by a `select`.
    Record {
        type_name: Arc<str>,
        fields: Vec<(Arc<str>, Expr)>,
    },
}

/// Call target of a [`ExprKind::Call`] node.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    /// Query operator understood by every backend. Argument 0 is the
    /// receiver; lambda arguments are applied per element.
    Builtin(Builtin),
    /// Host code a backend cannot translate (a static or instance method).
    Host(HostFunction),
    /// The projection marker. Argument 0 is the projection reference and the
    /// remaining arguments are the actual values for its parameters.
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Where,
    Select,
    OrderBy,
    Average,
    Sum,
    Count,
    Min,
    Max,
    Any,
    ToString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
}

/// Signature of a host function body.
pub type HostFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// Named host function. Instance methods take their receiver as argument 0.
///
/// Two host functions are equal only when they share the same closure.
#[derive(Clone)]
pub struct HostFunction {
    name: Arc<str>,
    func: Arc<HostFn>,
}

impl HostFunction {
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn invoke(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for HostFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func) && self.name == other.name
    }
}

/// Lambda definition: ordered formal parameters and a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    params: Arc<[Param]>,
    body: Expr,
}

impl Lambda {
    pub fn new(params: impl IntoIterator<Item = Param>, body: Expr) -> Self {
        Self {
            params: params.into_iter().collect(),
            body,
        }
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    #[inline]
    pub fn body(&self) -> &Expr {
        &self.body
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind) -> Self {
        Expr(Arc::new(kind))
    }

    #[inline]
    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// True when both handles point at the same node.
    #[inline]
    pub fn ptr_eq(a: &Expr, b: &Expr) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    // --- leaves ---

    pub fn literal(value: impl Into<Literal>) -> Self {
        Expr::new(ExprKind::Literal(value.into()))
    }

    pub fn null() -> Self {
        Expr::new(ExprKind::Literal(Literal::Null))
    }

    pub fn captured(name: &str, value: impl Into<Value>) -> Self {
        Expr::new(ExprKind::Captured {
            name: Arc::from(name),
            value: value.into(),
        })
    }

    pub fn source(name: &str) -> Self {
        Expr::new(ExprKind::Source(Arc::from(name)))
    }

    pub fn param(param: &Param) -> Self {
        Expr::new(ExprKind::Parameter(param.clone()))
    }

    // --- composites ---

    pub fn lambda(lambda: Lambda) -> Self {
        Expr::new(ExprKind::Lambda(lambda))
    }

    pub fn call(function: Function, args: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Call { function, args })
    }

    pub fn host_call(function: &HostFunction, args: Vec<Expr>) -> Self {
        Expr::call(Function::Host(function.clone()), args)
    }

    pub fn record<'a>(type_name: &str, fields: impl IntoIterator<Item = (&'a str, Expr)>) -> Self {
        Expr::new(ExprKind::Record {
            type_name: Arc::from(type_name),
            fields: fields
                .into_iter()
                .map(|(name, expr)| (Arc::from(name), expr))
                .collect(),
        })
    }

    pub fn conditional(test: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::new(ExprKind::Conditional {
            test,
            then,
            otherwise,
        })
    }

    pub fn member(self, member: &str) -> Self {
        Expr::new(ExprKind::Member {
            base: self,
            member: Arc::from(member),
        })
    }

    pub fn binary(self, op: BinaryOp, right: Expr) -> Self {
        Expr::new(ExprKind::Binary {
            op,
            left: self,
            right,
        })
    }

    pub fn compare(self, op: CompareOp, right: Expr) -> Self {
        Expr::new(ExprKind::Compare {
            op,
            left: self,
            right,
        })
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::new(ExprKind::Unary { op, operand })
    }

    pub fn lt(self, right: Expr) -> Self {
        self.compare(CompareOp::Lt, right)
    }

    pub fn lt_eq(self, right: Expr) -> Self {
        self.compare(CompareOp::LtEq, right)
    }

    pub fn gt(self, right: Expr) -> Self {
        self.compare(CompareOp::Gt, right)
    }

    pub fn gt_eq(self, right: Expr) -> Self {
        self.compare(CompareOp::GtEq, right)
    }

    pub fn equals(self, right: Expr) -> Self {
        self.compare(CompareOp::Eq, right)
    }

    pub fn not_equals(self, right: Expr) -> Self {
        self.compare(CompareOp::NotEq, right)
    }

    pub fn and(self, right: Expr) -> Self {
        self.binary(BinaryOp::And, right)
    }

    pub fn or(self, right: Expr) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    // --- query operators ---

    fn builtin(self, builtin: Builtin, lambda: Option<Lambda>) -> Self {
        let mut args = vec![self];
        args.extend(lambda.map(Expr::lambda));
        Expr::call(Function::Builtin(builtin), args)
    }

    pub fn filter(self, predicate: Lambda) -> Self {
        self.builtin(Builtin::Where, Some(predicate))
    }

    pub fn select(self, selector: Lambda) -> Self {
        self.builtin(Builtin::Select, Some(selector))
    }

    pub fn order_by(self, key: Lambda) -> Self {
        self.builtin(Builtin::OrderBy, Some(key))
    }

    pub fn average(self, selector: Lambda) -> Self {
        self.builtin(Builtin::Average, Some(selector))
    }

    pub fn sum(self, selector: Lambda) -> Self {
        self.builtin(Builtin::Sum, Some(selector))
    }

    pub fn min(self, selector: Lambda) -> Self {
        self.builtin(Builtin::Min, Some(selector))
    }

    pub fn max(self, selector: Lambda) -> Self {
        self.builtin(Builtin::Max, Some(selector))
    }

    pub fn count(self) -> Self {
        self.builtin(Builtin::Count, None)
    }

    pub fn any(self, predicate: Option<Lambda>) -> Self {
        self.builtin(Builtin::Any, predicate)
    }

    /// Render the value as a string (`ToString` operator).
    pub fn stringify(self) -> Self {
        self.builtin(Builtin::ToString, None)
    }

    // --- structure ---

    /// Direct children in a fixed, variant-specific order.
    pub fn children(&self) -> Vec<&Expr> {
        match self.kind() {
            ExprKind::Literal(_)
            | ExprKind::Captured { .. }
            | ExprKind::Source(_)
            | ExprKind::Parameter(_) => Vec::new(),
            ExprKind::Member { base, .. } => vec![base],
            ExprKind::Call { args, .. } => args.iter().collect(),
            ExprKind::Lambda(lambda) => vec![lambda.body()],
            ExprKind::Unary { operand, .. } => vec![operand],
            ExprKind::Binary { left, right, .. } | ExprKind::Compare { left, right, .. } => {
                vec![left, right]
            }
            ExprKind::Conditional {
                test,
                then,
                otherwise,
            } => vec![test, then, otherwise],
            ExprKind::Record { fields, .. } => fields.iter().map(|(_, expr)| expr).collect(),
        }
    }

    /// Rebuild this node around new children, given in [`Expr::children`] order.
    ///
    /// Returns the original handle when every child is pointer-identical to
    /// the current one, so unchanged subtrees stay shared.
    pub fn with_children(&self, children: Vec<Expr>) -> Result<Expr> {
        let current = self.children();
        if current.len() != children.len() {
            return Err(Error::Internal(format!(
                "with_children: node has {} children, got {}",
                current.len(),
                children.len()
            )));
        }
        if current
            .iter()
            .zip(children.iter())
            .all(|(old, new)| Expr::ptr_eq(old, new))
        {
            return Ok(self.clone());
        }

        let mut next = children.into_iter();
        let mut take = || {
            next.next()
                .ok_or_else(|| Error::Internal("with_children: child underflow".into()))
        };

        let kind = match self.kind() {
            ExprKind::Literal(_)
            | ExprKind::Captured { .. }
            | ExprKind::Source(_)
            | ExprKind::Parameter(_) => return Ok(self.clone()),
            ExprKind::Member { member, .. } => ExprKind::Member {
                base: take()?,
                member: Arc::clone(member),
            },
            ExprKind::Call { function, args } => ExprKind::Call {
                function: function.clone(),
                args: (0..args.len()).map(|_| take()).collect::<Result<_>>()?,
            },
            ExprKind::Lambda(lambda) => ExprKind::Lambda(Lambda {
                params: Arc::clone(&lambda.params),
                body: take()?,
            }),
            ExprKind::Unary { op, .. } => ExprKind::Unary {
                op: *op,
                operand: take()?,
            },
            ExprKind::Binary { op, .. } => ExprKind::Binary {
                op: *op,
                left: take()?,
                right: take()?,
            },
            ExprKind::Compare { op, .. } => ExprKind::Compare {
                op: *op,
                left: take()?,
                right: take()?,
            },
            ExprKind::Conditional { .. } => ExprKind::Conditional {
                test: take()?,
                then: take()?,
                otherwise: take()?,
            },
            ExprKind::Record { type_name, fields } => ExprKind::Record {
                type_name: Arc::clone(type_name),
                fields: fields
                    .iter()
                    .map(|(name, _)| -> Result<(Arc<str>, Expr)> {
                        Ok((Arc::clone(name), take()?))
                    })
                    .collect::<Result<_>>()?,
            },
        };
        Ok(Expr::new(kind))
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Expr::ptr_eq(self, other) || self.0 == other.0
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<Lambda> for Expr {
    fn from(lambda: Lambda) -> Self {
        Expr::lambda(lambda)
    }
}

impl From<&Param> for Expr {
    fn from(param: &Param) -> Self {
        Expr::param(param)
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                self.binary($op, rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, BinaryOp::Add);
impl_binary_operator!(Sub, sub, BinaryOp::Subtract);
impl_binary_operator!(Mul, mul, BinaryOp::Multiply);
impl_binary_operator!(Div, div, BinaryOp::Divide);
impl_binary_operator!(Rem, rem, BinaryOp::Modulo);

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self)
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Negate, self)
    }
}
