//! In-memory reference engine.
//!
//! [`MemoryProvider`] evaluates query trees against named row lists. In
//! strict mode it first checks the tree the way a translating backend would
//! (one that ships the query elsewhere and cannot run host code), so it
//! rejects the same trees such a backend would.

use std::any::Any;
use std::sync::{Arc, Weak};

use projex_eval::{Evaluator, SourceResolver};
use projex_expr::{fold_postorder, sentinel, Expr, ExprKind, Function, Value};
use projex_result::{Error, Result};
use rustc_hash::FxHashMap;

use crate::queryable::Queryable;
use crate::source::{QueryProvider, QuerySource, RowIter};

/// Behaviour switches for [`MemoryProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryProviderConfig {
    /// Reject trees a translating backend could not run: marker calls, host
    /// function calls, and lambda values outside operator-argument position.
    pub strict_translation: bool,
}

impl Default for MemoryProviderConfig {
    fn default() -> Self {
        Self {
            strict_translation: true,
        }
    }
}

/// Named row lists.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    sources: FxHashMap<Arc<str>, Arc<[Value]>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the rows behind `name`.
    pub fn register(&mut self, name: &str, rows: impl IntoIterator<Item = Value>) {
        self.sources.insert(Arc::from(name), rows.into_iter().collect());
    }

    pub fn with_source(mut self, name: &str, rows: impl IntoIterator<Item = Value>) -> Self {
        self.register(name, rows);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(|name| &**name)
    }
}

impl SourceResolver for MemoryCatalog {
    fn resolve_source(&self, name: &str) -> Result<Value> {
        self.sources
            .get(name)
            .map(|rows| Value::List(Arc::clone(rows)))
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }
}

pub struct MemoryProvider {
    catalog: Arc<MemoryCatalog>,
    config: MemoryProviderConfig,
    this: Weak<MemoryProvider>,
}

impl MemoryProvider {
    pub fn new(catalog: MemoryCatalog) -> Arc<Self> {
        Self::with_config(catalog, MemoryProviderConfig::default())
    }

    pub fn with_config(catalog: MemoryCatalog, config: MemoryProviderConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            catalog: Arc::new(catalog),
            config,
            this: this.clone(),
        })
    }

    pub fn catalog(&self) -> &MemoryCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &MemoryProviderConfig {
        &self.config
    }

    /// Root query over a registered source.
    pub fn source(&self, name: &str) -> Result<Queryable> {
        if !self.catalog.contains(name) {
            return Err(Error::NotFound(name.to_string()));
        }
        Ok(Queryable::new(self.create_query(Expr::source(name))?))
    }

    fn shared(&self) -> Result<Arc<Self>> {
        self.this
            .upgrade()
            .ok_or_else(|| Error::Internal("memory provider is no longer alive".into()))
    }

    /// Check that `expression` is something a translating backend accepts.
    pub fn validate(&self, expression: &Expr) -> Result<()> {
        if !self.config.strict_translation {
            return Ok(());
        }
        // Markers first: an unexpanded tree is reported as such even when
        // the marker's own arguments are untranslatable.
        let markers = fold_postorder(expression, |node, children: Vec<usize>| {
            Ok(children.iter().sum::<usize>() + usize::from(sentinel::is_marker(node)))
        })?;
        if markers > 0 {
            tracing::debug!(markers, "rejecting tree with unexpanded projection markers");
            return Err(Error::unsupported(sentinel::UNEXPANDED_MARKER_MESSAGE));
        }

        let root = fold_postorder(expression, translatable)?;
        if root == Shape::LambdaValue {
            return Err(lambda_value_error());
        }
        Ok(())
    }
}

/// What a checked subtree produces, as far as its parent is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Data,
    LambdaValue,
}

fn lambda_value_error() -> Error {
    Error::InvalidArgumentError(
        "a lambda cannot be used as a value; invoke it through a projection instead".into(),
    )
}

fn translatable(node: &Expr, children: Vec<Shape>) -> Result<Shape> {
    // Operator calls take lambdas after the receiver; everything else takes data.
    let lambdas_allowed_from = match node.kind() {
        ExprKind::Call {
            function: Function::Builtin(_),
            ..
        } => 1,
        ExprKind::Call {
            function: Function::Host(host),
            ..
        } => {
            return Err(Error::InvalidArgumentError(format!(
                "host function `{}` cannot be translated",
                host.name()
            )))
        }
        _ => usize::MAX,
    };
    if children
        .iter()
        .enumerate()
        .any(|(i, shape)| *shape == Shape::LambdaValue && i < lambdas_allowed_from)
    {
        return Err(lambda_value_error());
    }

    Ok(match node.kind() {
        ExprKind::Lambda(_) => Shape::LambdaValue,
        ExprKind::Captured {
            value: Value::Lambda(_),
            ..
        } => Shape::LambdaValue,
        _ => Shape::Data,
    })
}

impl QueryProvider for MemoryProvider {
    fn create_query(&self, expression: Expr) -> Result<Arc<dyn QuerySource>> {
        Ok(Arc::new(MemoryQuery {
            expression,
            provider: self.shared()?,
        }))
    }

    fn execute(&self, expression: &Expr) -> Result<Value> {
        self.validate(expression)?;
        tracing::trace!(expression = %expression, "memory provider executing");
        Evaluator::with_sources(&*self.catalog).evaluate(expression)
    }
}

/// Query bound to a [`MemoryProvider`].
pub struct MemoryQuery {
    expression: Expr,
    provider: Arc<MemoryProvider>,
}

impl QuerySource for MemoryQuery {
    fn expression(&self) -> &Expr {
        &self.expression
    }

    fn provider(&self) -> Arc<dyn QueryProvider> {
        Arc::clone(&self.provider) as Arc<dyn QueryProvider>
    }

    fn rows(&self) -> Result<RowIter> {
        self.provider.execute_sequence(&self.expression)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projex_expr::{DataType, HostFunction, Lambda, ParamArena, Record};

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new().with_source(
            "items",
            [10i64, 20, 30].map(|n| Value::from(Record::new("Item").with_field("n", n))),
        )
    }

    #[test]
    fn unknown_source_is_not_found() {
        let provider = MemoryProvider::new(catalog());
        assert!(matches!(provider.source("missing"), Err(Error::NotFound(_))));
    }

    #[test]
    fn evaluates_composed_queries() {
        let mut arena = ParamArena::new();
        let i = arena.declare("i", DataType::record("Item"));
        let provider = MemoryProvider::new(catalog());
        let items = provider.source("items").unwrap();
        let big = items
            .filter(Lambda::new([i.clone()], Expr::param(&i).member("n").gt(Expr::literal(15))))
            .unwrap();
        assert_eq!(big.count().unwrap(), 2);
        let ns = big
            .select(Lambda::new([i.clone()], Expr::param(&i).member("n")))
            .unwrap()
            .to_vec()
            .unwrap();
        assert_eq!(ns, vec![Value::Integer(20), Value::Integer(30)]);
    }

    #[test]
    fn strict_mode_rejects_host_calls_and_lambda_values() {
        let mut arena = ParamArena::new();
        let i = arena.declare("i", DataType::record("Item"));
        let provider = MemoryProvider::new(catalog());
        let items = provider.source("items").unwrap();

        let host = HostFunction::new("label", |_: &[Value]| Ok(Value::from("x")));
        let with_host = items
            .select(Lambda::new([i.clone()], Expr::host_call(&host, vec![Expr::param(&i)])))
            .unwrap();
        assert!(matches!(with_host.to_vec(), Err(Error::InvalidArgumentError(_))));

        let selector = Lambda::new([i.clone()], Expr::param(&i).member("n"));
        let as_value = items
            .select(Lambda::new(
                [i.clone()],
                Expr::record("Row", [("f", Expr::captured("selector", selector))]),
            ))
            .unwrap();
        assert!(matches!(as_value.to_vec(), Err(Error::InvalidArgumentError(_))));
    }

    #[test]
    fn strict_mode_reports_markers_as_unsupported() {
        let mut arena = ParamArena::new();
        let i = arena.declare("i", DataType::record("Item"));
        let x = arena.declare("x", DataType::Integer);
        let provider = MemoryProvider::new(catalog());
        let double = Lambda::new([x.clone()], Expr::param(&x) * Expr::literal(2));
        let query = provider
            .source("items")
            .unwrap()
            .select(Lambda::new(
                [i.clone()],
                Expr::captured("double", double).project1(Expr::param(&i).member("n")),
            ))
            .unwrap();
        assert!(matches!(query.to_vec(), Err(Error::UnsupportedOperation(_))));
    }

    #[test]
    fn lenient_mode_runs_host_calls() {
        let mut arena = ParamArena::new();
        let i = arena.declare("i", DataType::record("Item"));
        let provider = MemoryProvider::with_config(
            catalog(),
            MemoryProviderConfig {
                strict_translation: false,
            },
        );
        let host = HostFunction::new("half", |args: &[Value]| match args {
            [Value::Integer(n)] => Ok(Value::Integer(n / 2)),
            _ => Err(Error::InvalidArgumentError("half expects an int".into())),
        });
        let rows = provider
            .source("items")
            .unwrap()
            .select(Lambda::new(
                [i.clone()],
                Expr::host_call(&host, vec![Expr::param(&i).member("n")]),
            ))
            .unwrap()
            .to_vec()
            .unwrap();
        assert_eq!(rows, vec![Value::Integer(5), Value::Integer(10), Value::Integer(15)]);
    }
}
