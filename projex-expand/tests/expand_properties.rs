use projex_expand::{expand, ProjectionExpander};
use projex_expr::{
    fold_postorder, sentinel, DataType, Expr, HostFunction, Lambda, Param, ParamArena, Value,
};
use projex_result::Error;
use projex_test_utils::init_tracing_for_tests;

fn marker_count(expr: &Expr) -> usize {
    fold_postorder(expr, |node, children: Vec<usize>| {
        Ok(children.iter().sum::<usize>() + usize::from(sentinel::is_marker(node)))
    })
    .unwrap()
}

/// `proj => proj.subprojects.where(sp => sp.area < 1000).average(sp => sp.area)`
fn average_effective_area(arena: &mut ParamArena) -> Lambda {
    let proj = arena.declare("proj", DataType::record("Project"));
    let sp = arena.declare("sp", DataType::record("Subproject"));
    let sp2 = arena.declare("sp", DataType::record("Subproject"));
    Lambda::new(
        [proj.clone()],
        Expr::param(&proj)
            .member("subprojects")
            .filter(Lambda::new(
                [sp.clone()],
                Expr::param(&sp).member("area").lt(Expr::literal(1000)),
            ))
            .average(Lambda::new([sp2.clone()], Expr::param(&sp2).member("area"))),
    )
}

struct Selectors {
    field: Lambda,
}

impl Selectors {
    fn selector(&self) -> Lambda {
        self.field.clone()
    }
}

#[test]
fn every_reference_shape_expands_to_the_same_tree() {
    init_tracing_for_tests();
    let mut arena = ParamArena::new();
    let selector = average_effective_area(&mut arena);
    let p = arena.declare("p", DataType::record("Project"));

    let instance = Selectors {
        field: selector.clone(),
    };
    let held = selector.clone();
    let static_method = HostFunction::new("selector_static", move |_: &[Value]| {
        Ok(Value::Lambda(held.clone()))
    });
    let instance_method = HostFunction::new("selector", move |_: &[Value]| {
        Ok(Value::Lambda(instance.selector()))
    });

    let references = [
        Expr::captured("local_selector", selector.clone()),
        Expr::captured("SELECTOR_STATIC", selector.clone()),
        Expr::captured("self.selector", selector.clone()),
        Expr::host_call(&static_method, vec![]),
        Expr::host_call(&instance_method, vec![Expr::captured("self", Value::Null)]),
        Expr::lambda(selector.clone()),
    ];

    let build = |reference: Expr| {
        Expr::source("projects").select(Lambda::new(
            [p.clone()],
            Expr::record(
                "Row",
                [
                    ("project", Expr::param(&p)),
                    ("aea", reference.project1(Expr::param(&p))),
                ],
            ),
        ))
    };

    let outputs: Vec<Expr> = references
        .into_iter()
        .map(|reference| expand(&build(reference)).unwrap())
        .collect();
    for out in &outputs {
        assert_eq!(marker_count(out), 0);
        assert_eq!(out, &outputs[0]);
    }
}

#[test]
fn composed_projections_resolve_every_level() {
    init_tracing_for_tests();
    let mut arena = ParamArena::new();
    let s = arena.declare("s", DataType::String);
    let suffix = Lambda::new([s.clone()], Expr::param(&s) + Expr::literal("-somepostfix"));

    let u = arena.declare("u", DataType::record("User"));
    let user_label = Lambda::new(
        [u.clone()],
        Expr::captured("suffix", suffix).project1(Expr::param(&u).member("name")),
    );

    let p = arena.declare("p", DataType::record("Project"));
    let expr = Expr::source("projects").select(Lambda::new(
        [p.clone()],
        Expr::captured("user_label", user_label).project1(Expr::param(&p).member("created_by")),
    ));

    let out = expand(&expr).unwrap();
    assert_eq!(marker_count(&out), 0);
    let expected = Expr::source("projects").select(Lambda::new(
        [p.clone()],
        Expr::param(&p).member("created_by").member("name") + Expr::literal("-somepostfix"),
    ));
    assert_eq!(out, expected);
}

#[test]
fn markers_inside_actual_arguments_are_expanded() {
    init_tracing_for_tests();
    let mut arena = ParamArena::new();
    let x = arena.declare("x", DataType::Integer);
    let double = Lambda::new([x.clone()], Expr::param(&x) * Expr::literal(2));
    let reference = Expr::captured("double", double);

    let expr = reference
        .clone()
        .project1(reference.project1(Expr::literal(3)));
    let out = expand(&expr).unwrap();
    assert_eq!(
        out,
        (Expr::literal(3) * Expr::literal(2)) * Expr::literal(2)
    );
}

#[test]
fn shadowing_parameter_name_is_not_rebound() {
    init_tracing_for_tests();
    let mut arena = ParamArena::new();
    let outer = arena.declare("p", DataType::record("Project"));
    let inner = arena.declare("p", DataType::record("Subproject"));
    let projection = Lambda::new(
        [outer.clone()],
        Expr::param(&outer)
            .member("subprojects")
            .select(Lambda::new([inner.clone()], Expr::param(&inner).member("area"))),
    );

    let row = arena.declare("row", DataType::record("Project"));
    let expr = Expr::captured("projection", projection).project1(Expr::param(&row));
    let out = expand(&expr).unwrap();

    let expected = Expr::param(&row)
        .member("subprojects")
        .select(Lambda::new([inner.clone()], Expr::param(&inner).member("area")));
    assert_eq!(out, expected);
}

#[test]
fn projections_from_separate_arenas_compose() {
    init_tracing_for_tests();
    // `g(y) = y.subs.sum(s => s.area)`, declared on its own.
    let mut library = ParamArena::new();
    let y = library.declare("y", DataType::record("Project"));
    let s = library.declare("s", DataType::record("Subproject"));
    let area = Lambda::new([s.clone()], Expr::param(&s).member("area"));
    let g = Lambda::new([y.clone()], Expr::param(&y).member("subs").sum(area.clone()));

    // `f(a, b) = g(a) + b`, declared through a second arena.
    let mut caller = ParamArena::new();
    let a = caller.declare("a", DataType::record("Project"));
    let b = caller.declare("b", DataType::Integer);
    let f = Lambda::new(
        [a.clone(), b.clone()],
        Expr::captured("g", g).project1(Expr::param(&a)) + Expr::param(&b),
    );

    let row = caller.declare("row", DataType::record("Project"));
    let expr = Expr::captured("f", f).project2(Expr::param(&row), Expr::literal(7));
    let out = expand(&expr).unwrap();

    let expected = Expr::param(&row).member("subs").sum(area) + Expr::literal(7);
    assert_eq!(out, expected);
}

fn declare_all(arena: &mut ParamArena, names: &[&str]) -> Vec<Param> {
    names
        .iter()
        .map(|name| arena.declare(*name, DataType::Any))
        .collect()
}

#[test]
fn actuals_land_in_matching_positions_for_arities_one_to_five() {
    init_tracing_for_tests();
    let mut arena = ParamArena::new();
    let row = arena.declare("project", DataType::record("Project"));
    let actuals = vec![
        Expr::param(&row).member("created_by"),
        Expr::param(&row).member("modified_by").member("name"),
        Expr::literal(3) + Expr::literal(5),
        Expr::literal("test"),
        Expr::literal(10) * Expr::literal(3),
    ];

    for arity in 1..=5 {
        let params = declare_all(&mut arena, &["a", "b", "c", "d", "e"][..arity]);
        // Body lists the parameters in order, tagged by position.
        let body = Expr::record(
            "Args",
            params
                .iter()
                .zip(["0", "1", "2", "3", "4"])
                .map(|(param, slot)| (slot, Expr::param(param))),
        );
        let lambda = Lambda::new(params.clone(), body);
        let reference = Expr::captured("f", lambda);
        let call = match arity {
            1 => reference.project1(actuals[0].clone()),
            2 => reference.project2(actuals[0].clone(), actuals[1].clone()),
            3 => reference.project3(actuals[0].clone(), actuals[1].clone(), actuals[2].clone()),
            4 => reference.project4(
                actuals[0].clone(),
                actuals[1].clone(),
                actuals[2].clone(),
                actuals[3].clone(),
            ),
            _ => reference.project5(
                actuals[0].clone(),
                actuals[1].clone(),
                actuals[2].clone(),
                actuals[3].clone(),
                actuals[4].clone(),
            ),
        };

        let expected = Expr::record(
            "Args",
            actuals[..arity]
                .iter()
                .zip(["0", "1", "2", "3", "4"])
                .map(|(actual, slot)| (slot, actual.clone())),
        );
        assert_eq!(expand(&call).unwrap(), expected, "arity {arity}");
    }
}

#[test]
fn unchanged_subtrees_are_shared_with_the_input() {
    init_tracing_for_tests();
    let mut arena = ParamArena::new();
    let x = arena.declare("x", DataType::Integer);
    let untouched = Expr::source("users").count();
    let expr = untouched.clone()
        + Expr::captured("inc", Lambda::new([x.clone()], Expr::param(&x) + Expr::literal(1)))
            .project1(Expr::literal(1));

    let out = ProjectionExpander::new().expand(&expr).unwrap();
    match out.kind() {
        projex_expr::ExprKind::Binary { left, .. } => assert!(Expr::ptr_eq(left, &untouched)),
        other => panic!("unexpected node {other:?}"),
    }
}

#[test]
fn unresolvable_reference_surfaces_evaluation_error() {
    init_tracing_for_tests();
    let expr = Expr::captured("not_a_lambda", "text").project1(Expr::literal(1));
    assert!(matches!(expand(&expr), Err(Error::EvaluationError(_))));
}
