#![allow(dead_code)]

use std::sync::Arc;

use projex::prelude::*;

pub const PROJECTS: &str = "projects";
pub const SUBPROJECTS: &str = "subprojects";
pub const USERS: &str = "users";

/// Catalog of the scenario data plus the arena every test lambda is
/// declared through.
pub struct Fixture {
    pub provider: Arc<MemoryProvider>,
    pub arena: ParamArena,
}

impl Fixture {
    pub fn projects(&self) -> Queryable {
        self.provider.source(PROJECTS).unwrap()
    }

    pub fn subprojects(&self) -> Queryable {
        self.provider.source(SUBPROJECTS).unwrap()
    }

    pub fn users(&self) -> Queryable {
        self.provider.source(USERS).unwrap()
    }
}

fn user(name: &str) -> Value {
    Value::from(Record::new("User").with_field("name", name))
}

fn subproject(area: i64) -> Value {
    Value::from(Record::new("Subproject").with_field("area", area))
}

fn project(id: i64, created_by: &Value, modified_by: &Value, areas: &[i64]) -> Value {
    Value::from(
        Record::new("Project")
            .with_field("id", id)
            .with_field("created_by", created_by.clone())
            .with_field("modified_by", modified_by.clone())
            .with_field(
                "subprojects",
                Value::list(areas.iter().copied().map(subproject)),
            ),
    )
}

/// user1..user4; project 1 (user1/user3, areas 100 and 200); project 2
/// (user2/user4, areas 350, 450 and 10000). Subproject rows carry their
/// parent project.
pub fn fixture() -> Fixture {
    projex_test_utils::init_tracing_for_tests();

    let users: Vec<Value> = ["user1", "user2", "user3", "user4"].map(user).into();
    let p1 = project(1, &users[0], &users[2], &[100, 200]);
    let p2 = project(2, &users[1], &users[3], &[350, 450, 10_000]);

    let subprojects = [(100, &p1), (200, &p1), (350, &p2), (450, &p2), (10_000, &p2)]
        .map(|(area, parent)| {
            Value::from(
                Record::new("Subproject")
                    .with_field("area", area as i64)
                    .with_field("project", parent.clone()),
            )
        });

    let catalog = MemoryCatalog::new()
        .with_source(USERS, users.clone())
        .with_source(PROJECTS, [p1.clone(), p2.clone()])
        .with_source(SUBPROJECTS, subprojects);

    Fixture {
        provider: MemoryProvider::new(catalog),
        arena: ParamArena::new(),
    }
}

/// `proj => proj.subprojects.where(sp => sp.area < 1000).average(sp => sp.area)`
pub fn average_effective_area(arena: &mut ParamArena) -> Lambda {
    let proj = arena.declare("proj", DataType::record("Project"));
    let sp = arena.declare("sp", DataType::record("Subproject"));
    let sp_area = arena.declare("sp", DataType::record("Subproject"));
    Lambda::new(
        [proj.clone()],
        Expr::param(&proj)
            .member("subprojects")
            .filter(Lambda::new(
                [sp.clone()],
                Expr::param(&sp).member("area").lt(Expr::literal(1000)),
            ))
            .average(Lambda::new(
                [sp_area.clone()],
                Expr::param(&sp_area).member("area"),
            )),
    )
}

/// `proj => proj.subprojects.average(sp => sp.area)`
pub fn average_area(arena: &mut ParamArena) -> Lambda {
    let proj = arena.declare("proj", DataType::record("Project"));
    let sp = arena.declare("sp", DataType::record("Subproject"));
    Lambda::new(
        [proj.clone()],
        Expr::param(&proj)
            .member("subprojects")
            .average(Lambda::new([sp.clone()], Expr::param(&sp).member("area"))),
    )
}

/// Field from a row record.
pub fn field(row: &Value, name: &str) -> Value {
    row.as_record()
        .and_then(|record| record.get(name))
        .cloned()
        .unwrap_or_else(|| panic!("row {row} has no field {name}"))
}
