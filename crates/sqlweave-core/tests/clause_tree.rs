//! Tests for the generic clause tree operations: structural equality,
//! cache keys, traversal and substitution.

mod common;
use common::*;

use sqlweave_core::coercion::Argument;
use sqlweave_core::element::{
    cast, column, literal, literal_column, table_column, ColumnClause, FunctionCall, Node,
    Operator,
};
use sqlweave_core::functions::{count, func};
use sqlweave_core::select::Select;
use sqlweave_core::types::DataType;

fn floor() -> Node {
    table_column("rooms", "floor", DataType::Integer)
}

#[test]
fn cache_key_ignores_bound_values() {
    let a = floor().gt(literal(1_i64));
    let b = floor().gt(literal(9_i64));
    assert_eq!(a.cache_key(), b.cache_key());
    assert!(!a.compare(&b));
    assert_ne!(a, b);
}

#[test]
fn cache_key_separates_structure() {
    let gt = floor().gt(literal(1_i64));
    let lt = floor().lt(literal(1_i64));
    let other_table = table_column("halls", "floor", DataType::Integer).gt(literal(1_i64));
    assert_ne!(gt.cache_key(), lt.cache_key());
    assert_ne!(gt.cache_key(), other_table.cache_key());
}

#[test]
fn cache_key_separates_array_flavours() {
    let generic = cast(column("x"), DataType::array(DataType::Integer));
    let tagged = cast(
        column("x"),
        DataType::Array {
            item: Box::new(DataType::Integer),
            dialect: Some("postgresql"),
        },
    );
    assert!(!generic.compare(&tagged));
    assert_ne!(generic.cache_key(), tagged.cache_key());
}

#[test]
fn cache_key_is_not_forged_by_quoted_text() {
    let two = func(
        "f",
        [literal_column("a"), literal_column("b")],
        DataType::Null,
    )
    .unwrap();
    let quoted = "a' table=- schema=- type=Null is_literal=1),(column name=1'b";
    let forged = func("f", [literal_column(quoted)], DataType::Null).unwrap();
    assert!(!two.compare(&forged));
    assert_ne!(two.cache_key(), forged.cache_key());
}

#[test]
fn iterate_is_pre_order() {
    let expr = column("a").eq(column("b")).and(column("c"));
    let names: Vec<&str> = expr
        .iterate()
        .into_iter()
        .filter_map(|n| n.downcast_ref::<ColumnClause>())
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(expr.iterate()[0].visit_name(), "binary");
}

#[test]
fn replace_leaves_source_untouched() {
    let expr = floor().gt(literal(1_i64)).or(floor().lt(literal(-1_i64)));
    let swapped = expr.replace(&mut |n: &Node| {
        n.downcast_ref::<ColumnClause>()
            .map(|_| table_column("halls", "floor", DataType::Integer))
    });
    assert_eq!(compile(&expr).sql, "rooms.floor > ? OR rooms.floor < ?");
    assert_eq!(compile(&swapped).sql, "halls.floor > ? OR halls.floor < ?");
}

#[test]
fn grouping_follows_precedence() {
    let sum = column("a").op(Operator::Add, column("b"));
    let product = sum.op(Operator::Mul, column("c"));
    assert_eq!(compile(&product).sql, "(a + b) * c");
    assert_eq!(product.get_children()[0].visit_name(), "grouping");
}

#[test]
fn functions_take_coerced_arguments() {
    let call = func(
        "coalesce",
        [Argument::from(floor()), Argument::from(0_i64)],
        DataType::Integer,
    )
    .unwrap();
    let args = &call.downcast_ref::<FunctionCall>().unwrap().arguments;
    assert_eq!(args[1].visit_name(), "bindparam");
    assert_eq!(compile_inline(&call), "coalesce(rooms.floor, 0)");
    assert_eq!(count(floor()).unwrap().data_type(), DataType::Bigint);
}

#[test]
fn select_builders_coerce_strings() {
    let stmt = Select::new([floor(), count(column("id")).unwrap().label("n")])
        .group_by(["floor"])
        .unwrap()
        .order_by([column("n").desc()])
        .unwrap()
        .offset(20);
    assert_eq!(
        compile(&stmt.into()).sql,
        "SELECT rooms.floor, count(id) AS n FROM rooms GROUP BY floor ORDER BY n DESC OFFSET 20"
    );
}

#[test]
fn schema_columns_render_in_queries() {
    let table = rooms();
    let stmt = Select::new([table.c("label").unwrap()])
        .where_clause(table.c("floor").unwrap().eq(literal(3_i64)));
    let compiled = compile(&stmt.into());
    assert_eq!(
        compiled.sql,
        "SELECT rooms.label FROM rooms WHERE rooms.floor = ?"
    );
    assert_eq!(compiled.params.len(), 1);
}
