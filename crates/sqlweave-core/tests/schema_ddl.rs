//! Tests for table copies and constraint DDL.

mod common;
use common::*;

use sqlweave_core::compiler::{Renderers, SqlCompiler};
use sqlweave_core::dialect::GenericDialect;
use sqlweave_core::element::literal;
use sqlweave_core::schema::{CheckConstraint, SchemaConstraint};
use sqlweave_core::Error;

fn create_table(table: &sqlweave_core::Table) -> String {
    let dialect = GenericDialect::new();
    SqlCompiler::new(&dialect, Renderers::core())
        .create_table(table)
        .unwrap()
}

#[test]
fn copy_renders_same_ddl_under_new_name() {
    let mut table = rooms();
    let check = CheckConstraint::new(table.c("floor").unwrap().gt(literal(0_i64)))
        .named("floor_positive");
    table.append_constraint(check).unwrap();

    let copy = table.to_metadata("rooms_v2").unwrap();
    assert_eq!(
        create_table(&copy),
        "CREATE TABLE rooms_v2 (\n    \
         id INTEGER PRIMARY KEY,\n    \
         floor INTEGER NOT NULL,\n    \
         label VARCHAR(40),\n    \
         CONSTRAINT floor_positive CHECK (floor > 0)\n\
         )"
    );
    assert_eq!(
        copy.constraints()[0].parent().map(|p| p.name.as_str()),
        Some("rooms_v2")
    );
}

#[test]
fn text_check_survives_copy() {
    let mut table = rooms();
    table
        .append_constraint(CheckConstraint::from_sql("floor < 100").unwrap())
        .unwrap();
    let copy = table.to_metadata("rooms_v2").unwrap();
    assert!(create_table(&copy).contains("    CHECK (floor < 100)\n"));
}

#[test]
fn copy_fails_when_target_lacks_column() {
    let source = rooms();
    let mut check = CheckConstraint::new(source.c("label").unwrap().eq(literal("x")));
    check.set_parent(&source).unwrap();

    let target = sqlweave_core::Table::new("bare");
    let err = check.copy_to(&target).unwrap_err();
    assert_eq!(
        err,
        Error::ColumnNotFound {
            table: String::from("bare"),
            column: String::from("label"),
        }
    );
}
