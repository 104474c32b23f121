#![allow(dead_code)]

use sqlweave_core::compiler::{CompileOptions, CompiledSql};
use sqlweave_core::element::Node;
use sqlweave_core::schema::{Column, Table};
use sqlweave_core::types::DataType;
use sqlweave_postgres::PostgresDialect;

pub fn compile(node: &Node) -> CompiledSql {
    PostgresDialect::new()
        .compiler()
        .compile(node)
        .unwrap_or_else(|e| panic!("Failed to compile: {node:?}\nError: {e:?}"))
}

pub fn compile_inline(node: &Node) -> String {
    PostgresDialect::new()
        .compiler()
        .with_options(CompileOptions {
            literal_binds: true,
        })
        .compile(node)
        .unwrap_or_else(|e| panic!("Failed to compile: {node:?}\nError: {e:?}"))
        .sql
}

pub fn create_table(table: &Table) -> String {
    PostgresDialect::new()
        .compiler()
        .create_table(table)
        .unwrap_or_else(|e| panic!("Failed to render DDL for {}\nError: {e:?}", table.name()))
}

pub fn booking() -> Table {
    Table::new("booking")
        .column(Column::new("id", DataType::Integer).primary_key())
        .column(Column::new("room", DataType::Integer).not_null())
        .column(Column::new("during", DataType::custom("TSRANGE")))
        .column(Column::new("status", DataType::Text))
}

pub fn documents() -> Table {
    Table::new("documents")
        .column(Column::new("id", DataType::Integer).primary_key())
        .column(Column::new("lang", DataType::Text))
        .column(Column::new("body", DataType::Text))
}
