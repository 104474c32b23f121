#![allow(dead_code)]

use sqlweave_core::compiler::{CompileOptions, CompiledSql, Renderers, SqlCompiler};
use sqlweave_core::dialect::GenericDialect;
use sqlweave_core::element::Node;
use sqlweave_core::schema::{Column, Table};
use sqlweave_core::types::DataType;

pub fn compile(node: &Node) -> CompiledSql {
    let dialect = GenericDialect::new();
    SqlCompiler::new(&dialect, Renderers::core())
        .compile(node)
        .unwrap_or_else(|e| panic!("Failed to compile: {node:?}\nError: {e:?}"))
}

pub fn compile_inline(node: &Node) -> String {
    let dialect = GenericDialect::new();
    SqlCompiler::new(&dialect, Renderers::core())
        .with_options(CompileOptions {
            literal_binds: true,
        })
        .compile(node)
        .unwrap_or_else(|e| panic!("Failed to compile: {node:?}\nError: {e:?}"))
        .sql
}

pub fn rooms() -> Table {
    Table::new("rooms")
        .column(Column::new("id", DataType::Integer).primary_key())
        .column(Column::new("floor", DataType::Integer).not_null())
        .column(Column::new("label", DataType::Varchar(Some(40))))
}
