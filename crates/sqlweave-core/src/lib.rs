//! # sqlweave-core
//!
//! An extensible SQL expression tree with a pluggable compiler.
//!
//! This crate provides:
//! - A clause-element framework: every node declares its kind and its
//!   traversal descriptors, from which cloning, structural comparison, cache
//!   keys and tree walks are derived
//! - A coercion protocol turning plain values, strings and nodes into
//!   elements that satisfy a [`Role`]
//! - A minimal schema model with constraints that resolve column names when
//!   attached to a table
//! - A SELECT statement that dialect crates extend through syntax extension
//!   points
//! - A compiler dispatching on node kinds through a renderer registry
//!
//! ## Building and rendering
//!
//! ```rust
//! use sqlweave_core::{coerce, Role, Select, SqlCompiler, Renderers};
//! use sqlweave_core::dialect::GenericDialect;
//! use sqlweave_core::element::literal;
//! use sqlweave_core::schema::{Column, Table};
//! use sqlweave_core::types::DataType;
//!
//! let users = Table::new("users")
//!     .column(Column::new("id", DataType::Integer).primary_key())
//!     .column(Column::new("name", DataType::Text));
//!
//! let stmt = Select::new([users.require("name").unwrap()])
//!     .where_clause(users.require("id").unwrap().eq(literal(42_i64)))
//!     .order_by([coerce(Role::ByOf, "name").unwrap()])
//!     .unwrap();
//!
//! let dialect = GenericDialect::new();
//! let compiled = SqlCompiler::new(&dialect, Renderers::core())
//!     .compile(&stmt.into())
//!     .unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT users.name FROM users WHERE users.id = ? ORDER BY name"
//! );
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Literal values always become bound parameters; they are only inlined when
//! the compiler is explicitly asked for literal binds, and then escaped.
//! Raw SQL enters a tree only through [`element::text`] and
//! [`element::literal_column`].

pub mod coercion;
pub mod compiler;
pub mod dialect;
pub mod element;
pub mod error;
pub mod functions;
pub mod schema;
pub mod select;
pub mod types;
pub mod value;

pub use coercion::{coerce, coerce_with, Argument, CoerceOptions, Role};
pub use compiler::{CompileOptions, CompiledSql, Renderers, SqlCompiler};
pub use element::{ClauseElement, Node};
pub use error::{Error, Result};
pub use schema::{Column, SchemaConstraint, Table};
pub use select::{ExtensionPoint, Select, SyntaxExtension};
pub use types::DataType;
pub use value::{SqlValue, ToSqlValue};
