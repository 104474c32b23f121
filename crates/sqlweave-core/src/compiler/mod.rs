//! Rendering of clause trees into SQL text.
//!
//! The compiler never matches on concrete node types. Each node names its
//! kind through [`ClauseElement::visit_name`], and [`SqlCompiler::process`]
//! looks that name up in a [`Renderers`] registry. Dialect crates start from
//! [`Renderers::core`] and register renderers for the node kinds they add,
//! or replace core ones where their syntax differs.
//!
//! ```rust
//! use sqlweave_core::compiler::{Renderers, SqlCompiler};
//! use sqlweave_core::dialect::GenericDialect;
//! use sqlweave_core::element::{literal, table_column};
//! use sqlweave_core::select::Select;
//! use sqlweave_core::types::DataType;
//!
//! let stmt = Select::new([table_column("users", "name", DataType::Text)])
//!     .where_clause(table_column("users", "id", DataType::Integer).eq(literal(7_i64)));
//! let dialect = GenericDialect::new();
//! let compiled = SqlCompiler::new(&dialect, Renderers::core())
//!     .compile(&stmt.into())
//!     .unwrap();
//! assert_eq!(compiled.sql, "SELECT users.name FROM users WHERE users.id = ?");
//! ```
//!
//! [`ClauseElement::visit_name`]: crate::element::ClauseElement::visit_name

mod visitors;

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::dialect::Dialect;
use crate::element::{ClauseElement, FromObject, Node};
use crate::error::{Error, Result};
use crate::schema::{Column, SchemaConstraint, Table};
use crate::value::SqlValue;

/// Renders one clause element.
pub type ElementRenderer = fn(&mut SqlCompiler<'_>, &Node) -> Result<String>;

/// Renders one table constraint as a DDL fragment.
pub type ConstraintRenderer = fn(&mut SqlCompiler<'_>, &dyn SchemaConstraint) -> Result<String>;

/// Compilation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Render bound values inline instead of as placeholders.
    pub literal_binds: bool,
}

/// A rendered statement and its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    /// The SQL text.
    pub sql: String,
    /// The bound values.
    pub params: Vec<SqlValue>,
}

/// Registry mapping node kinds to render functions.
#[derive(Clone, Default)]
pub struct Renderers {
    elements: HashMap<&'static str, ElementRenderer>,
    constraints: HashMap<&'static str, ConstraintRenderer>,
}

impl Renderers {
    /// Returns an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a registry covering every node kind defined in this crate.
    #[must_use]
    pub fn core() -> Self {
        let mut renderers = Self::new();
        renderers.register("column", visitors::visit_column);
        renderers.register("bindparam", visitors::visit_bindparam);
        renderers.register("textclause", visitors::visit_textclause);
        renderers.register("null", visitors::visit_constant);
        renderers.register("true", visitors::visit_constant);
        renderers.register("false", visitors::visit_constant);
        renderers.register("binary", visitors::visit_binary);
        renderers.register("unary", visitors::visit_unary);
        renderers.register("clauselist", visitors::visit_clauselist);
        renderers.register("grouping", visitors::visit_grouping);
        renderers.register("function", visitors::visit_function);
        renderers.register("cast", visitors::visit_cast);
        renderers.register("type_coerce", visitors::visit_type_coerce);
        renderers.register("label", visitors::visit_label);
        renderers.register("select", visitors::visit_select);
        renderers.register("statement_hint", visitors::visit_statement_hint);
        renderers.register_constraint("check_constraint", visitors::visit_check_constraint);
        renderers
    }

    /// Registers `renderer` for `visit_name`, returning the one it replaces.
    pub fn register(
        &mut self,
        visit_name: &'static str,
        renderer: ElementRenderer,
    ) -> Option<ElementRenderer> {
        self.elements.insert(visit_name, renderer)
    }

    /// Registers a DDL renderer for a constraint kind.
    pub fn register_constraint(
        &mut self,
        visit_name: &'static str,
        renderer: ConstraintRenderer,
    ) -> Option<ConstraintRenderer> {
        self.constraints.insert(visit_name, renderer)
    }

    /// Returns the renderer for a node kind.
    #[must_use]
    pub fn element(&self, visit_name: &str) -> Option<ElementRenderer> {
        self.elements.get(visit_name).copied()
    }

    /// Returns the renderer for a constraint kind.
    #[must_use]
    pub fn constraint(&self, visit_name: &str) -> Option<ConstraintRenderer> {
        self.constraints.get(visit_name).copied()
    }
}

impl fmt::Debug for Renderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut elements: Vec<&str> = self.elements.keys().copied().collect();
        elements.sort_unstable();
        let mut constraints: Vec<&str> = self.constraints.keys().copied().collect();
        constraints.sort_unstable();
        f.debug_struct("Renderers")
            .field("elements", &elements)
            .field("constraints", &constraints)
            .finish()
    }
}

/// Walks clause trees and renders them for one dialect.
pub struct SqlCompiler<'d> {
    dialect: &'d dyn Dialect,
    renderers: Renderers,
    options: CompileOptions,
    params: Vec<SqlValue>,
    ddl: bool,
}

impl<'d> SqlCompiler<'d> {
    /// Creates a compiler for `dialect` using `renderers`.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect, renderers: Renderers) -> Self {
        Self {
            dialect,
            renderers,
            options: CompileOptions::default(),
            params: Vec::new(),
            ddl: false,
        }
    }

    /// Sets the compile options.
    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Returns whether the compiler is rendering DDL, where columns are
    /// unqualified and values are inlined.
    #[must_use]
    pub const fn in_ddl(&self) -> bool {
        self.ddl
    }

    /// Renders a complete statement, collecting its bound parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the tree holds a node kind with no
    /// registered renderer.
    pub fn compile(&mut self, node: &Node) -> Result<CompiledSql> {
        self.params.clear();
        let sql = self.process(node)?;
        Ok(CompiledSql {
            sql,
            params: std::mem::take(&mut self.params),
        })
    }

    /// Renders one node by dispatching on its kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if no renderer is registered for the
    /// node's kind.
    pub fn process(&mut self, node: &Node) -> Result<String> {
        let visit_name = node.visit_name();
        let renderer = self
            .renderers
            .element(visit_name)
            .ok_or_else(|| Error::Unsupported(String::from(visit_name)))?;
        trace!(dialect = self.dialect.name(), visit_name, "rendering element");
        renderer(self, node)
    }

    /// Renders each node and joins the results with `separator`.
    ///
    /// # Errors
    ///
    /// Propagates the first rendering error.
    pub fn process_list(&mut self, nodes: &[Node], separator: &str) -> Result<String> {
        let parts = nodes
            .iter()
            .map(|node| self.process(node))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(separator))
    }

    /// Renders a bound value: a placeholder recorded in the parameter list,
    /// or the value itself under literal binds and in DDL.
    pub fn bind(&mut self, value: &SqlValue) -> String {
        if self.options.literal_binds || self.ddl {
            return value.to_sql_inline();
        }
        self.params.push(value.clone());
        self.dialect.placeholder(self.params.len())
    }

    /// Quotes an identifier for the dialect.
    #[must_use]
    pub fn quote(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    /// Renders a relation reference with its schema qualifier.
    #[must_use]
    pub fn from_object(&self, from: &FromObject) -> String {
        match &from.schema {
            Some(schema) => format!("{}.{}", self.quote(schema), self.quote(&from.name)),
            None => self.quote(&from.name),
        }
    }

    /// Renders a table constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if no renderer is registered for the
    /// constraint's kind.
    pub fn constraint(&mut self, constraint: &dyn SchemaConstraint) -> Result<String> {
        let visit_name = constraint.visit_name();
        let renderer = self
            .renderers
            .constraint(visit_name)
            .ok_or_else(|| Error::Unsupported(String::from(visit_name)))?;
        let outer = std::mem::replace(&mut self.ddl, true);
        let rendered = renderer(self, constraint);
        self.ddl = outer;
        rendered
    }

    /// Renders `CREATE TABLE` with column definitions and constraints.
    ///
    /// # Errors
    ///
    /// Propagates constraint rendering errors.
    pub fn create_table(&mut self, table: &Table) -> Result<String> {
        let mut sql = String::from("CREATE TABLE ");
        sql.push_str(&self.from_object(&table.from_object()));
        sql.push_str(" (\n");

        let mut defs: Vec<String> = table
            .columns()
            .iter()
            .map(|c| format!("    {}", self.column_definition(c)))
            .collect();
        for constraint in table.constraints() {
            defs.push(format!("    {}", self.constraint(constraint.as_ref())?));
        }
        sql.push_str(&defs.join(",\n"));

        sql.push_str("\n)");
        Ok(sql)
    }

    /// Renders one column definition.
    #[must_use]
    pub fn column_definition(&self, column: &Column) -> String {
        let mut sql = format!("{} {}", self.quote(&column.name), column.data_type.to_sql());
        if column.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if column.unique {
            sql.push_str(" UNIQUE");
        }
        sql
    }
}

impl fmt::Debug for SqlCompiler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCompiler")
            .field("dialect", &self.dialect.name())
            .field("renderers", &self.renderers)
            .field("options", &self.options)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Downcasts `node` for a renderer registered under its kind.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] when a renderer is registered under a
/// kind name that belongs to a different node type.
pub fn downcast<T: ClauseElement>(node: &Node) -> Result<&T> {
    node.downcast_ref::<T>().ok_or_else(|| {
        Error::Unsupported(format!(
            "renderer for '{}' received an unexpected node type",
            node.visit_name()
        ))
    })
}

/// Downcasts a constraint for a renderer registered under its kind.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] on a type mismatch.
pub fn downcast_constraint<T: SchemaConstraint>(constraint: &dyn SchemaConstraint) -> Result<&T> {
    constraint.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::Unsupported(format!(
            "renderer for '{}' received an unexpected constraint type",
            constraint.visit_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::element::{
        cast, column, literal, literal_column, table_column, text, type_coerce, FunctionCall,
    };
    use crate::schema::CheckConstraint;
    use crate::select::{Select, StatementHint};
    use crate::types::DataType;

    fn compile(node: &Node) -> CompiledSql {
        let dialect = GenericDialect::new();
        SqlCompiler::new(&dialect, Renderers::core())
            .compile(node)
            .unwrap()
    }

    #[test]
    fn test_binds_collect_parameters() {
        let expr = table_column("t", "a", DataType::Integer)
            .eq(literal(1_i64))
            .and(column("b").like(literal("x%")));
        let compiled = compile(&expr);
        assert_eq!(compiled.sql, "t.a = ? AND b LIKE ?");
        assert_eq!(
            compiled.params,
            vec![SqlValue::Int(1), SqlValue::Text(String::from("x%"))]
        );
    }

    #[test]
    fn test_literal_binds() {
        let dialect = GenericDialect::new();
        let compiled = SqlCompiler::new(&dialect, Renderers::core())
            .with_options(CompileOptions {
                literal_binds: true,
            })
            .compile(&column("name").eq(literal("O'Brien")))
            .unwrap();
        assert_eq!(compiled.sql, "name = 'O''Brien'");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn test_grouping_and_modifiers() {
        let expr = column("a").or(column("b")).and(column("c").not());
        assert_eq!(compile(&expr).sql, "(a OR b) AND NOT c");
        assert_eq!(compile(&column("x").desc().nulls_last()).sql, "x DESC NULLS LAST");
    }

    #[test]
    fn test_functions_casts_and_labels() {
        let call = Node::new(FunctionCall::new(
            "lower",
            vec![table_column("users", "name", DataType::Text)],
            DataType::Text,
        ));
        assert_eq!(compile(&call.label("lname")).sql, "lower(users.name) AS lname");
        assert_eq!(
            compile(&cast(column("x"), DataType::Bigint)).sql,
            "CAST(x AS BIGINT)"
        );
        assert_eq!(compile(&type_coerce(column("x"), DataType::Text)).sql, "x");
        assert_eq!(compile(&literal_column("count(*)")).sql, "count(*)");
    }

    #[test]
    fn test_quoting() {
        let expr = table_column("order", "User", DataType::Text);
        assert_eq!(compile(&expr).sql, "\"order\".\"User\"");
    }

    #[test]
    fn test_select_statement() {
        let stmt = Select::new([
            table_column("users", "id", DataType::Integer),
            table_column("users", "name", DataType::Text),
        ])
        .where_clause(table_column("users", "active", DataType::Boolean).eq(literal(true)))
        .order_by([table_column("users", "name", DataType::Text).desc()])
        .unwrap()
        .limit(10)
        .offset(20)
        .distinct();
        let compiled = compile(&stmt.into());
        assert_eq!(
            compiled.sql,
            "SELECT DISTINCT users.id, users.name FROM users WHERE users.active = ? \
             ORDER BY users.name DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(compiled.params, vec![SqlValue::Bool(true)]);
    }

    #[test]
    fn test_legacy_distinct_on_without_dialect_support() {
        let stmt = Select::new([table_column("t", "a", DataType::Integer)])
            .distinct_on([table_column("t", "a", DataType::Integer)])
            .unwrap();
        assert_eq!(compile(&stmt.into()).sql, "SELECT DISTINCT t.a FROM t");
    }

    #[test]
    fn test_statement_hint_renders_after_body() {
        let stmt = Select::new([table_column("jobs", "id", DataType::Integer)])
            .limit(1)
            .ext(StatementHint::new("FOR UPDATE SKIP LOCKED").unwrap())
            .unwrap();
        assert_eq!(
            compile(&stmt.into()).sql,
            "SELECT jobs.id FROM jobs LIMIT 1 FOR UPDATE SKIP LOCKED"
        );
    }

    #[derive(Debug, Clone)]
    struct Unknown;

    impl ClauseElement for Unknown {
        fn visit_name(&self) -> &'static str {
            "unknown_kind"
        }

        fn traverse_internals(&self) -> Vec<(&'static str, crate::element::Traversal<'_>)> {
            Vec::new()
        }

        fn clone_with(&self, _clone: &mut dyn FnMut(&Node) -> Node) -> Node {
            Node::new(self.clone())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let dialect = GenericDialect::new();
        let err = SqlCompiler::new(&dialect, Renderers::core())
            .compile(&column("a").eq(Node::new(Unknown)))
            .unwrap_err();
        assert_eq!(err, Error::Unsupported(String::from("unknown_kind")));
    }

    #[test]
    fn test_register_replaces_renderer() {
        fn shout(_compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
            let clause = downcast::<crate::element::TextClause>(node)?;
            Ok(clause.text.to_uppercase())
        }
        let mut renderers = Renderers::core();
        assert!(renderers.register("textclause", shout).is_some());
        let dialect = GenericDialect::new();
        let sql = SqlCompiler::new(&dialect, renderers)
            .process(&text("now()"))
            .unwrap();
        assert_eq!(sql, "NOW()");
    }

    #[test]
    fn test_create_table_with_check() {
        let mut table = Table::new("rooms")
            .column(Column::new("id", DataType::Integer).primary_key())
            .column(Column::new("floor", DataType::Integer).not_null());
        let check = CheckConstraint::new(table.c("floor").unwrap().gt(literal(0_i64)))
            .named("floor_positive");
        table.append_constraint(check).unwrap();

        let dialect = GenericDialect::new();
        let sql = SqlCompiler::new(&dialect, Renderers::core())
            .create_table(&table)
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE rooms (\n    id INTEGER PRIMARY KEY,\n    floor INTEGER NOT NULL,\n    \
             CONSTRAINT floor_positive CHECK (floor > 0)\n)"
        );
    }
}
