//! Coercion of caller-supplied values into clause elements.
//!
//! Construction APIs accept heterogeneous input: existing nodes, plain Rust
//! values, or names given as strings. Each call site states the [`Role`] the
//! result must play, and [`coerce`] either produces a node that can play it
//! or fails with [`Error::Coercion`].
//!
//! A string is interpreted by role: a bound literal for
//! [`Role::ExpressionElement`], verbatim column text for [`Role::ByOf`], a
//! SQL fragment for [`Role::StatementOption`], and a column name to be
//! resolved later for [`Role::DdlConstraintColumn`].

use core::fmt;

use crate::element::{
    column, false_, literal_column, null, text, true_, BindParameter, ColumnClause, Node,
    TextClause,
};
use crate::error::{Error, Result};
use crate::schema::ConstraintExpr;
use crate::types::DataType;
use crate::value::SqlValue;

/// The contract a coerced value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Any expression producing a column value.
    ExpressionElement,
    /// A term of ORDER BY, GROUP BY, DISTINCT ON and similar lists.
    ByOf,
    /// A free-standing predicate or option such as a constraint's WHERE.
    StatementOption,
    /// A column, expression or column name inside a DDL constraint.
    DdlConstraintColumn,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExpressionElement => "expression role",
            Self::ByOf => "ORDER BY/OF role",
            Self::StatementOption => "statement option role",
            Self::DdlConstraintColumn => "DDL constraint column role",
        })
    }
}

/// A value accepted by construction APIs before coercion.
#[derive(Debug, Clone)]
pub enum Argument {
    /// An existing clause element.
    Element(Node),
    /// A plain value; strings are interpreted by role.
    Value(SqlValue),
}

impl Argument {
    /// Returns the element if this argument already is one.
    #[must_use]
    pub const fn as_element(&self) -> Option<&Node> {
        match self {
            Self::Element(node) => Some(node),
            Self::Value(_) => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Element(node) => format!("'{}' element", node.visit_name()),
            Self::Value(value) => String::from(value.kind()),
        }
    }
}

impl From<Node> for Argument {
    fn from(node: Node) -> Self {
        Self::Element(node)
    }
}

macro_rules! impl_argument_from_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Argument {
                fn from(value: $ty) -> Self {
                    Self::Value(crate::value::ToSqlValue::to_sql_value(value))
                }
            }
        )+
    };
}

impl_argument_from_value!(SqlValue, &str, String, bool, i32, i64, u32, f64);

/// Options applied while coercing a single value.
#[derive(Debug, Clone, Default)]
pub struct CoerceOptions {
    /// Type given to a literal value instead of the one it would infer.
    pub type_override: Option<DataType>,
    /// Name given to a bound parameter created from a literal value.
    pub name: Option<String>,
}

impl CoerceOptions {
    /// Options that type literals as `data_type`.
    #[must_use]
    pub fn typed(data_type: DataType) -> Self {
        Self {
            type_override: Some(data_type),
            name: None,
        }
    }

    /// Sets the bound parameter name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Coerces `value` into a node that satisfies `role`.
///
/// # Errors
///
/// Returns [`Error::Coercion`] when the value cannot play the role.
pub fn coerce(role: Role, value: impl Into<Argument>) -> Result<Node> {
    coerce_with(role, value, &CoerceOptions::default())
}

/// Coerces `value` into a node that satisfies `role`, applying `options`.
///
/// The type override only affects literal values: an existing element keeps
/// its own type.
///
/// # Errors
///
/// Returns [`Error::Coercion`] when the value cannot play the role.
pub fn coerce_with(
    role: Role,
    value: impl Into<Argument>,
    options: &CoerceOptions,
) -> Result<Node> {
    let value = value.into();
    let found = value.describe();
    match value {
        Argument::Element(node) => accept_element(role, node, found),
        Argument::Value(value) => coerce_literal(role, value, options, found),
    }
}

fn accept_element(role: Role, node: Node, found: String) -> Result<Node> {
    let accepted = match role {
        Role::ExpressionElement | Role::ByOf => node.is_column_element(),
        Role::StatementOption | Role::DdlConstraintColumn => {
            node.is_column_element() || node.is::<TextClause>()
        }
    };
    if accepted {
        Ok(node)
    } else {
        Err(Error::Coercion {
            role,
            found,
            message: String::from("expected a column expression"),
        })
    }
}

fn coerce_literal(
    role: Role,
    value: SqlValue,
    options: &CoerceOptions,
    found: String,
) -> Result<Node> {
    match (role, value) {
        (Role::ExpressionElement, value) => Ok(Node::new(BindParameter::new(
            options.name.clone(),
            value,
            options.type_override.clone(),
        ))),
        (Role::ByOf, SqlValue::Text(s)) => Ok(literal_column(&s)),
        (Role::ByOf, SqlValue::Null) => Ok(null()),
        (Role::ByOf, SqlValue::Bool(b)) => Ok(if b { true_() } else { false_() }),
        (Role::StatementOption, SqlValue::Text(s)) => Ok(text(&s)),
        (Role::DdlConstraintColumn, SqlValue::Text(s)) => Ok(column(&s)),
        (role, _) => Err(Error::Coercion {
            role,
            found,
            message: String::from("literal values are not accepted here"),
        }),
    }
}

/// One coerced member of a constraint's column/expression list.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintColumn {
    /// The expression to render; pending when given as a column name.
    pub expression: ConstraintExpr,
    /// The first table column found in the expression, if any.
    pub column: Option<Node>,
    /// The name as the caller gave it, when given as a string.
    pub name: Option<String>,
    /// What to add to the constraint's column collection, if anything.
    pub add_element: Option<ConstraintExpr>,
}

/// Coerces each value for use in a constraint's column collection.
///
/// Strings become pending column names resolved when the constraint is
/// attached to a table. Expressions are searched (pre-order) for the first
/// table column they reference; raw text references none.
///
/// # Errors
///
/// Returns [`Error::Coercion`] on the first value that cannot play `role`.
pub fn expect_col_expression_collection<I, A>(
    role: Role,
    values: I,
) -> Result<Vec<ConstraintColumn>>
where
    I: IntoIterator<Item = A>,
    A: Into<Argument>,
{
    values
        .into_iter()
        .map(|value| match value.into() {
            Argument::Value(SqlValue::Text(name)) if role == Role::DdlConstraintColumn => {
                Ok(ConstraintColumn {
                    expression: ConstraintExpr::Pending(name.clone()),
                    column: None,
                    name: Some(name.clone()),
                    add_element: Some(ConstraintExpr::Pending(name)),
                })
            }
            other => {
                let resolved = coerce(role, other)?;
                let column = resolved
                    .iterate()
                    .into_iter()
                    .find(|n| n.downcast_ref::<ColumnClause>().is_some_and(|c| !c.is_literal))
                    .cloned();
                let add_element = column.clone().map(ConstraintExpr::Resolved);
                Ok(ConstraintColumn {
                    expression: ConstraintExpr::Resolved(resolved),
                    column,
                    name: None,
                    add_element,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{literal, table_column, FunctionCall};

    #[test]
    fn test_expression_role_binds_literals() {
        let node = coerce(Role::ExpressionElement, "english").unwrap();
        let bind = node.downcast_ref::<BindParameter>().unwrap();
        assert_eq!(bind.value, SqlValue::Text(String::from("english")));
        assert_eq!(bind.data_type, DataType::Varchar(None));
    }

    #[test]
    fn test_type_override_applies_to_literals_only() {
        let options = CoerceOptions::typed(DataType::custom("REGCONFIG")).named("to_tsvector");
        let node = coerce_with(Role::ExpressionElement, "english", &options).unwrap();
        assert_eq!(node.data_type(), DataType::custom("REGCONFIG"));
        assert_eq!(
            node.downcast_ref::<BindParameter>().unwrap().key.as_deref(),
            Some("to_tsvector")
        );

        let col = table_column("docs", "lang", DataType::Text);
        let node = coerce_with(Role::ExpressionElement, col, &options).unwrap();
        assert_eq!(node.data_type(), DataType::Text);
    }

    #[test]
    fn test_expression_role_rejects_text() {
        let err = coerce(Role::ExpressionElement, text("x > 1")).unwrap_err();
        assert!(matches!(err, Error::Coercion { role: Role::ExpressionElement, .. }));
    }

    #[test]
    fn test_by_of_role() {
        assert!(coerce(Role::ByOf, "x").unwrap().is::<ColumnClause>());
        assert_eq!(coerce(Role::ByOf, SqlValue::Null).unwrap().visit_name(), "null");
        assert!(coerce(Role::ByOf, 5_i64).is_err());
    }

    #[test]
    fn test_statement_option_role() {
        assert!(coerce(Role::StatementOption, "a > 1").unwrap().is::<TextClause>());
        assert!(coerce(Role::StatementOption, text("a > 1")).is_ok());
        assert!(coerce(Role::StatementOption, 1_i64).is_err());
    }

    #[test]
    fn test_col_expression_collection() {
        let func = Node::new(FunctionCall::new(
            "int8range",
            vec![
                table_column("t", "lo", DataType::Bigint),
                table_column("t", "hi", DataType::Bigint),
            ],
            DataType::custom("INT8RANGE"),
        ));
        let cols = expect_col_expression_collection(
            Role::DdlConstraintColumn,
            vec![
                Argument::from("room"),
                Argument::from(func),
                Argument::from(text("lower(name)")),
            ],
        )
        .unwrap();

        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].expression, ConstraintExpr::Pending(String::from("room")));
        assert_eq!(cols[0].name.as_deref(), Some("room"));

        let first = cols[1].column.as_ref().unwrap();
        assert_eq!(first.downcast_ref::<ColumnClause>().unwrap().name, "lo");
        assert!(cols[1].name.is_none());

        assert!(cols[2].column.is_none());
        assert!(cols[2].add_element.is_none());
    }

    #[test]
    fn test_col_expression_collection_rejects_numbers() {
        let err = expect_col_expression_collection(Role::DdlConstraintColumn, vec![1_i64])
            .unwrap_err();
        assert!(matches!(err, Error::Coercion { .. }));

        // an already-bound literal is an expression and passes through
        let ok = expect_col_expression_collection(Role::DdlConstraintColumn, vec![literal(1_i64)])
            .unwrap();
        assert!(ok[0].column.is_none());
    }
}
