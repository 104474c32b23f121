//! The `EXCLUDE` table constraint.
//!
//! ```rust
//! use sqlweave_core::schema::{Column, Table};
//! use sqlweave_core::types::DataType;
//! use sqlweave_postgres::{ExcludeConstraint, ExcludeOptions};
//!
//! let mut booking = Table::new("booking")
//!     .column(Column::new("room", DataType::Integer))
//!     .column(Column::new("during", DataType::custom("TSRANGE")));
//!
//! let constraint = ExcludeConstraint::with_options(
//!     [("room", "="), ("during", "&&")],
//!     ExcludeOptions::new().name("no_double_booking"),
//! )
//! .unwrap();
//! booking.append_constraint(constraint).unwrap();
//! ```

use std::any::Any;
use std::collections::BTreeMap;

use tracing::debug;

use sqlweave_core::coercion::{
    coerce, expect_col_expression_collection, Argument, ConstraintColumn, Role,
};
use sqlweave_core::element::{ColumnClause, FromObject, Node};
use sqlweave_core::error::{Error, Result};
use sqlweave_core::schema::{
    copy_expression, ConstraintEvents, ConstraintExpr, SchemaConstraint, Table,
};

/// One `expression WITH operator` entry of an exclusion constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludeElement {
    expression: ConstraintExpr,
    name: Option<String>,
    operator: String,
}

impl ExcludeElement {
    /// The expression, pending until the constraint is attached when it was
    /// given as a column name.
    #[must_use]
    pub const fn expression(&self) -> &ConstraintExpr {
        &self.expression
    }

    /// The column name the entry refers to, if it refers to one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The exclusion operator.
    #[must_use]
    pub fn operator(&self) -> &str {
        &self.operator
    }
}

/// Keyword options of an [`ExcludeConstraint`].
#[derive(Debug, Clone, Default)]
pub struct ExcludeOptions {
    name: Option<String>,
    deferrable: Option<bool>,
    initially: Option<String>,
    using: Option<String>,
    where_: Option<Argument>,
    ops: BTreeMap<String, String>,
}

impl ExcludeOptions {
    /// Returns the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the in-database constraint name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Emits `DEFERRABLE` or `NOT DEFERRABLE`.
    #[must_use]
    pub const fn deferrable(mut self, deferrable: bool) -> Self {
        self.deferrable = Some(deferrable);
        self
    }

    /// Emits `INITIALLY <value>`.
    #[must_use]
    pub fn initially(mut self, initially: impl Into<String>) -> Self {
        self.initially = Some(initially.into());
        self
    }

    /// Sets the index method. Defaults to `gist`.
    #[must_use]
    pub fn using(mut self, using: impl Into<String>) -> Self {
        self.using = Some(using.into());
        self
    }

    /// Restricts the constraint to rows matching a predicate, given as an
    /// expression or as SQL text.
    #[must_use]
    pub fn where_(mut self, predicate: impl Into<Argument>) -> Self {
        self.where_ = Some(predicate.into());
        self
    }

    /// Sets the operator class used for a column.
    #[must_use]
    pub fn op(mut self, column: impl Into<String>, operator_class: impl Into<String>) -> Self {
        self.ops.insert(column.into(), operator_class.into());
        self
    }
}

/// A table-level `EXCLUDE` constraint.
///
/// Elements given as column names stay pending until the constraint is
/// attached to a table with [`Table::append_constraint`], which resolves
/// them against the table's columns.
#[derive(Debug, Clone)]
pub struct ExcludeConstraint {
    elements: Vec<ExcludeElement>,
    columns: Vec<ConstraintExpr>,
    operators: BTreeMap<String, String>,
    name: Option<String>,
    deferrable: Option<bool>,
    initially: Option<String>,
    using: String,
    where_: Option<Node>,
    ops: BTreeMap<String, String>,
    parent: Option<FromObject>,
    events: ConstraintEvents,
}

impl ExcludeConstraint {
    /// Creates the constraint from `(expression, operator)` pairs.
    ///
    /// # Errors
    ///
    /// See [`ExcludeConstraint::with_options`].
    pub fn new<I, A, O>(elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, O)>,
        A: Into<Argument>,
        O: Into<String>,
    {
        Self::with_options(elements, ExcludeOptions::default())
    }

    /// Creates the constraint from `(expression, operator)` pairs and
    /// keyword options.
    ///
    /// Each expression may be a column name, a column, any other expression
    /// or SQL text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArgumentCount`] for an empty element list,
    /// [`Error::Argument`] for an invalid index method, or a coercion error
    /// for an element or predicate of the wrong kind.
    pub fn with_options<I, A, O>(elements: I, options: ExcludeOptions) -> Result<Self>
    where
        I: IntoIterator<Item = (A, O)>,
        A: Into<Argument>,
        O: Into<String>,
    {
        let (expressions, operators): (Vec<Argument>, Vec<String>) = elements
            .into_iter()
            .map(|(expr, op)| (expr.into(), op.into()))
            .unzip();
        if expressions.is_empty() {
            return Err(Error::ArgumentCount(String::from(
                "an EXCLUDE constraint requires at least one element",
            )));
        }

        let using = options.using.unwrap_or_else(|| String::from("gist"));
        if using.is_empty() || !using.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::Argument(format!("invalid index method '{using}'")));
        }

        let collection = expect_col_expression_collection(Role::DdlConstraintColumn, expressions)?;
        let mut columns = Vec::new();
        let mut rendered = Vec::with_capacity(collection.len());
        let mut by_name = BTreeMap::new();
        for (entry, operator) in collection.into_iter().zip(operators) {
            let ConstraintColumn {
                expression,
                column,
                name,
                add_element,
            } = entry;
            if let Some(add) = add_element {
                columns.push(add);
            }
            let name = column
                .as_ref()
                .and_then(|c| c.downcast_ref::<ColumnClause>())
                .map(|c| c.name.clone())
                .or(name);
            if let Some(name) = &name {
                by_name.insert(name.clone(), operator.clone());
            }
            rendered.push(ExcludeElement {
                expression,
                name,
                operator,
            });
        }

        let where_ = options
            .where_
            .map(|predicate| coerce(Role::StatementOption, predicate))
            .transpose()?;

        Ok(Self {
            elements: rendered,
            columns,
            operators: by_name,
            name: options.name,
            deferrable: options.deferrable,
            initially: options.initially,
            using,
            where_,
            ops: options.ops,
            parent: None,
            events: ConstraintEvents::default(),
        })
    }

    /// The render entries, in construction order.
    #[must_use]
    pub fn elements(&self) -> &[ExcludeElement] {
        &self.elements
    }

    /// The constraint's column collection.
    #[must_use]
    pub fn columns(&self) -> &[ConstraintExpr] {
        &self.columns
    }

    /// Operator by column name.
    #[must_use]
    pub const fn operators(&self) -> &BTreeMap<String, String> {
        &self.operators
    }

    /// `DEFERRABLE` setting, if any.
    #[must_use]
    pub const fn deferrable(&self) -> Option<bool> {
        self.deferrable
    }

    /// `INITIALLY` setting, if any.
    #[must_use]
    pub fn initially(&self) -> Option<&str> {
        self.initially.as_deref()
    }

    /// The index method.
    #[must_use]
    pub fn using(&self) -> &str {
        &self.using
    }

    /// The WHERE predicate, if any.
    #[must_use]
    pub const fn where_clause(&self) -> Option<&Node> {
        self.where_.as_ref()
    }

    /// Operator classes by column name.
    #[must_use]
    pub const fn ops(&self) -> &BTreeMap<String, String> {
        &self.ops
    }

    /// The attachment listeners.
    pub fn events_mut(&mut self) -> &mut ConstraintEvents {
        &mut self.events
    }

    fn options(&self) -> ExcludeOptions {
        ExcludeOptions {
            name: self.name.clone(),
            deferrable: self.deferrable,
            initially: self.initially.clone(),
            using: Some(self.using.clone()),
            where_: None,
            ops: self.ops.clone(),
        }
    }
}

impl SchemaConstraint for ExcludeConstraint {
    fn visit_name(&self) -> &'static str {
        "exclude_constraint"
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parent(&self) -> Option<&FromObject> {
        self.parent.as_ref()
    }

    fn set_parent(&mut self, table: &Table) -> Result<()> {
        if let Some(parent) = &self.parent {
            return Err(Error::AlreadyAttached {
                table: parent.name.clone(),
            });
        }

        let elements = self
            .elements
            .iter()
            .map(|element| -> Result<ExcludeElement> {
                Ok(ExcludeElement {
                    expression: ConstraintExpr::Resolved(element.expression.resolve(table)?),
                    name: element.name.clone(),
                    operator: element.operator.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let columns = self
            .columns
            .iter()
            .map(|column| column.resolve(table).map(ConstraintExpr::Resolved))
            .collect::<Result<Vec<_>>>()?;

        self.events.fire_before(&*self, table);
        self.elements = elements;
        self.columns = columns;
        self.parent = Some(table.from_object());
        debug!(
            table = table.name(),
            name = self.name.as_deref().unwrap_or(""),
            elements = self.elements.len(),
            "resolved exclude constraint"
        );
        self.events.fire_after(&*self, table);
        Ok(())
    }

    fn copy_to(&self, target: &Table) -> Result<Box<dyn SchemaConstraint>> {
        let source = self.parent.as_ref();
        let elements = self
            .elements
            .iter()
            .map(|element| -> Result<(Argument, String)> {
                let expression = match &element.expression {
                    ConstraintExpr::Pending(name) => Argument::from(name.as_str()),
                    ConstraintExpr::Resolved(node) => {
                        Argument::from(copy_expression(node, source, Some(target))?)
                    }
                };
                Ok((expression, element.operator.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut options = self.options();
        if let Some(predicate) = &self.where_ {
            options = options.where_(copy_expression(predicate, source, Some(target))?);
        }

        let mut copy = Self::with_options(elements, options)?;
        copy.events.update(&self.events);
        debug!(source = ?source, target = target.name(), "copied exclude constraint");
        Ok(Box::new(copy))
    }

    fn get_children(&self) -> Vec<&Node> {
        self.elements
            .iter()
            .filter_map(|e| e.expression.as_node())
            .chain(self.where_.as_ref())
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
