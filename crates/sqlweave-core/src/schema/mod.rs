//! Table and column model that constraints attach to.
//!
//! Tables own an ordered column collection and a list of constraints.
//! Appending a constraint runs its [`SchemaConstraint::set_parent`] hook,
//! which is where column names given as strings get resolved.

mod constraint;
mod events;

pub use constraint::{copy_expression, CheckConstraint, ConstraintExpr, SchemaConstraint};
pub use events::{AttachListener, ConstraintEvents};

use tracing::debug;

use crate::element::{FromObject, Node};
use crate::error::{Error, Result};
use crate::types::DataType;

/// A table column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Data type.
    pub data_type: DataType,
    /// Whether the column is nullable.
    pub nullable: bool,
    /// Whether this is a primary key.
    pub primary_key: bool,
    /// Whether this column is unique.
    pub unique: bool,
    table: Option<FromObject>,
}

impl Column {
    /// Creates a new column definition.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            unique: false,
            table: None,
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column as PRIMARY KEY.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false; // Primary keys are implicitly NOT NULL
        self
    }

    /// Sets the column as UNIQUE.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Returns the table this column belongs to, once added to one.
    #[must_use]
    pub const fn table(&self) -> Option<&FromObject> {
        self.table.as_ref()
    }

    /// Returns a column expression referencing this column.
    #[must_use]
    pub fn expr(&self) -> Node {
        Node::new(crate::element::ColumnClause {
            name: self.name.clone(),
            table: self.table.clone(),
            data_type: self.data_type.clone(),
            is_literal: false,
        })
    }
}

/// A table: an ordered column collection plus constraints.
#[derive(Debug)]
pub struct Table {
    name: String,
    schema: Option<String>,
    columns: Vec<Column>,
    constraints: Vec<Box<dyn SchemaConstraint>>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Sets the schema qualifier.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        let from = self.from_object();
        for column in &mut self.columns {
            column.table = Some(from.clone());
        }
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, mut column: Column) -> Self {
        column.table = Some(self.from_object());
        self.columns.push(column);
        self
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the schema qualifier.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Returns this table as a FROM source.
    #[must_use]
    pub fn from_object(&self) -> FromObject {
        FromObject {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    /// Returns the columns, in definition order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column definition by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns a column expression for `name`, if the table has it.
    #[must_use]
    pub fn c(&self, name: &str) -> Option<Node> {
        self.get_column(name).map(Column::expr)
    }

    /// Like [`Table::c`], but fails with [`Error::ColumnNotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if the table has no such column.
    pub fn require(&self, name: &str) -> Result<Node> {
        self.c(name).ok_or_else(|| Error::ColumnNotFound {
            table: self.name.clone(),
            column: String::from(name),
        })
    }

    /// Returns the attached constraints.
    #[must_use]
    pub fn constraints(&self) -> &[Box<dyn SchemaConstraint>] {
        &self.constraints
    }

    /// Returns the attached constraints of type `T`.
    pub fn constraints_of<T: SchemaConstraint>(&self) -> impl Iterator<Item = &T> {
        self.constraints
            .iter()
            .filter_map(|c| c.as_any().downcast_ref::<T>())
    }

    /// Attaches a constraint. The table is unchanged if attachment fails.
    ///
    /// # Errors
    ///
    /// Propagates the constraint's attachment error.
    pub fn append_constraint<C: SchemaConstraint>(&mut self, constraint: C) -> Result<()> {
        self.append_boxed_constraint(Box::new(constraint))
    }

    /// Attaches an already boxed constraint.
    ///
    /// # Errors
    ///
    /// Propagates the constraint's attachment error.
    pub fn append_boxed_constraint(
        &mut self,
        mut constraint: Box<dyn SchemaConstraint>,
    ) -> Result<()> {
        constraint.set_parent(self)?;
        debug!(
            table = %self.name,
            kind = constraint.visit_name(),
            name = constraint.name().unwrap_or(""),
            "appended constraint"
        );
        self.constraints.push(constraint);
        Ok(())
    }

    /// Copies the table under a new name, rebinding every constraint's
    /// expressions to the copy.
    ///
    /// # Errors
    ///
    /// Fails if a constraint cannot be copied or re-attached.
    pub fn to_metadata(&self, name: impl Into<String>) -> Result<Self> {
        let mut copy = Self {
            name: name.into(),
            schema: self.schema.clone(),
            columns: Vec::new(),
            constraints: Vec::new(),
        };
        for column in &self.columns {
            let mut column = column.clone();
            column.table = Some(copy.from_object());
            copy.columns.push(column);
        }
        for constraint in &self.constraints {
            let copied = constraint.copy_to(&copy)?;
            copy.append_boxed_constraint(copied)?;
        }
        debug!(source = %self.name, target = %copy.name, "copied table");
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{literal, ColumnClause};

    fn booking() -> Table {
        Table::new("booking")
            .column(Column::new("id", DataType::Integer).primary_key())
            .column(Column::new("room", DataType::Integer).not_null())
    }

    #[test]
    fn test_column_builder() {
        let col = Column::new("id", DataType::Integer).primary_key().unique();
        assert!(col.primary_key);
        assert!(col.unique);
        assert!(!col.nullable);
        assert!(col.table().is_none());
    }

    #[test]
    fn test_column_lookup() {
        let table = booking();
        let room = table.c("room").unwrap();
        let clause = room.downcast_ref::<ColumnClause>().unwrap();
        assert_eq!(clause.table_name(), Some("booking"));
        assert_eq!(clause.data_type, DataType::Integer);
        assert!(table.c("missing").is_none());
        assert_eq!(
            table.require("missing").unwrap_err(),
            Error::ColumnNotFound {
                table: String::from("booking"),
                column: String::from("missing"),
            }
        );
    }

    #[test]
    fn test_schema_applies_to_columns() {
        let table = booking().with_schema("hotel");
        let room = table.c("room").unwrap();
        assert_eq!(room.from_objects()[0].schema.as_deref(), Some("hotel"));
    }

    #[test]
    fn test_check_constraint_copies_to_new_table() {
        let mut table = booking();
        let check = CheckConstraint::new(table.c("room").unwrap().gt(literal(0_i64)))
            .named("room_positive");
        table.append_constraint(check).unwrap();

        let copy = table.to_metadata("booking_archive").unwrap();
        let copied: Vec<&CheckConstraint> = copy.constraints_of::<CheckConstraint>().collect();
        assert_eq!(copied.len(), 1);
        assert_eq!(
            copied[0].sqltext().from_objects(),
            vec![FromObject::new("booking_archive")]
        );
        assert_eq!(copied[0].parent().map(|p| p.name.as_str()), Some("booking_archive"));

        let original: Vec<&CheckConstraint> = table.constraints_of::<CheckConstraint>().collect();
        assert_eq!(
            original[0].sqltext().from_objects(),
            vec![FromObject::new("booking")]
        );
    }
}
