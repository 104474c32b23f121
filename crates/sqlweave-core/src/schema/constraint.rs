//! Table-level constraints and their attachment lifecycle.

use std::any::Any;
use std::fmt;

use tracing::debug;

use super::{ConstraintEvents, Table};
use crate::coercion::{coerce, Argument, Role};
use crate::element::{ColumnClause, FromObject, Node};
use crate::error::{Error, Result};

/// A constraint expression that may still be waiting for its table.
///
/// A constraint built from a column *name* holds `Pending` until it is
/// attached to a table, at which point the name is looked up and the entry
/// becomes `Resolved`. The transition happens once.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintExpr {
    /// A column name not yet resolved against a table.
    Pending(String),
    /// A resolved expression.
    Resolved(Node),
}

impl ConstraintExpr {
    /// Returns the resolved expression, if any.
    #[must_use]
    pub const fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Resolved(node) => Some(node),
            Self::Pending(_) => None,
        }
    }

    /// Returns the pending column name, if any.
    #[must_use]
    pub fn pending_name(&self) -> Option<&str> {
        match self {
            Self::Pending(name) => Some(name),
            Self::Resolved(_) => None,
        }
    }

    /// Returns whether the entry still waits for a table.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Resolves a pending name against `table`; resolved entries are
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if the name is not a column of
    /// `table`.
    pub fn resolve(&self, table: &Table) -> Result<Node> {
        match self {
            Self::Pending(name) => table.require(name),
            Self::Resolved(node) => Ok(node.clone()),
        }
    }
}

/// A constraint that can be attached to a [`Table`].
pub trait SchemaConstraint: fmt::Debug + Send + Sync + 'static {
    /// Stable kind tag used by compilers to pick a DDL renderer.
    fn visit_name(&self) -> &'static str;

    /// The in-database constraint name.
    fn name(&self) -> Option<&str>;

    /// The table this constraint is attached to.
    fn parent(&self) -> Option<&FromObject>;

    /// Attaches the constraint to `table`, resolving deferred column
    /// references.
    ///
    /// Implementations validate before mutating: on error the constraint is
    /// left exactly as it was.
    ///
    /// # Errors
    ///
    /// Fails on a second attachment or an unresolvable column.
    fn set_parent(&mut self, table: &Table) -> Result<()>;

    /// Builds an unattached copy whose expressions reference `target`
    /// instead of the current parent.
    ///
    /// # Errors
    ///
    /// Fails if an expression references a column `target` lacks.
    fn copy_to(&self, target: &Table) -> Result<Box<dyn SchemaConstraint>>;

    /// The expressions this constraint renders.
    fn get_children(&self) -> Vec<&Node>;

    /// Upcast used for kind checks.
    fn as_any(&self) -> &dyn Any;
}

/// Rebinds every column of `source` referenced in `expr` to the column of
/// the same name in `target`.
///
/// Expressions are cloned unchanged when either table is absent.
///
/// # Errors
///
/// Returns [`Error::ColumnNotFound`] if `target` lacks a referenced column.
pub fn copy_expression(
    expr: &Node,
    source: Option<&FromObject>,
    target: Option<&Table>,
) -> Result<Node> {
    let (Some(source), Some(target)) = (source, target) else {
        return Ok(expr.clone());
    };
    let mut failure = None;
    let copied = expr.replace(&mut |node: &Node| {
        let column = node.downcast_ref::<ColumnClause>()?;
        if column.table.as_ref() != Some(source) {
            return None;
        }
        match target.require(&column.name) {
            Ok(replacement) => Some(replacement),
            Err(err) => {
                failure.get_or_insert(err);
                None
            }
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(copied),
    }
}

/// A table-level `CHECK` constraint.
#[derive(Debug, Clone)]
pub struct CheckConstraint {
    name: Option<String>,
    sqltext: Node,
    parent: Option<FromObject>,
    events: ConstraintEvents,
}

impl CheckConstraint {
    /// Creates a check constraint from a boolean expression.
    #[must_use]
    pub fn new(sqltext: Node) -> Self {
        Self {
            name: None,
            sqltext,
            parent: None,
            events: ConstraintEvents::default(),
        }
    }

    /// Creates a check constraint from a SQL string or expression.
    ///
    /// # Errors
    ///
    /// Returns a coercion error for non-text literals.
    pub fn from_sql(sqltext: impl Into<Argument>) -> Result<Self> {
        Ok(Self::new(coerce(Role::StatementOption, sqltext)?))
    }

    /// Sets the constraint name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the check expression.
    #[must_use]
    pub const fn sqltext(&self) -> &Node {
        &self.sqltext
    }

    /// Returns the attachment listeners.
    pub fn events_mut(&mut self) -> &mut ConstraintEvents {
        &mut self.events
    }
}

impl SchemaConstraint for CheckConstraint {
    fn visit_name(&self) -> &'static str {
        "check_constraint"
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
        self.events.fire_before(&*self, table);
        self.parent = Some(table.from_object());
        self.events.fire_after(&*self, table);
        Ok(())
    }

    fn copy_to(&self, target: &Table) -> Result<Box<dyn SchemaConstraint>> {
        let sqltext = copy_expression(&self.sqltext, self.parent.as_ref(), Some(target))?;
        let mut copy = Self::new(sqltext);
        copy.name.clone_from(&self.name);
        copy.events.update(&self.events);
        debug!(
            name = self.name.as_deref().unwrap_or(""),
            target = target.name(),
            "copied check constraint"
        );
        Ok(Box::new(copy))
    }

    fn get_children(&self) -> Vec<&Node> {
        vec![&self.sqltext]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
