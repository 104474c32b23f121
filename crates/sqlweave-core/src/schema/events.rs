//! Listeners notified around constraint attachment.

use std::fmt;
use std::sync::Arc;

use super::{SchemaConstraint, Table};

/// Callback invoked with the constraint being attached and its table.
pub type AttachListener = Arc<dyn Fn(&dyn SchemaConstraint, &Table) + Send + Sync>;

/// The listeners registered on one constraint.
///
/// Listeners survive [`SchemaConstraint::copy_to`]: the copy receives every
/// listener of its source.
#[derive(Clone, Default)]
pub struct ConstraintEvents {
    before_parent_attach: Vec<AttachListener>,
    after_parent_attach: Vec<AttachListener>,
}

impl ConstraintEvents {
    /// Registers a listener run before the constraint takes its parent.
    pub fn listen_before_parent_attach<F>(&mut self, listener: F)
    where
        F: Fn(&dyn SchemaConstraint, &Table) + Send + Sync + 'static,
    {
        self.before_parent_attach.push(Arc::new(listener));
    }

    /// Registers a listener run once the constraint is attached.
    pub fn listen_after_parent_attach<F>(&mut self, listener: F)
    where
        F: Fn(&dyn SchemaConstraint, &Table) + Send + Sync + 'static,
    {
        self.after_parent_attach.push(Arc::new(listener));
    }

    /// Runs the before-attach listeners in registration order.
    pub fn fire_before(&self, constraint: &dyn SchemaConstraint, table: &Table) {
        for listener in &self.before_parent_attach {
            listener(constraint, table);
        }
    }

    /// Runs the after-attach listeners in registration order.
    pub fn fire_after(&self, constraint: &dyn SchemaConstraint, table: &Table) {
        for listener in &self.after_parent_attach {
            listener(constraint, table);
        }
    }

    /// Appends the listeners of `other`.
    pub fn update(&mut self, other: &Self) {
        self.before_parent_attach
            .extend(other.before_parent_attach.iter().cloned());
        self.after_parent_attach
            .extend(other.after_parent_attach.iter().cloned());
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.before_parent_attach.len() + self.after_parent_attach.len()
    }

    /// Returns whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ConstraintEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintEvents")
            .field("before_parent_attach", &self.before_parent_attach.len())
            .field("after_parent_attach", &self.after_parent_attach.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::element::{literal, FromObject};
    use crate::schema::{CheckConstraint, Column};
    use crate::types::DataType;

    fn rooms() -> Table {
        Table::new("rooms").column(Column::new("floor", DataType::Integer))
    }

    #[test]
    fn test_listeners_run_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let before = Arc::clone(&seen);
        let after = Arc::clone(&seen);

        let table = rooms();
        let mut check = CheckConstraint::new(table.c("floor").unwrap().gt(literal(0_i64)));
        check
            .events_mut()
            .listen_before_parent_attach(move |constraint, table| {
                assert!(constraint.parent().is_none());
                before.lock().unwrap().push(format!("before {}", table.name()));
            });
        check
            .events_mut()
            .listen_after_parent_attach(move |constraint, _| {
                assert_eq!(constraint.parent(), Some(&FromObject::new("rooms")));
                after.lock().unwrap().push(String::from("after"));
            });

        let mut table = table;
        table.append_constraint(check).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["before rooms", "after"]);
    }

    #[test]
    fn test_update_copies_listeners() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let mut source = ConstraintEvents::default();
        source.listen_after_parent_attach(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut copy = ConstraintEvents::default();
        assert!(copy.is_empty());
        copy.update(&source);
        assert_eq!(copy.len(), 1);

        let table = rooms();
        let check = CheckConstraint::new(literal(true));
        copy.fire_after(&check, &table);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
