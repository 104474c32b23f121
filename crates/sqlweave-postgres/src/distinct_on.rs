//! `DISTINCT ON` as a statement syntax extension.
//!
//! ```rust
//! use sqlweave_core::element::table_column;
//! use sqlweave_core::select::{ExtensionPoint, Select};
//! use sqlweave_core::types::DataType;
//! use sqlweave_postgres::distinct_on;
//!
//! let user_id = table_column("orders", "user_id", DataType::Integer);
//! let stmt = Select::new([user_id.clone()])
//!     .ext(distinct_on([user_id]).unwrap())
//!     .unwrap();
//! assert!(stmt.is_distinct());
//! assert_eq!(stmt.extension_point(ExtensionPoint::PreColumns).len(), 1);
//! ```

use std::any::Any;

use sqlweave_core::coercion::{coerce, Argument, Role};
use sqlweave_core::element::{ClauseElement, Node, Traversal};
use sqlweave_core::error::{Error, Result};
use sqlweave_core::select::{ExtensionPoint, Select, SyntaxExtension};

/// The targets of a `DISTINCT ON (...)` clause.
#[derive(Debug, Clone)]
pub struct DistinctOnClause {
    distinct_on: Vec<Node>,
}

impl DistinctOnClause {
    /// Creates the clause, coercing each target as an ORDER BY term.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArgumentCount`] for an empty target list, or a
    /// coercion error for a target that cannot be ordered on.
    pub fn new<I, A>(exprs: I) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        let distinct_on = exprs
            .into_iter()
            .map(|expr| coerce(Role::ByOf, expr))
            .collect::<Result<Vec<_>>>()?;
        if distinct_on.is_empty() {
            return Err(Error::ArgumentCount(String::from(
                "DISTINCT ON requires at least one expression",
            )));
        }
        Ok(Self { distinct_on })
    }

    /// The targets, in order.
    #[must_use]
    pub fn terms(&self) -> &[Node] {
        &self.distinct_on
    }

    /// Folds every `DISTINCT ON` clause already in `existing` into one
    /// clause with this clause's targets appended. Other entries keep their
    /// relative order; the merged clause goes last.
    fn merge_other_distinct(&self, existing: Vec<Node>) -> Vec<Node> {
        let mut merged = Vec::new();
        let mut rest = Vec::with_capacity(existing.len() + 1);
        for node in existing {
            match node.downcast_ref::<Self>() {
                Some(other) => merged.extend(other.distinct_on.iter().cloned()),
                None => rest.push(node),
            }
        }
        merged.extend(self.distinct_on.iter().cloned());
        rest.push(Node::new(Self {
            distinct_on: merged,
        }));
        rest
    }
}

impl ClauseElement for DistinctOnClause {
    fn visit_name(&self) -> &'static str {
        "postgresql_distinct_on"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![("distinct_on", Traversal::ElementList(&self.distinct_on))]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            distinct_on: self.distinct_on.iter().map(clone).collect(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SyntaxExtension for DistinctOnClause {
    fn apply_to_select(&self, select: &mut Select) -> Result<()> {
        select.claim_distinct_on()?;
        select.set_distinct();
        select.apply_syntax_extension_point(ExtensionPoint::PreColumns, |existing| {
            self.merge_other_distinct(existing)
        });
        Ok(())
    }
}

/// Shorthand for [`DistinctOnClause::new`].
///
/// # Errors
///
/// See [`DistinctOnClause::new`].
pub fn distinct_on<I, A>(exprs: I) -> Result<DistinctOnClause>
where
    I: IntoIterator<Item = A>,
    A: Into<Argument>,
{
    DistinctOnClause::new(exprs)
}
