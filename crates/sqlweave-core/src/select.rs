//! SELECT statement with syntax extension points.
//!
//! [`Select`] is built with consuming builder methods. Dialect crates add
//! clauses to it without touching this module: a [`SyntaxExtension`] is
//! applied with [`Select::ext`] and registers itself into one of the named
//! [`ExtensionPoint`] slots through a merge callback, which lets repeated
//! applications of the same extension kind coalesce.
//!
//! ```rust
//! use sqlweave_core::element::table_column;
//! use sqlweave_core::select::Select;
//! use sqlweave_core::types::DataType;
//!
//! let stmt = Select::new([table_column("users", "id", DataType::Integer)])
//!     .order_by(["id"])
//!     .unwrap()
//!     .limit(10);
//! assert_eq!(stmt.froms()[0].name, "users");
//! ```

use std::any::Any;
use std::fmt;

use tracing::{debug, trace};

use crate::coercion::{coerce, Argument, Role};
use crate::element::{merge_froms, ClauseElement, FromObject, Node, Traversal};
use crate::error::{Error, Result};

/// A named slot on a statement where extension clauses are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionPoint {
    /// Between `SELECT [DISTINCT]` and the column list.
    PreColumns,
    /// After WHERE, before GROUP BY.
    PostCriteria,
    /// After ORDER BY, LIMIT and OFFSET.
    PostBody,
}

impl ExtensionPoint {
    /// Every slot in render order.
    pub const ALL: [Self; 3] = [Self::PreColumns, Self::PostCriteria, Self::PostBody];

    /// Returns the slot name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreColumns => "pre_columns",
            Self::PostCriteria => "post_criteria",
            Self::PostBody => "post_body",
        }
    }
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clause that knows how to attach itself to a [`Select`].
pub trait SyntaxExtension: ClauseElement {
    /// Applies the extension to `select`.
    ///
    /// Called once per [`Select::ext`] call, on a copy of the statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the statement already uses an
    /// incompatible feature.
    fn apply_to_select(&self, select: &mut Select) -> Result<()>;
}

/// A SELECT statement.
#[derive(Debug, Clone, Default)]
pub struct Select {
    columns: Vec<Node>,
    where_clause: Option<Node>,
    group_by: Vec<Node>,
    order_by: Vec<Node>,
    limit: Option<u64>,
    offset: Option<u64>,
    distinct: bool,
    distinct_on: Vec<Node>,
    distinct_on_claimed: bool,
    pre_columns: Vec<Node>,
    post_criteria: Vec<Node>,
    post_body: Vec<Node>,
}

impl Select {
    /// Creates a statement selecting `columns`.
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = Node>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Adds columns to the select list.
    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = Node>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Adds a WHERE criterion, ANDed with any existing one.
    #[must_use]
    pub fn where_clause(mut self, criterion: Node) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(criterion),
            None => criterion,
        });
        self
    }

    /// Adds GROUP BY terms.
    ///
    /// # Errors
    ///
    /// Returns a coercion error for terms that cannot appear in GROUP BY.
    pub fn group_by<I, A>(mut self, terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        for term in terms {
            self.group_by.push(coerce(Role::ByOf, term)?);
        }
        Ok(self)
    }

    /// Adds ORDER BY terms.
    ///
    /// # Errors
    ///
    /// Returns a coercion error for terms that cannot appear in ORDER BY.
    pub fn order_by<I, A>(mut self, terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        for term in terms {
            self.order_by.push(coerce(Role::ByOf, term)?);
        }
        Ok(self)
    }

    /// Sets LIMIT.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets OFFSET.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets DISTINCT.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Sets DISTINCT with legacy DISTINCT ON terms.
    ///
    /// Superseded by DISTINCT ON syntax extensions. The two cannot be mixed
    /// on one statement, in either order.
    ///
    /// # Errors
    ///
    /// Returns a coercion error for terms that cannot appear in DISTINCT ON,
    /// or [`Error::Conflict`] if a DISTINCT ON extension was already applied.
    pub fn distinct_on<I, A>(mut self, terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        for term in terms {
            self.distinct_on.push(coerce(Role::ByOf, term)?);
        }
        self.check_distinct_on_conflict()?;
        self.distinct = true;
        Ok(self)
    }

    /// Records that a syntax extension renders this statement's DISTINCT ON
    /// clause. Called from [`SyntaxExtension::apply_to_select`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the legacy [`Select::distinct_on`]
    /// shortcut already set terms.
    pub fn claim_distinct_on(&mut self) -> Result<()> {
        self.distinct_on_claimed = true;
        self.check_distinct_on_conflict()
    }

    /// Returns whether a syntax extension renders the DISTINCT ON clause.
    #[must_use]
    pub const fn is_distinct_on_claimed(&self) -> bool {
        self.distinct_on_claimed
    }

    fn check_distinct_on_conflict(&self) -> Result<()> {
        if self.distinct_on_claimed && !self.distinct_on.is_empty() {
            Err(Error::Conflict(String::from(
                "DISTINCT ON cannot be set both by a syntax extension and by the legacy \
                 distinct_on() shortcut",
            )))
        } else {
            Ok(())
        }
    }

    /// Returns a copy of this statement with `extension` applied.
    ///
    /// The receiver is never modified, so a failed application leaves
    /// nothing behind.
    ///
    /// # Errors
    ///
    /// Propagates the extension's error.
    pub fn ext<E: SyntaxExtension>(&self, extension: E) -> Result<Self> {
        let mut stmt = self.clone();
        extension.apply_to_select(&mut stmt)?;
        debug!(extension = extension.visit_name(), "applied syntax extension");
        Ok(stmt)
    }

    /// Replaces the contents of an extension point with the result of
    /// `merge`, which receives the current contents.
    pub fn apply_syntax_extension_point<F>(&mut self, point: ExtensionPoint, merge: F)
    where
        F: FnOnce(Vec<Node>) -> Vec<Node>,
    {
        let slot = self.slot_mut(point);
        let before = slot.len();
        *slot = merge(std::mem::take(slot));
        trace!(point = %point, before, after = slot.len(), "merged extension point");
    }

    /// Marks the statement DISTINCT in place.
    pub fn set_distinct(&mut self) {
        self.distinct = true;
    }

    fn slot_mut(&mut self, point: ExtensionPoint) -> &mut Vec<Node> {
        match point {
            ExtensionPoint::PreColumns => &mut self.pre_columns,
            ExtensionPoint::PostCriteria => &mut self.post_criteria,
            ExtensionPoint::PostBody => &mut self.post_body,
        }
    }

    /// Returns the contents of an extension point.
    #[must_use]
    pub fn extension_point(&self, point: ExtensionPoint) -> &[Node] {
        match point {
            ExtensionPoint::PreColumns => &self.pre_columns,
            ExtensionPoint::PostCriteria => &self.post_criteria,
            ExtensionPoint::PostBody => &self.post_body,
        }
    }

    /// Returns the select list.
    #[must_use]
    pub fn selected_columns(&self) -> &[Node] {
        &self.columns
    }

    /// Returns the WHERE criterion.
    #[must_use]
    pub const fn where_criteria(&self) -> Option<&Node> {
        self.where_clause.as_ref()
    }

    /// Returns the GROUP BY terms.
    #[must_use]
    pub fn group_by_terms(&self) -> &[Node] {
        &self.group_by
    }

    /// Returns the ORDER BY terms.
    #[must_use]
    pub fn order_by_terms(&self) -> &[Node] {
        &self.order_by
    }

    /// Returns the LIMIT.
    #[must_use]
    pub const fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// Returns the OFFSET.
    #[must_use]
    pub const fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Returns whether the statement is DISTINCT.
    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Returns the legacy DISTINCT ON terms.
    #[must_use]
    pub fn distinct_on_terms(&self) -> &[Node] {
        &self.distinct_on
    }

    /// Returns the relations the statement selects from, derived from the
    /// select list and WHERE criterion.
    #[must_use]
    pub fn froms(&self) -> Vec<FromObject> {
        let mut froms = Vec::new();
        for column in &self.columns {
            merge_froms(&mut froms, column.from_objects());
        }
        if let Some(criterion) = &self.where_clause {
            merge_froms(&mut froms, criterion.from_objects());
        }
        froms
    }
}

impl ClauseElement for Select {
    fn visit_name(&self) -> &'static str {
        "select"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("columns", Traversal::ElementList(&self.columns)),
            ("where", Traversal::OptionalElement(self.where_clause.as_ref())),
            ("group_by", Traversal::ElementList(&self.group_by)),
            ("order_by", Traversal::ElementList(&self.order_by)),
            ("limit", Traversal::Integer(self.limit)),
            ("offset", Traversal::Integer(self.offset)),
            ("distinct", Traversal::Boolean(self.distinct)),
            ("distinct_on", Traversal::ElementList(&self.distinct_on)),
            ("distinct_on_claimed", Traversal::Boolean(self.distinct_on_claimed)),
            ("pre_columns", Traversal::ElementList(&self.pre_columns)),
            ("post_criteria", Traversal::ElementList(&self.post_criteria)),
            ("post_body", Traversal::ElementList(&self.post_body)),
        ]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        let mut list = |nodes: &[Node]| nodes.iter().map(&mut *clone).collect::<Vec<_>>();
        let columns = list(&self.columns);
        let group_by = list(&self.group_by);
        let order_by = list(&self.order_by);
        let distinct_on = list(&self.distinct_on);
        let pre_columns = list(&self.pre_columns);
        let post_criteria = list(&self.post_criteria);
        let post_body = list(&self.post_body);
        Node::new(Self {
            columns,
            where_clause: self.where_clause.as_ref().map(&mut *clone),
            group_by,
            order_by,
            limit: self.limit,
            offset: self.offset,
            distinct: self.distinct,
            distinct_on,
            distinct_on_claimed: self.distinct_on_claimed,
            pre_columns,
            post_criteria,
            post_body,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    // A statement encloses its relations rather than exporting them.
    fn from_objects(&self) -> Vec<FromObject> {
        Vec::new()
    }
}

impl From<Select> for Node {
    fn from(select: Select) -> Self {
        Self::new(select)
    }
}

/// Extension that appends a raw hint after the statement body.
///
/// Repeated applications keep every hint, in application order.
#[derive(Debug, Clone)]
pub struct StatementHint {
    hint: Node,
}

impl StatementHint {
    /// Creates a hint from SQL text.
    ///
    /// # Errors
    ///
    /// Returns a coercion error for non-text literals.
    pub fn new(hint: impl Into<Argument>) -> Result<Self> {
        Ok(Self {
            hint: coerce(Role::StatementOption, hint)?,
        })
    }

    /// Returns the hint text node.
    #[must_use]
    pub const fn hint(&self) -> &Node {
        &self.hint
    }
}

impl ClauseElement for StatementHint {
    fn visit_name(&self) -> &'static str {
        "statement_hint"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![("hint", Traversal::Element(&self.hint))]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            hint: clone(&self.hint),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SyntaxExtension for StatementHint {
    fn apply_to_select(&self, select: &mut Select) -> Result<()> {
        let node = Node::new(self.clone());
        select.apply_syntax_extension_point(ExtensionPoint::PostBody, |mut existing| {
            existing.push(node);
            existing
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{column, literal, table_column, text};
    use crate::types::DataType;

    fn users() -> Select {
        Select::new([
            table_column("users", "id", DataType::Integer),
            table_column("users", "name", DataType::Text),
        ])
    }

    #[test]
    fn test_froms_from_columns_and_where() {
        let stmt = users().where_clause(
            table_column("orders", "user_id", DataType::Integer)
                .eq(table_column("users", "id", DataType::Integer)),
        );
        assert_eq!(
            stmt.froms(),
            vec![FromObject::new("users"), FromObject::new("orders")]
        );
    }

    #[test]
    fn test_where_clause_is_anded() {
        let stmt = users()
            .where_clause(column("a").eq(literal(1_i64)))
            .where_clause(column("b").eq(literal(2_i64)));
        let expected = column("a")
            .eq(literal(1_i64))
            .and(column("b").eq(literal(2_i64)));
        assert!(stmt.where_criteria().unwrap().compare(&expected));
    }

    #[test]
    fn test_order_by_coerces_strings_to_literal_columns() {
        let stmt = users().order_by(["name"]).unwrap();
        assert_eq!(stmt.order_by_terms()[0].visit_name(), "column");
        assert!(users().order_by([3_i64]).is_err());
    }

    #[test]
    fn test_extension_point_merge() {
        let mut stmt = users();
        assert!(stmt.extension_point(ExtensionPoint::PreColumns).is_empty());
        stmt.apply_syntax_extension_point(ExtensionPoint::PreColumns, |mut existing| {
            existing.push(text("SQL_NO_CACHE"));
            existing
        });
        stmt.apply_syntax_extension_point(ExtensionPoint::PreColumns, |existing| {
            assert_eq!(existing.len(), 1);
            vec![text("SQL_CALC_FOUND_ROWS")]
        });
        let slot = stmt.extension_point(ExtensionPoint::PreColumns);
        assert_eq!(slot.len(), 1);
        assert!(slot[0].compare(&text("SQL_CALC_FOUND_ROWS")));
    }

    #[test]
    fn test_ext_is_generative() {
        let base = users();
        let hinted = base.ext(StatementHint::new("FOR UPDATE").unwrap()).unwrap();
        let twice = hinted.ext(StatementHint::new("SKIP LOCKED").unwrap()).unwrap();

        assert!(base.extension_point(ExtensionPoint::PostBody).is_empty());
        assert_eq!(hinted.extension_point(ExtensionPoint::PostBody).len(), 1);
        assert_eq!(twice.extension_point(ExtensionPoint::PostBody).len(), 2);
    }

    #[test]
    fn test_set_distinct_is_in_place() {
        let mut stmt = users();
        assert!(!stmt.is_distinct());
        stmt.set_distinct();
        assert!(stmt.is_distinct());
    }

    #[test]
    fn test_distinct_on_claim_conflicts_both_ways() {
        let mut plain = users().distinct();
        assert!(plain.claim_distinct_on().is_ok());
        assert!(plain.is_distinct_on_claimed());

        let mut legacy = users().distinct_on(["name"]).unwrap();
        assert!(legacy.is_distinct());
        assert!(matches!(legacy.claim_distinct_on(), Err(Error::Conflict(_))));

        let err = plain.distinct_on(["id"]).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_select_clone_and_cache_key() {
        let a = users().where_clause(column("id").eq(literal(1_i64))).limit(5);
        let b = users().where_clause(column("id").eq(literal(2_i64))).limit(5);
        let na = Node::new(a);
        let nb = Node::new(b);
        assert!(!na.compare(&nb));
        assert_eq!(na.cache_key(), nb.cache_key());
        assert!(na.clone().compare(&na));
        assert!(na.from_objects().is_empty());
    }
}
