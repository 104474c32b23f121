//! Aggregate functions with an in-call ORDER BY.

use std::any::Any;

use sqlweave_core::coercion::{coerce, Argument, Role};
use sqlweave_core::element::{ClauseElement, ClauseList, Node, Operator, Traversal};
use sqlweave_core::error::{Error, Result};
use sqlweave_core::functions::array_agg_with;
use sqlweave_core::types::DataType;

use crate::types;

/// `target ORDER BY terms`, used as an aggregate function argument.
///
/// ```rust
/// use sqlweave_core::element::table_column;
/// use sqlweave_core::types::DataType;
/// use sqlweave_postgres::{aggregate_order_by, array_agg};
///
/// let name = table_column("users", "name", DataType::Text);
/// let expr = array_agg(aggregate_order_by(name.clone(), [name.desc()]).unwrap()).unwrap();
/// assert_eq!(expr.data_type().to_sql(), "TEXT[]");
/// ```
#[derive(Debug)]
pub struct AggregateOrderBy {
    target: Node,
    order_by: Node,
    data_type: DataType,
}

impl AggregateOrderBy {
    /// Creates the node. One term is stored as-is; two or more are wrapped
    /// in a comma list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArgumentCount`] when `order_by` is empty, or a
    /// coercion error if any argument is not an expression.
    pub fn new<T, I, A>(target: T, order_by: I) -> Result<Self>
    where
        T: Into<Argument>,
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        let target = coerce(Role::ExpressionElement, target)?;
        let mut terms = order_by
            .into_iter()
            .map(|term| coerce(Role::ExpressionElement, term))
            .collect::<Result<Vec<_>>>()?;
        let order_by = match terms.len() {
            0 => {
                return Err(Error::ArgumentCount(String::from(
                    "at least one ORDER BY element is required",
                )))
            }
            1 => terms.remove(0),
            _ => Node::new(ClauseList::comma(terms)),
        };
        let data_type = target.data_type();
        Ok(Self {
            target,
            order_by,
            data_type,
        })
    }

    /// Returns the aggregated expression.
    #[must_use]
    pub const fn target(&self) -> &Node {
        &self.target
    }

    /// Returns the ORDER BY term, or the list of terms.
    #[must_use]
    pub const fn order_by(&self) -> &Node {
        &self.order_by
    }
}

impl ClauseElement for AggregateOrderBy {
    fn visit_name(&self) -> &'static str {
        "aggregate_order_by"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("target", Traversal::Element(&self.target)),
            ("type", Traversal::Type(&self.data_type)),
            ("order_by", Traversal::Element(&self.order_by)),
        ]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            target: clone(&self.target),
            order_by: clone(&self.order_by),
            data_type: self.data_type.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn data_type(&self) -> DataType {
        self.data_type.clone()
    }

    fn is_column_element(&self) -> bool {
        true
    }

    // Unambiguous in any argument position.
    fn grouping_required(&self, _against: Option<Operator>) -> bool {
        false
    }
}

/// Shorthand for [`AggregateOrderBy::new`] returning a node.
///
/// # Errors
///
/// See [`AggregateOrderBy::new`].
pub fn aggregate_order_by<T, I, A>(target: T, order_by: I) -> Result<Node>
where
    T: Into<Argument>,
    I: IntoIterator<Item = A>,
    A: Into<Argument>,
{
    AggregateOrderBy::new(target, order_by).map(Node::new)
}

/// `array_agg(expr)` returning a PostgreSQL array of the argument's type.
///
/// # Errors
///
/// Returns a coercion error if `arg` is not an expression.
pub fn array_agg(arg: impl Into<Argument>) -> Result<Node> {
    array_agg_with([arg.into()], None, types::array)
}

/// `array_agg(expr)` with an explicit return type, used as given.
///
/// # Errors
///
/// Returns a coercion error if `arg` is not an expression.
pub fn array_agg_typed(arg: impl Into<Argument>, data_type: DataType) -> Result<Node> {
    array_agg_with([arg.into()], Some(data_type), types::array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlweave_core::element::{column, table_column, FromObject};

    fn stamp() -> Node {
        table_column("events", "stamp", DataType::Timestamp)
    }

    #[test]
    fn test_zero_terms_rejected() {
        let err = AggregateOrderBy::new(column("a"), Vec::<Node>::new()).unwrap_err();
        assert!(matches!(err, Error::ArgumentCount(_)));
    }

    #[test]
    fn test_single_term_is_not_wrapped() {
        let agg = AggregateOrderBy::new(column("a"), [stamp().desc()]).unwrap();
        assert_eq!(agg.order_by().visit_name(), "unary");
    }

    #[test]
    fn test_multiple_terms_keep_order() {
        let agg = AggregateOrderBy::new(column("a"), [column("x"), column("y"), column("z")])
            .unwrap();
        let list = agg.order_by().downcast_ref::<ClauseList>().unwrap();
        let names: Vec<Node> = vec![column("x"), column("y"), column("z")];
        assert_eq!(list.clauses, names);
    }

    #[test]
    fn test_type_and_children() {
        let node = aggregate_order_by(table_column("events", "kind", DataType::Text), [stamp()])
            .unwrap();
        assert_eq!(node.data_type(), DataType::Text);
        assert_eq!(node.get_children().len(), 2);
        assert_eq!(node.from_objects(), vec![FromObject::new("events")]);
        assert_eq!(node.clone().self_group(Some(Operator::Mul)).visit_name(), "aggregate_order_by");
    }

    #[test]
    fn test_clone_is_independent() {
        let node = aggregate_order_by(column("a"), [column("b"), column("c")]).unwrap();
        let copy = node.replace(&mut |n: &Node| {
            n.downcast_ref::<sqlweave_core::element::ColumnClause>()
                .filter(|c| c.name == "b")
                .map(|_| column("q"))
        });
        assert!(!copy.compare(&node));
        let original = node.downcast_ref::<AggregateOrderBy>().unwrap();
        let list = original.order_by().downcast_ref::<ClauseList>().unwrap();
        assert_eq!(list.clauses[0], column("b"));
    }

    #[test]
    fn test_array_agg_uses_postgres_array() {
        let agg = array_agg(table_column("t", "n", DataType::Integer)).unwrap();
        assert_eq!(agg.data_type(), types::array(DataType::Integer));

        let ordered = array_agg(aggregate_order_by(stamp(), [stamp()]).unwrap()).unwrap();
        assert_eq!(ordered.data_type(), types::array(DataType::Timestamp));

        let explicit = array_agg_typed(table_column("t", "n", DataType::Integer), DataType::Text)
            .unwrap();
        assert_eq!(explicit.data_type(), DataType::Text);

        let tags = table_column("t", "tags", types::array(DataType::Text));
        assert_eq!(
            array_agg(tags).unwrap().data_type(),
            types::array(DataType::Text)
        );
        assert_eq!(
            array_agg(column("x")).unwrap().data_type(),
            types::array(DataType::Null)
        );
    }

    #[test]
    fn test_array_flavours_have_distinct_cache_keys() {
        let postgres = array_agg(column("x")).unwrap();
        let generic = array_agg_with([Argument::from(column("x"))], None, DataType::array).unwrap();
        assert!(!postgres.compare(&generic));
        assert_ne!(postgres.cache_key(), generic.cache_key());
    }
}
