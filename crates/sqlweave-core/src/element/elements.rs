//! Core clause element kinds and their builder functions.

use std::any::Any;

use super::{ClauseElement, FromObject, Modifier, Node, Operator, Traversal};
use crate::types::DataType;
use crate::value::{SqlValue, ToSqlValue};

/// Creates an unbound column reference.
#[must_use]
pub fn column(name: &str) -> Node {
    Node::new(ColumnClause {
        name: String::from(name),
        table: None,
        data_type: DataType::Null,
        is_literal: false,
    })
}

/// Creates a column reference bound to a table.
#[must_use]
pub fn table_column(table: &str, name: &str, data_type: DataType) -> Node {
    Node::new(ColumnClause {
        name: String::from(name),
        table: Some(FromObject::new(table)),
        data_type,
        is_literal: false,
    })
}

/// Creates a column whose text is rendered verbatim.
///
/// **Warning**: Only use this for SQL fragments that don't contain user input.
#[must_use]
pub fn literal_column(text: &str) -> Node {
    Node::new(ColumnClause {
        name: String::from(text),
        table: None,
        data_type: DataType::Null,
        is_literal: true,
    })
}

/// Creates a bound literal value.
#[must_use]
pub fn literal<T: ToSqlValue>(value: T) -> Node {
    Node::new(BindParameter::new(None, value.to_sql_value(), None))
}

/// Creates a raw SQL text fragment.
///
/// **Warning**: Only use this for SQL fragments that don't contain user input.
#[must_use]
pub fn text(sql: &str) -> Node {
    Node::new(TextClause {
        text: String::from(sql),
    })
}

/// The `NULL` keyword.
#[must_use]
pub fn null() -> Node {
    Node::new(Constant {
        kind: ConstantKind::Null,
    })
}

/// The `TRUE` keyword.
#[must_use]
pub fn true_() -> Node {
    Node::new(Constant {
        kind: ConstantKind::True,
    })
}

/// The `FALSE` keyword.
#[must_use]
pub fn false_() -> Node {
    Node::new(Constant {
        kind: ConstantKind::False,
    })
}

/// Applies `ASC` to an ORDER BY term.
#[must_use]
pub fn asc(element: Node) -> Node {
    element.asc()
}

/// Applies `DESC` to an ORDER BY term.
#[must_use]
pub fn desc(element: Node) -> Node {
    element.desc()
}

/// Creates a `CAST(element AS data_type)` expression.
#[must_use]
pub fn cast(element: Node, data_type: DataType) -> Node {
    Node::new(Cast {
        element,
        data_type,
    })
}

/// Re-types an expression without changing the rendered SQL.
#[must_use]
pub fn type_coerce(element: Node, data_type: DataType) -> Node {
    Node::new(TypeCoerce {
        element,
        data_type,
    })
}

// Expression operators

impl Node {
    /// Joins this expression and `right` with a binary operator.
    #[must_use]
    pub fn op(self, operator: Operator, right: Self) -> Self {
        Self::new(BinaryExpression::new(self, operator, right))
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.op(Operator::Eq, right)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq(self, right: Self) -> Self {
        self.op(Operator::NotEq, right)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.op(Operator::Lt, right)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.op(Operator::Gt, right)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.op(Operator::And, right)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.op(Operator::Or, right)
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like(self, pattern: Self) -> Self {
        self.op(Operator::Like, pattern)
    }

    /// Creates a full-text match (`@@`) expression.
    #[must_use]
    pub fn matches(self, query: Self) -> Self {
        self.op(Operator::Match, query)
    }

    /// Negates the expression with NOT.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::new(UnaryExpression {
            element: self.self_group(Some(Operator::Not)),
            operator: Some(Operator::Not),
            modifier: None,
        })
    }

    /// Applies `ASC`.
    #[must_use]
    pub fn asc(self) -> Self {
        self.modified(Modifier::Asc)
    }

    /// Applies `DESC`.
    #[must_use]
    pub fn desc(self) -> Self {
        self.modified(Modifier::Desc)
    }

    /// Applies `NULLS FIRST`.
    #[must_use]
    pub fn nulls_first(self) -> Self {
        self.modified(Modifier::NullsFirst)
    }

    /// Applies `NULLS LAST`.
    #[must_use]
    pub fn nulls_last(self) -> Self {
        self.modified(Modifier::NullsLast)
    }

    fn modified(self, modifier: Modifier) -> Self {
        Self::new(UnaryExpression {
            element: self,
            operator: None,
            modifier: Some(modifier),
        })
    }

    /// Labels the expression (`expr AS name`).
    #[must_use]
    pub fn label(self, name: &str) -> Self {
        Self::new(Label {
            name: String::from(name),
            element: self,
        })
    }
}

/// A column reference, optionally bound to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnClause {
    /// Column name (or verbatim SQL text for literal columns).
    pub name: String,
    /// Owning relation, if bound.
    pub table: Option<FromObject>,
    /// Column type.
    pub data_type: DataType,
    /// Whether `name` is rendered verbatim.
    pub is_literal: bool,
}

impl ColumnClause {
    /// Returns the owning table name, if bound.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.table.as_ref().map(|t| t.name.as_str())
    }
}

impl ClauseElement for ColumnClause {
    fn visit_name(&self) -> &'static str {
        "column"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("name", Traversal::String(Some(&self.name))),
            (
                "table",
                Traversal::String(self.table.as_ref().map(|t| t.name.as_str())),
            ),
            (
                "schema",
                Traversal::String(self.table.as_ref().and_then(|t| t.schema.as_deref())),
            ),
            ("type", Traversal::Type(&self.data_type)),
            ("is_literal", Traversal::Boolean(self.is_literal)),
        ]
    }

    fn clone_with(&self, _clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(self.clone())
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

    fn from_objects(&self) -> Vec<FromObject> {
        self.table.iter().cloned().collect()
    }
}

/// A literal value sent to the database as a bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct BindParameter {
    /// Optional parameter name.
    pub key: Option<String>,
    /// The value.
    pub value: SqlValue,
    /// The parameter type.
    pub data_type: DataType,
}

impl BindParameter {
    /// Creates a bound parameter, inferring the type from the value unless
    /// `data_type` is given.
    #[must_use]
    pub fn new(key: Option<String>, value: SqlValue, data_type: Option<DataType>) -> Self {
        let data_type = data_type.unwrap_or_else(|| value.data_type());
        Self {
            key,
            value,
            data_type,
        }
    }
}

impl ClauseElement for BindParameter {
    fn visit_name(&self) -> &'static str {
        "bindparam"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("key", Traversal::String(self.key.as_deref())),
            ("type", Traversal::Type(&self.data_type)),
            ("value", Traversal::Value(&self.value)),
        ]
    }

    fn clone_with(&self, _clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(self.clone())
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
}

/// A raw SQL fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextClause {
    /// The SQL text.
    pub text: String,
}

impl ClauseElement for TextClause {
    fn visit_name(&self) -> &'static str {
        "textclause"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![("text", Traversal::String(Some(&self.text)))]
    }

    fn clone_with(&self, _clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn grouping_required(&self, against: Option<Operator>) -> bool {
        against.is_some_and(|op| op != Operator::Comma)
    }
}

/// The SQL keyword constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantKind {
    /// `NULL`
    Null,
    /// `TRUE`
    True,
    /// `FALSE`
    False,
}

/// A keyword constant (`NULL`, `TRUE`, `FALSE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant {
    /// Which keyword.
    pub kind: ConstantKind,
}

impl ClauseElement for Constant {
    fn visit_name(&self) -> &'static str {
        match self.kind {
            ConstantKind::Null => "null",
            ConstantKind::True => "true",
            ConstantKind::False => "false",
        }
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        Vec::new()
    }

    fn clone_with(&self, _clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn data_type(&self) -> DataType {
        match self.kind {
            ConstantKind::Null => DataType::Null,
            ConstantKind::True | ConstantKind::False => DataType::Boolean,
        }
    }

    fn is_column_element(&self) -> bool {
        true
    }
}

/// Two expressions joined by an operator.
#[derive(Debug)]
pub struct BinaryExpression {
    /// Left operand.
    pub left: Node,
    /// Operator.
    pub operator: Operator,
    /// Right operand.
    pub right: Node,
    data_type: DataType,
}

impl BinaryExpression {
    /// Creates a binary expression, grouping either operand that binds
    /// looser than `operator`.
    #[must_use]
    pub fn new(left: Node, operator: Operator, right: Node) -> Self {
        let data_type = if operator.is_comparison() {
            DataType::Boolean
        } else {
            left.data_type()
        };
        Self {
            left: left.self_group(Some(operator)),
            operator,
            right: right.self_group(Some(operator)),
            data_type,
        }
    }
}

impl ClauseElement for BinaryExpression {
    fn visit_name(&self) -> &'static str {
        "binary"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("left", Traversal::Element(&self.left)),
            ("operator", Traversal::String(Some(self.operator.as_str()))),
            ("right", Traversal::Element(&self.right)),
            ("type", Traversal::Type(&self.data_type)),
        ]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            left: clone(&self.left),
            operator: self.operator,
            right: clone(&self.right),
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

    fn grouping_required(&self, against: Option<Operator>) -> bool {
        against.is_some_and(|op| op.precedence() > self.operator.precedence())
    }
}

/// A prefix operator or a postfix ORDER BY modifier applied to an
/// expression.
#[derive(Debug)]
pub struct UnaryExpression {
    /// The operand.
    pub element: Node,
    /// Prefix operator, if any.
    pub operator: Option<Operator>,
    /// Postfix modifier, if any.
    pub modifier: Option<Modifier>,
}

impl ClauseElement for UnaryExpression {
    fn visit_name(&self) -> &'static str {
        "unary"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("element", Traversal::Element(&self.element)),
            (
                "operator",
                Traversal::String(self.operator.as_ref().map(Operator::as_str)),
            ),
            (
                "modifier",
                Traversal::String(self.modifier.as_ref().map(Modifier::as_str)),
            ),
        ]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            element: clone(&self.element),
            operator: self.operator,
            modifier: self.modifier,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn data_type(&self) -> DataType {
        if self.operator == Some(Operator::Not) {
            DataType::Boolean
        } else {
            self.element.data_type()
        }
    }

    fn is_column_element(&self) -> bool {
        true
    }

    fn grouping_required(&self, against: Option<Operator>) -> bool {
        self.modifier.is_none()
            && against.is_some_and(|op| {
                self.operator
                    .is_some_and(|own| op.precedence() > own.precedence())
            })
    }
}

/// An ordered list of clauses joined by an operator (a comma by default).
#[derive(Debug)]
pub struct ClauseList {
    /// The clauses, in order.
    pub clauses: Vec<Node>,
    /// The joining operator.
    pub operator: Operator,
}

impl ClauseList {
    /// Creates a comma-separated list.
    #[must_use]
    pub fn comma(clauses: Vec<Node>) -> Self {
        Self {
            clauses,
            operator: Operator::Comma,
        }
    }

    /// Returns the number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl ClauseElement for ClauseList {
    fn visit_name(&self) -> &'static str {
        "clauselist"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("clauses", Traversal::ElementList(&self.clauses)),
            ("operator", Traversal::String(Some(self.operator.as_str()))),
        ]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            clauses: self.clauses.iter().map(|c| clone(c)).collect(),
            operator: self.operator,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn grouping_required(&self, against: Option<Operator>) -> bool {
        self.clauses.len() > 1
            && against.is_some_and(|op| op.precedence() > self.operator.precedence())
    }
}

/// A parenthesized expression.
#[derive(Debug)]
pub struct Grouping {
    /// The wrapped expression.
    pub element: Node,
}

impl Grouping {
    /// Wraps `element` in parentheses.
    #[must_use]
    pub const fn new(element: Node) -> Self {
        Self { element }
    }
}

impl ClauseElement for Grouping {
    fn visit_name(&self) -> &'static str {
        "grouping"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![("element", Traversal::Element(&self.element))]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self::new(clone(&self.element)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn data_type(&self) -> DataType {
        self.element.data_type()
    }

    fn is_column_element(&self) -> bool {
        self.element.is_column_element()
    }
}

/// A SQL function call.
#[derive(Debug)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Arguments, in order.
    pub arguments: Vec<Node>,
    /// Return type.
    pub data_type: DataType,
}

impl FunctionCall {
    /// Creates a function call.
    #[must_use]
    pub fn new(name: &str, arguments: Vec<Node>, data_type: DataType) -> Self {
        Self {
            name: String::from(name),
            arguments,
            data_type,
        }
    }
}

impl ClauseElement for FunctionCall {
    fn visit_name(&self) -> &'static str {
        "function"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("name", Traversal::String(Some(&self.name))),
            ("arguments", Traversal::ElementList(&self.arguments)),
            ("type", Traversal::Type(&self.data_type)),
        ]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            name: self.name.clone(),
            arguments: self.arguments.iter().map(|a| clone(a)).collect(),
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
}

/// `CAST(element AS type)`.
#[derive(Debug)]
pub struct Cast {
    /// The expression being cast.
    pub element: Node,
    /// Target type.
    pub data_type: DataType,
}

impl ClauseElement for Cast {
    fn visit_name(&self) -> &'static str {
        "cast"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("element", Traversal::Element(&self.element)),
            ("type", Traversal::Type(&self.data_type)),
        ]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            element: clone(&self.element),
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
}

/// An expression carrying an overridden type; renders as the inner
/// expression.
#[derive(Debug)]
pub struct TypeCoerce {
    /// The re-typed expression.
    pub element: Node,
    /// The overriding type.
    pub data_type: DataType,
}

impl ClauseElement for TypeCoerce {
    fn visit_name(&self) -> &'static str {
        "type_coerce"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("element", Traversal::Element(&self.element)),
            ("type", Traversal::Type(&self.data_type)),
        ]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            element: clone(&self.element),
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

    fn grouping_required(&self, against: Option<Operator>) -> bool {
        self.element.element().grouping_required(against)
    }
}

/// `element AS name`.
#[derive(Debug)]
pub struct Label {
    /// The label.
    pub name: String,
    /// The labelled expression.
    pub element: Node,
}

impl ClauseElement for Label {
    fn visit_name(&self) -> &'static str {
        "label"
    }

    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)> {
        vec![
            ("name", Traversal::String(Some(&self.name))),
            ("element", Traversal::Element(&self.element)),
        ]
    }

    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node {
        Node::new(Self {
            name: self.name.clone(),
            element: clone(&self.element),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn data_type(&self) -> DataType {
        self.element.data_type()
    }

    fn is_column_element(&self) -> bool {
        true
    }
}
