//! The clause-element framework.
//!
//! Every node in a SQL construction tree implements [`ClauseElement`]. The
//! trait is small: a node names its kind ([`visit_name`]),
//! declares which of its attributes take part in structural identity
//! ([`traverse_internals`]), and knows how to copy itself given a function
//! that copies its children ([`clone_with`]). Structural comparison, cache
//! keys, tree walks and substitution are derived from those declarations by
//! [`Node`].
//!
//! New node kinds are added by implementing the trait in any crate; neither
//! the traversal helpers nor the compiler dispatch need to change.
//!
//! [`visit_name`]: ClauseElement::visit_name
//! [`traverse_internals`]: ClauseElement::traverse_internals
//! [`clone_with`]: ClauseElement::clone_with

mod elements;
mod operators;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

pub use elements::{
    asc, cast, column, desc, false_, literal, literal_column, null, table_column, text, true_,
    type_coerce, BinaryExpression, BindParameter, Cast, ClauseList, ColumnClause, Constant,
    ConstantKind, FunctionCall, Grouping, Label, TextClause, TypeCoerce, UnaryExpression,
};
pub use operators::{Modifier, Operator};

use crate::types::DataType;
use crate::value::SqlValue;

/// A table or other relation referenced somewhere in a clause tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FromObject {
    /// Optional schema qualifier.
    pub schema: Option<String>,
    /// Relation name.
    pub name: String,
}

impl FromObject {
    /// Creates an unqualified relation reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }
}

/// Describes how one attribute of a node takes part in tree walks,
/// structural comparison, cache keys and cloning.
#[derive(Debug, Clone, Copy)]
pub enum Traversal<'a> {
    /// A single child node.
    Element(&'a Node),
    /// A child node that may be absent.
    OptionalElement(Option<&'a Node>),
    /// An ordered list of child nodes.
    ElementList(&'a [Node]),
    /// A type tag.
    Type(&'a DataType),
    /// A string scalar.
    String(Option<&'a str>),
    /// A boolean flag.
    Boolean(bool),
    /// An integer scalar.
    Integer(Option<u64>),
    /// A mapping of string keys to string values.
    StringMap(&'a BTreeMap<String, String>),
    /// A literal value. Compared by value, anonymised in cache keys.
    Value(&'a SqlValue),
}

impl<'a> Traversal<'a> {
    /// Returns the child nodes this descriptor refers to.
    #[must_use]
    pub fn children(&self) -> Vec<&'a Node> {
        match *self {
            Self::Element(node) => vec![node],
            Self::OptionalElement(node) => node.into_iter().collect(),
            Self::ElementList(nodes) => nodes.iter().collect(),
            _ => Vec::new(),
        }
    }

    fn compare(&self, other: &Traversal<'_>) -> bool {
        match (self, other) {
            (Self::Element(a), Traversal::Element(b)) => a.compare(b),
            (Self::OptionalElement(a), Traversal::OptionalElement(b)) => match (a, b) {
                (Some(a), Some(b)) => a.compare(b),
                (None, None) => true,
                _ => false,
            },
            (Self::ElementList(a), Traversal::ElementList(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a.compare(b))
            }
            (Self::Type(a), Traversal::Type(b)) => a == b,
            (Self::String(a), Traversal::String(b)) => a == b,
            (Self::Boolean(a), Traversal::Boolean(b)) => a == b,
            (Self::Integer(a), Traversal::Integer(b)) => a == b,
            (Self::StringMap(a), Traversal::StringMap(b)) => a == b,
            (Self::Value(a), Traversal::Value(b)) => a == b,
            _ => false,
        }
    }

    fn write_cache_key(&self, out: &mut String) {
        match self {
            Self::Element(node) => node.write_cache_key(out),
            Self::OptionalElement(node) => match node {
                Some(node) => node.write_cache_key(out),
                None => out.push('-'),
            },
            Self::ElementList(nodes) => {
                out.push('[');
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    node.write_cache_key(out);
                }
                out.push(']');
            }
            Self::Type(ty) => out.push_str(&format!("{ty:?}")),
            Self::String(s) => match s {
                Some(s) => write_string_key(out, s),
                None => out.push('-'),
            },
            Self::Boolean(b) => out.push_str(if *b { "1" } else { "0" }),
            Self::Integer(n) => match n {
                Some(n) => out.push_str(&n.to_string()),
                None => out.push('-'),
            },
            Self::StringMap(map) => {
                out.push('{');
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_string_key(out, k);
                    out.push(':');
                    write_string_key(out, v);
                }
                out.push('}');
            }
            Self::Value(_) => out.push('?'),
        }
    }
}

// Length-prefixed, so quotes inside the text cannot end it early.
fn write_string_key(out: &mut String, s: &str) {
    out.push_str(&s.len().to_string());
    out.push('\'');
    out.push_str(s);
    out.push('\'');
}

/// The capability set shared by every node of a clause tree.
pub trait ClauseElement: fmt::Debug + Send + Sync + 'static {
    /// Stable node-kind tag used by compilers to pick a renderer.
    fn visit_name(&self) -> &'static str;

    /// Declares every attribute that takes part in structural identity.
    ///
    /// The list must name each such attribute exactly once and must not
    /// include anything else: an omitted attribute makes distinct trees share
    /// a cache key, and an extra one makes clones diverge from their source.
    fn traverse_internals(&self) -> Vec<(&'static str, Traversal<'_>)>;

    /// Produces a copy of this node, obtaining each child from `clone`.
    fn clone_with(&self, clone: &mut dyn FnMut(&Node) -> Node) -> Node;

    /// Upcast used for kind checks.
    fn as_any(&self) -> &dyn Any;

    /// The inferred SQL type of the expression.
    fn data_type(&self) -> DataType {
        DataType::Null
    }

    /// Whether the node yields a column-level expression.
    fn is_column_element(&self) -> bool {
        false
    }

    /// Whether the node must be parenthesized when placed under `against`.
    fn grouping_required(&self, _against: Option<Operator>) -> bool {
        false
    }

    /// Returns exactly the child nodes of this element.
    fn get_children(&self) -> Vec<&Node> {
        self.traverse_internals()
            .into_iter()
            .flat_map(|(_, traversal)| traversal.children())
            .collect()
    }

    /// Returns the relations referenced anywhere under this node.
    fn from_objects(&self) -> Vec<FromObject> {
        let mut froms = Vec::new();
        for child in self.get_children() {
            merge_froms(&mut froms, child.from_objects());
        }
        froms
    }
}

/// Appends `more` to `froms`, skipping relations already present.
pub fn merge_froms(froms: &mut Vec<FromObject>, more: Vec<FromObject>) {
    for from in more {
        if !froms.contains(&from) {
            froms.push(from);
        }
    }
}

/// An owned clause tree node.
///
/// `Clone` is a deep copy: the clone shares no children with its source.
pub struct Node(Box<dyn ClauseElement>);

impl Node {
    /// Wraps a clause element.
    #[must_use]
    pub fn new<E: ClauseElement>(element: E) -> Self {
        Self(Box::new(element))
    }

    /// Returns the wrapped element.
    #[must_use]
    pub fn element(&self) -> &dyn ClauseElement {
        self.0.as_ref()
    }

    /// Returns the node-kind tag.
    #[must_use]
    pub fn visit_name(&self) -> &'static str {
        self.0.visit_name()
    }

    /// Returns the inferred SQL type.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.0.data_type()
    }

    /// Whether the node yields a column-level expression.
    #[must_use]
    pub fn is_column_element(&self) -> bool {
        self.0.is_column_element()
    }

    /// Returns the child nodes.
    #[must_use]
    pub fn get_children(&self) -> Vec<&Self> {
        self.0.get_children()
    }

    /// Returns the relations referenced anywhere under this node.
    #[must_use]
    pub fn from_objects(&self) -> Vec<FromObject> {
        self.0.from_objects()
    }

    /// Downcasts to a concrete element type.
    #[must_use]
    pub fn downcast_ref<T: ClauseElement>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Returns whether the node is of the given element type.
    #[must_use]
    pub fn is<T: ClauseElement>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Returns this node, parenthesized if `against` requires it.
    #[must_use]
    pub fn self_group(self, against: Option<Operator>) -> Self {
        if self.0.grouping_required(against) {
            Self::new(Grouping::new(self))
        } else {
            self
        }
    }

    /// Compares two trees structurally, attribute by attribute.
    #[must_use]
    pub fn compare(&self, other: &Self) -> bool {
        if self.0.as_any().type_id() != other.0.as_any().type_id()
            || self.visit_name() != other.visit_name()
        {
            return false;
        }
        let left = self.0.traverse_internals();
        let right = other.0.traverse_internals();
        left.len() == right.len()
            && left
                .iter()
                .zip(right.iter())
                .all(|((ka, ta), (kb, tb))| ka == kb && ta.compare(tb))
    }

    /// Returns a key identifying the tree's structure.
    ///
    /// Trees differing only in bound literal values share a key, so the key
    /// can index compiled SQL.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut key = String::new();
        self.write_cache_key(&mut key);
        key
    }

    fn write_cache_key(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.visit_name());
        for (name, traversal) in self.0.traverse_internals() {
            out.push(' ');
            out.push_str(name);
            out.push('=');
            traversal.write_cache_key(out);
        }
        out.push(')');
    }

    /// Returns this node and all descendants in pre-order.
    #[must_use]
    pub fn iterate(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children = node.get_children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Copies the tree, substituting any node for which `replace` returns a
    /// replacement. Replaced nodes are not descended into.
    #[must_use]
    pub fn replace<F>(&self, replace: &mut F) -> Self
    where
        F: FnMut(&Self) -> Option<Self>,
    {
        if let Some(replacement) = replace(self) {
            return replacement;
        }
        self.0
            .clone_with(&mut |child: &Self| child.replace(&mut *replace))
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        self.0.clone_with(&mut |child: &Self| child.clone())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}
