//! SQL data type definitions.

use core::fmt;

/// SQL data types carried by clause elements.
///
/// Types drive coercion and rendering decisions: a bound literal picks up the
/// type of the role it was coerced into, and functions derive their return
/// type from their arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Unknown or untyped (the type of a bare `NULL`).
    Null,

    // Integer types
    /// Small integer (2 bytes).
    Smallint,
    /// Integer (4 bytes).
    Integer,
    /// Big integer (8 bytes).
    Bigint,

    // Floating point
    /// Real (4-byte float).
    Real,
    /// Double precision (8-byte float).
    Double,
    /// Numeric with precision and scale.
    Numeric {
        /// Total number of digits.
        precision: Option<u16>,
        /// Number of digits after decimal point.
        scale: Option<u16>,
    },

    // String types
    /// Fixed-length character string.
    Char(Option<u32>),
    /// Variable-length character string.
    Varchar(Option<u32>),
    /// Text (variable length, no limit).
    Text,

    /// Binary large object.
    Blob,

    // Date/time types
    /// Date.
    Date,
    /// Time.
    Time,
    /// Timestamp.
    Timestamp,

    /// Boolean.
    Boolean,

    /// Array of another type.
    Array {
        /// Element type.
        item: Box<DataType>,
        /// Dialect that owns this array flavour, if any.
        dialect: Option<&'static str>,
    },

    /// Database-specific type, identified by its SQL name.
    Custom(String),
}

impl DataType {
    /// Creates a generic array type.
    #[must_use]
    pub fn array(item: Self) -> Self {
        Self::Array {
            item: Box::new(item),
            dialect: None,
        }
    }

    /// Creates a database-specific type from its SQL name.
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// Returns the type family used for structural type comparisons.
    ///
    /// Sized variants collapse onto their unsized family, so `VARCHAR(20)`
    /// and `TEXT` share an affinity.
    #[must_use]
    pub fn affinity(&self) -> Self {
        match self {
            Self::Smallint | Self::Integer | Self::Bigint => Self::Integer,
            Self::Real | Self::Double | Self::Numeric { .. } => Self::Numeric {
                precision: None,
                scale: None,
            },
            Self::Char(_) | Self::Varchar(_) | Self::Text => Self::Text,
            Self::Array { item, dialect } => Self::Array {
                item: Box::new(item.affinity()),
                dialect: *dialect,
            },
            Self::Custom(name) => Self::Custom(name.to_ascii_uppercase()),
            other => other.clone(),
        }
    }

    /// Returns whether this is the untyped `NULL` type.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the SQL representation of the data type.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Smallint => String::from("SMALLINT"),
            Self::Integer => String::from("INTEGER"),
            Self::Bigint => String::from("BIGINT"),
            Self::Real => String::from("REAL"),
            Self::Double => String::from("DOUBLE PRECISION"),
            Self::Numeric { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => format!("NUMERIC({p}, {s})"),
                (Some(p), None) => format!("NUMERIC({p})"),
                _ => String::from("NUMERIC"),
            },
            Self::Char(len) => match len {
                Some(n) => format!("CHAR({n})"),
                None => String::from("CHAR"),
            },
            Self::Varchar(len) => match len {
                Some(n) => format!("VARCHAR({n})"),
                None => String::from("VARCHAR"),
            },
            Self::Text => String::from("TEXT"),
            Self::Blob => String::from("BLOB"),
            Self::Date => String::from("DATE"),
            Self::Time => String::from("TIME"),
            Self::Timestamp => String::from("TIMESTAMP"),
            Self::Boolean => String::from("BOOLEAN"),
            Self::Array { item, .. } => format!("{}[]", item.to_sql()),
            Self::Custom(name) => name.clone(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
