//! Error types for clause construction, attachment and compilation.

use crate::coercion::Role;

/// Errors raised while building, attaching or compiling clause elements.
///
/// Every variant is a caller error: nothing here is retried internally, and
/// the same inputs always produce the same failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A construct received the wrong number of arguments.
    #[error("{0}")]
    ArgumentCount(String),

    /// A value could not be coerced into a node satisfying a role.
    #[error("cannot coerce {found} for {role}: {message}")]
    Coercion {
        /// The role that was requested.
        role: Role,
        /// Short description of the rejected input.
        found: String,
        /// Why the input was rejected.
        message: String,
    },

    /// Two mutually exclusive statement extensions were combined.
    #[error("conflicting statement options: {0}")]
    Conflict(String),

    /// A column name could not be resolved against a table.
    #[error("table '{table}' has no column named '{column}'")]
    ColumnNotFound {
        /// The table that was searched.
        table: String,
        /// The missing column name.
        column: String,
    },

    /// A schema item was attached to a second parent.
    #[error("constraint is already attached to table '{table}'")]
    AlreadyAttached {
        /// The table the item is already attached to.
        table: String,
    },

    /// An argument is structurally invalid for the construct receiving it.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The compiler has no renderer for a node kind.
    #[error("no renderer registered for '{0}'")]
    Unsupported(String),
}

/// Result type alias for sqlweave operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::ColumnNotFound {
            table: String::from("booking"),
            column: String::from("room"),
        };
        assert_eq!(err.to_string(), "table 'booking' has no column named 'room'");

        let err = Error::Coercion {
            role: Role::ByOf,
            found: String::from("integer literal"),
            message: String::from("expected a column expression"),
        };
        assert_eq!(
            err.to_string(),
            "cannot coerce integer literal for ORDER BY/OF role: expected a column expression"
        );
    }
}
