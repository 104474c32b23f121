//! Operators and ordering modifiers.

/// Operators joining or prefixing clause elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
    Not,

    // String
    Concat,
    Like,

    /// Full-text match (`@@`).
    Match,

    /// List separator.
    Comma,
}

impl Operator {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Concat => "||",
            Self::Like => "LIKE",
            Self::Match => "@@",
            Self::Comma => ",",
        }
    }

    /// Returns the precedence of the operator (higher = binds tighter).
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Comma => 0,
            Self::Or => 1,
            Self::And => 2,
            Self::Not => 3,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 4,
            Self::Like | Self::Match => 5,
            Self::Add | Self::Sub | Self::Concat => 8,
            Self::Mul | Self::Div | Self::Mod => 9,
        }
    }

    /// Returns whether the operator yields a boolean.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::NotEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
                | Self::And
                | Self::Or
                | Self::Not
                | Self::Like
                | Self::Match
        )
    }
}

/// Postfix modifiers used in ORDER BY terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
    /// `NULLS FIRST`
    NullsFirst,
    /// `NULLS LAST`
    NullsLast,
}

impl Modifier {
    /// Returns the SQL keyword(s) for the modifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::NullsFirst => "NULLS FIRST",
            Self::NullsLast => "NULLS LAST",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_precedence() {
        assert!(Operator::Mul.precedence() > Operator::Add.precedence());
        assert!(Operator::And.precedence() > Operator::Or.precedence());
        assert!(Operator::Eq.precedence() > Operator::And.precedence());
        assert!(Operator::Comma.precedence() < Operator::Or.precedence());
    }
}
