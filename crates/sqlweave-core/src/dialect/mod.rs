//! SQL dialect support.
//!
//! Different databases have slightly different SQL syntax. A [`Dialect`]
//! tells the compiler how to spell the parts that vary: bound parameter
//! placeholders, identifier quoting and which optional clauses exist.

mod generic;

pub use generic::GenericDialect;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the placeholder for the bound parameter at `position`
    /// (1-based).
    fn placeholder(&self, _position: usize) -> String {
        String::from("?")
    }

    /// Returns whether the dialect renders `DISTINCT ON (...)`.
    fn supports_distinct_on(&self) -> bool {
        false
    }

    /// Returns whether `name` must be quoted to survive as an identifier.
    fn requires_quotes(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
        !valid_start
            || !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
            || is_reserved_word(name)
    }

    /// Quotes an identifier if necessary.
    fn quote_identifier(&self, name: &str) -> String {
        if !self.requires_quotes(name) {
            return String::from(name);
        }
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }
}

const RESERVED_WORDS: &[&str] = &[
    "all", "and", "any", "array", "as", "asc", "between", "by", "case", "cast", "check", "column",
    "constraint", "create", "default", "desc", "distinct", "else", "end", "exclude", "false",
    "for", "from", "group", "having", "in", "is", "join", "like", "limit", "not", "null",
    "offset", "on", "or", "order", "select", "table", "then", "to", "true", "union", "unique",
    "user", "using", "when", "where", "with",
];

fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.binary_search(&name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words_sorted() {
        let mut sorted = RESERVED_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, RESERVED_WORDS);
    }

    #[test]
    fn test_quote_identifier() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.quote_identifier("booking"), "booking");
        assert_eq!(dialect.quote_identifier("order"), "\"order\"");
        assert_eq!(dialect.quote_identifier("Room"), "\"Room\"");
        assert_eq!(dialect.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(dialect.quote_identifier("2nd"), "\"2nd\"");
    }
}
