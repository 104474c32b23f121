//! PostgreSQL-specific data types.

use sqlweave_core::types::DataType;

/// Dialect tag carried by PostgreSQL array types.
pub const DIALECT: &str = "postgresql";

/// `REGCONFIG`: a text search configuration name.
#[must_use]
pub fn regconfig() -> DataType {
    DataType::custom("REGCONFIG")
}

/// `TSVECTOR`: a preprocessed document.
#[must_use]
pub fn tsvector() -> DataType {
    DataType::custom("TSVECTOR")
}

/// `TSQUERY`: a text search query.
#[must_use]
pub fn tsquery() -> DataType {
    DataType::custom("TSQUERY")
}

/// A PostgreSQL `ARRAY` of `item`.
#[must_use]
pub fn array(item: DataType) -> DataType {
    DataType::Array {
        item: Box::new(item),
        dialect: Some(DIALECT),
    }
}

/// Returns whether `data_type` is in the `TSQUERY` family.
#[must_use]
pub fn is_tsquery(data_type: &DataType) -> bool {
    data_type.affinity() == tsquery()
}

/// Returns whether `data_type` is in the `REGCONFIG` family.
#[must_use]
pub fn is_regconfig(data_type: &DataType) -> bool {
    data_type.affinity() == regconfig()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_search_types() {
        assert_eq!(regconfig().to_sql(), "REGCONFIG");
        assert!(is_tsquery(&DataType::custom("tsquery")));
        assert!(!is_tsquery(&tsvector()));
        assert!(is_regconfig(&regconfig()));
    }

    #[test]
    fn test_array_is_postgres_flavoured() {
        let ty = array(DataType::Text);
        assert_eq!(ty.to_sql(), "TEXT[]");
        assert_ne!(ty, DataType::array(DataType::Text));
    }
}
