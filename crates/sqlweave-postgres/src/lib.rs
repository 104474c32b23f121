//! # sqlweave-postgres
//!
//! PostgreSQL-specific clause elements and compiler extensions for
//! `sqlweave-core`.
//!
//! # How PostgreSQL differs from other dialects
//!
//! - **[DISTINCT ON]**: PostgreSQL keeps the first row of each group of
//!   rows sharing the given expressions. [`distinct_on`] adds it to a
//!   [`Select`] as a syntax extension; repeated applications merge.
//! - **[Aggregate ORDER BY]**: ordered-set behaviour inside an aggregate
//!   call, as in `array_agg(x ORDER BY y)`. See [`aggregate_order_by`].
//! - **[Exclusion constraints]**: `EXCLUDE USING gist (...)` generalizes
//!   `UNIQUE` to arbitrary operators. See [`ExcludeConstraint`].
//! - **[Text search]**: the `to_tsvector` family accepts an optional
//!   leading `REGCONFIG` argument, which this crate types and casts
//!   explicitly. See [`functions`].
//! - **Placeholders**: bound parameters are numbered (`$1`, `$2`, ...).
//!
//! [DISTINCT ON]: https://www.postgresql.org/docs/current/sql-select.html#SQL-DISTINCT
//! [Aggregate ORDER BY]: https://www.postgresql.org/docs/current/sql-expressions.html#SYNTAX-AGGREGATES
//! [Exclusion constraints]: https://www.postgresql.org/docs/current/ddl-constraints.html#DDL-CONSTRAINTS-EXCLUSION
//! [Text search]: https://www.postgresql.org/docs/current/textsearch-controls.html
//! [`Select`]: sqlweave_core::select::Select
//!
//! ## Example
//!
//! ```rust
//! use sqlweave_core::element::table_column;
//! use sqlweave_core::select::Select;
//! use sqlweave_core::types::DataType;
//! use sqlweave_postgres::{distinct_on, PostgresDialect};
//!
//! let user_id = table_column("orders", "user_id", DataType::Integer);
//! let placed = table_column("orders", "placed", DataType::Timestamp);
//! let stmt = Select::new([user_id.clone(), placed.clone()])
//!     .ext(distinct_on([user_id.clone()]).unwrap())
//!     .unwrap()
//!     .order_by([user_id, placed.desc()])
//!     .unwrap();
//!
//! let dialect = PostgresDialect::new();
//! let compiled = dialect.compiler().compile(&stmt.into()).unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT DISTINCT ON (orders.user_id) orders.user_id, orders.placed FROM orders \
//!      ORDER BY orders.user_id, orders.placed DESC"
//! );
//! ```

pub mod aggregate;
mod dialect;
pub mod distinct_on;
pub mod exclude;
pub mod functions;
mod render;
pub mod types;

pub use aggregate::{aggregate_order_by, array_agg, AggregateOrderBy};
pub use dialect::PostgresDialect;
pub use distinct_on::{distinct_on, DistinctOnClause};
pub use exclude::{ExcludeConstraint, ExcludeOptions};
