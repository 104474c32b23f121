//! PostgreSQL dialect implementation.

use sqlweave_core::compiler::{Renderers, SqlCompiler};
use sqlweave_core::dialect::Dialect;

use crate::render;

/// PostgreSQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the core renderers plus the PostgreSQL node kinds.
    #[must_use]
    pub fn renderers() -> Renderers {
        let mut renderers = Renderers::core();
        renderers.register("aggregate_order_by", render::visit_aggregate_order_by);
        renderers.register("postgresql_distinct_on", render::visit_distinct_on);
        renderers.register("bindparam", render::visit_bindparam);
        renderers.register_constraint("exclude_constraint", render::visit_exclude_constraint);
        renderers
    }

    /// Returns a compiler for this dialect.
    #[must_use]
    pub fn compiler(&self) -> SqlCompiler<'_> {
        SqlCompiler::new(self, Self::renderers())
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn placeholder(&self, position: usize) -> String {
        format!("${position}")
    }

    fn supports_distinct_on(&self) -> bool {
        true
    }
}
