//! Renderers for the PostgreSQL node kinds.

use sqlweave_core::compiler::{downcast, downcast_constraint, SqlCompiler};
use sqlweave_core::element::{BindParameter, ColumnClause, Node};
use sqlweave_core::error::Result;
use sqlweave_core::schema::SchemaConstraint;

use crate::aggregate::AggregateOrderBy;
use crate::distinct_on::DistinctOnClause;
use crate::exclude::ExcludeConstraint;
use crate::types::is_regconfig;

pub(super) fn visit_aggregate_order_by(
    compiler: &mut SqlCompiler<'_>,
    node: &Node,
) -> Result<String> {
    let agg = downcast::<AggregateOrderBy>(node)?;
    let target = compiler.process(agg.target())?;
    let order_by = compiler.process(agg.order_by())?;
    Ok(format!("{target} ORDER BY {order_by}"))
}

pub(super) fn visit_distinct_on(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let clause = downcast::<DistinctOnClause>(node)?;
    Ok(format!("ON ({})", compiler.process_list(clause.terms(), ", ")?))
}

/// Bound parameters typed `REGCONFIG` carry an explicit cast.
pub(super) fn visit_bindparam(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let bind = downcast::<BindParameter>(node)?;
    let rendered = compiler.bind(&bind.value);
    if is_regconfig(&bind.data_type) {
        Ok(format!("{rendered}::{}", bind.data_type.to_sql()))
    } else {
        Ok(rendered)
    }
}

fn exclude_element(
    compiler: &mut SqlCompiler<'_>,
    constraint: &ExcludeConstraint,
    expression: &Node,
) -> Result<String> {
    let rendered = compiler.process(expression)?;
    let mut sql = match expression.visit_name() {
        "binary" | "unary" | "clauselist" => format!("({rendered})"),
        _ => rendered,
    };
    let opclass = expression
        .downcast_ref::<ColumnClause>()
        .filter(|c| !c.is_literal)
        .and_then(|c| constraint.ops().get(&c.name));
    if let Some(opclass) = opclass {
        sql.push(' ');
        sql.push_str(opclass);
    }
    Ok(sql)
}

pub(super) fn visit_exclude_constraint(
    compiler: &mut SqlCompiler<'_>,
    constraint: &dyn SchemaConstraint,
) -> Result<String> {
    let exclude = downcast_constraint::<ExcludeConstraint>(constraint)?;
    let mut elements = Vec::with_capacity(exclude.elements().len());
    for element in exclude.elements() {
        let expression = match element.expression().as_node() {
            Some(node) => exclude_element(compiler, exclude, node)?,
            // unattached: render the name as given
            None => compiler.quote(element.expression().pending_name().unwrap_or_default()),
        };
        elements.push(format!("{expression} WITH {}", element.operator()));
    }

    let mut sql = String::new();
    if let Some(name) = exclude.name() {
        sql.push_str(&format!("CONSTRAINT {} ", compiler.quote(name)));
    }
    sql.push_str(&format!(
        "EXCLUDE USING {} ({})",
        exclude.using().to_ascii_lowercase(),
        elements.join(", ")
    ));
    if let Some(predicate) = exclude.where_clause() {
        sql.push_str(&format!(" WHERE ({})", compiler.process(predicate)?));
    }
    match exclude.deferrable() {
        Some(true) => sql.push_str(" DEFERRABLE"),
        Some(false) => sql.push_str(" NOT DEFERRABLE"),
        None => {}
    }
    if let Some(initially) = exclude.initially() {
        sql.push_str(&format!(" INITIALLY {initially}"));
    }
    Ok(sql)
}
