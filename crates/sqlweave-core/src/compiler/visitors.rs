//! Renderers for the node kinds defined in this crate.

use super::{downcast, downcast_constraint, SqlCompiler};
use crate::element::{
    BinaryExpression, BindParameter, Cast, ClauseList, ColumnClause, Constant, ConstantKind,
    FunctionCall, Grouping, Label, Node, Operator, TextClause, TypeCoerce, UnaryExpression,
};
use crate::error::Result;
use crate::schema::{CheckConstraint, SchemaConstraint};
use crate::select::{ExtensionPoint, Select, StatementHint};

pub(super) fn visit_column(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let column = downcast::<ColumnClause>(node)?;
    if column.is_literal {
        return Ok(column.name.clone());
    }
    let name = compiler.quote(&column.name);
    match &column.table {
        Some(table) if !compiler.in_ddl() => Ok(format!("{}.{name}", compiler.from_object(table))),
        _ => Ok(name),
    }
}

pub(super) fn visit_bindparam(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let bind = downcast::<BindParameter>(node)?;
    Ok(compiler.bind(&bind.value))
}

pub(super) fn visit_textclause(_compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    Ok(downcast::<TextClause>(node)?.text.clone())
}

pub(super) fn visit_constant(_compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let keyword = match downcast::<Constant>(node)?.kind {
        ConstantKind::Null => "NULL",
        ConstantKind::True => "TRUE",
        ConstantKind::False => "FALSE",
    };
    Ok(String::from(keyword))
}

pub(super) fn visit_binary(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let binary = downcast::<BinaryExpression>(node)?;
    let left = compiler.process(&binary.left)?;
    let right = compiler.process(&binary.right)?;
    Ok(match binary.operator {
        Operator::Comma => format!("{left}, {right}"),
        op => format!("{left} {} {right}", op.as_str()),
    })
}

pub(super) fn visit_unary(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let unary = downcast::<UnaryExpression>(node)?;
    let mut sql = compiler.process(&unary.element)?;
    if let Some(op) = unary.operator {
        sql = format!("{} {sql}", op.as_str());
    }
    if let Some(modifier) = unary.modifier {
        sql.push(' ');
        sql.push_str(modifier.as_str());
    }
    Ok(sql)
}

pub(super) fn visit_clauselist(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let list = downcast::<ClauseList>(node)?;
    let separator = match list.operator {
        Operator::Comma => String::from(", "),
        op => format!(" {} ", op.as_str()),
    };
    compiler.process_list(&list.clauses, &separator)
}

pub(super) fn visit_grouping(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let grouping = downcast::<Grouping>(node)?;
    Ok(format!("({})", compiler.process(&grouping.element)?))
}

pub(super) fn visit_function(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let call = downcast::<FunctionCall>(node)?;
    let args = compiler.process_list(&call.arguments, ", ")?;
    Ok(format!("{}({args})", call.name))
}

pub(super) fn visit_cast(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let cast = downcast::<Cast>(node)?;
    let element = compiler.process(&cast.element)?;
    Ok(format!("CAST({element} AS {})", cast.data_type.to_sql()))
}

pub(super) fn visit_type_coerce(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    compiler.process(&downcast::<TypeCoerce>(node)?.element)
}

pub(super) fn visit_label(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let label = downcast::<Label>(node)?;
    let element = compiler.process(&label.element)?;
    Ok(format!("{element} AS {}", compiler.quote(&label.name)))
}

pub(super) fn visit_statement_hint(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    compiler.process(downcast::<StatementHint>(node)?.hint())
}

fn extension_point(
    compiler: &mut SqlCompiler<'_>,
    select: &Select,
    point: ExtensionPoint,
    sql: &mut String,
) -> Result<()> {
    for node in select.extension_point(point) {
        let rendered = compiler.process(node)?;
        match point {
            ExtensionPoint::PreColumns => {
                sql.push_str(&rendered);
                sql.push(' ');
            }
            ExtensionPoint::PostCriteria | ExtensionPoint::PostBody => {
                sql.push(' ');
                sql.push_str(&rendered);
            }
        }
    }
    Ok(())
}

pub(super) fn visit_select(compiler: &mut SqlCompiler<'_>, node: &Node) -> Result<String> {
    let select = downcast::<Select>(node)?;
    let mut sql = String::from("SELECT ");

    if !select.distinct_on_terms().is_empty() && compiler.dialect().supports_distinct_on() {
        let terms = compiler.process_list(select.distinct_on_terms(), ", ")?;
        sql.push_str(&format!("DISTINCT ON ({terms}) "));
    } else if select.is_distinct() {
        sql.push_str("DISTINCT ");
    }
    extension_point(compiler, select, ExtensionPoint::PreColumns, &mut sql)?;

    if select.selected_columns().is_empty() {
        sql.push('*');
    } else {
        sql.push_str(&compiler.process_list(select.selected_columns(), ", ")?);
    }

    let froms = select.froms();
    if !froms.is_empty() {
        let froms: Vec<String> = froms.iter().map(|f| compiler.from_object(f)).collect();
        sql.push_str(" FROM ");
        sql.push_str(&froms.join(", "));
    }

    if let Some(criterion) = select.where_criteria() {
        sql.push_str(" WHERE ");
        sql.push_str(&compiler.process(criterion)?);
    }
    extension_point(compiler, select, ExtensionPoint::PostCriteria, &mut sql)?;

    if !select.group_by_terms().is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&compiler.process_list(select.group_by_terms(), ", ")?);
    }

    if !select.order_by_terms().is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&compiler.process_list(select.order_by_terms(), ", ")?);
    }

    if let Some(limit) = select.limit_value() {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    if let Some(offset) = select.offset_value() {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
    extension_point(compiler, select, ExtensionPoint::PostBody, &mut sql)?;

    Ok(sql)
}

pub(super) fn visit_check_constraint(
    compiler: &mut SqlCompiler<'_>,
    constraint: &dyn SchemaConstraint,
) -> Result<String> {
    let check = downcast_constraint::<CheckConstraint>(constraint)?;
    let mut sql = String::new();
    if let Some(name) = check.name() {
        sql.push_str(&format!("CONSTRAINT {} ", compiler.quote(name)));
    }
    sql.push_str(&format!("CHECK ({})", compiler.process(check.sqltext())?));
    Ok(sql)
}
