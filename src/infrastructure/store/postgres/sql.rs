//! Predicate and row rendering onto `sqlx::QueryBuilder`. Column names come
//! from the entities' `Column` enums and are checked against the kind before
//! they are pushed; every value is bound.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::persistence::{
    ColumnName, CompareOp, EntityKind, FieldValue, Predicate, Query,
};
use crate::infrastructure::store::column_exists;
use sqlx::{Postgres, QueryBuilder};

/// Join table backing a list-valued column.
pub(super) struct Membership {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub member_column: &'static str,
}

pub(super) fn membership(kind: EntityKind, column: ColumnName) -> Option<Membership> {
    match (kind, column) {
        (EntityKind::Article, "tags") => Some(Membership {
            table: "article_tags",
            owner_column: "article_id",
            member_column: "tag_id",
        }),
        _ => None,
    }
}

fn checked(kind: EntityKind, column: ColumnName) -> DomainResult<ColumnName> {
    if column_exists(kind, column) && membership(kind, column).is_none() {
        Ok(column)
    } else {
        Err(DomainError::persistence(format!(
            "`{column}` is not a stored {kind} column"
        )))
    }
}

pub(super) fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Null => {
            builder.push("NULL");
        }
        FieldValue::Bool(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Int(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Text(v) => {
            builder.push_bind(v.clone());
        }
        FieldValue::Uuid(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Timestamp(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Date(v) => {
            builder.push_bind(*v);
        }
        FieldValue::UuidList(v) => {
            builder.push_bind(v.clone());
        }
    }
}

const fn operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq | CompareOp::EqIgnoreCase => " = ",
        CompareOp::Ne => " <> ",
        CompareOp::Lt => " < ",
        CompareOp::Le => " <= ",
        CompareOp::Gt => " > ",
        CompareOp::Ge => " >= ",
    }
}

/// `%` and `_` in a user search term match literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

pub(super) fn push_predicate(
    builder: &mut QueryBuilder<'_, Postgres>,
    kind: EntityKind,
    predicate: &Predicate<ColumnName>,
) -> DomainResult<()> {
    match predicate {
        Predicate::Compare { column, op, value } => {
            let column = checked(kind, *column)?;
            if *op == CompareOp::EqIgnoreCase {
                builder.push("LOWER(").push(column).push(") = LOWER(");
                push_value(builder, value);
                builder.push(")");
            } else {
                builder.push(column).push(operator(*op));
                push_value(builder, value);
            }
        }
        Predicate::IsNull(column) => {
            builder.push(checked(kind, *column)?).push(" IS NULL");
        }
        Predicate::IsNotNull(column) => {
            builder.push(checked(kind, *column)?).push(" IS NOT NULL");
        }
        Predicate::ContainsText { column, needle } => {
            builder
                .push(checked(kind, *column)?)
                .push(" ILIKE ")
                .push_bind(like_pattern(needle));
        }
        Predicate::HasMember { column, value } => {
            let Some(link) = membership(kind, *column) else {
                return Err(DomainError::persistence(format!(
                    "`{column}` is not a list-valued {kind} column"
                )));
            };
            builder
                .push("EXISTS (SELECT 1 FROM ")
                .push(link.table)
                .push(" m WHERE m.")
                .push(link.owner_column)
                .push(" = ")
                .push(kind.table())
                .push(".id AND m.")
                .push(link.member_column)
                .push(" = ");
            push_value(builder, value);
            builder.push(")");
        }
        Predicate::And(parts) => push_group(builder, kind, parts, " AND ", "TRUE")?,
        Predicate::Or(parts) => push_group(builder, kind, parts, " OR ", "FALSE")?,
        Predicate::Not(inner) => {
            // NOT over a NULL comparison stays NULL in SQL; coalesce so
            // negation matches in-memory evaluation.
            builder.push("NOT COALESCE((");
            push_predicate(builder, kind, inner)?;
            builder.push("), FALSE)");
        }
    }
    Ok(())
}

fn push_group(
    builder: &mut QueryBuilder<'_, Postgres>,
    kind: EntityKind,
    parts: &[Predicate<ColumnName>],
    joiner: &str,
    empty: &str,
) -> DomainResult<()> {
    if parts.is_empty() {
        builder.push(empty);
        return Ok(());
    }
    builder.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            builder.push(joiner);
        }
        push_predicate(builder, kind, part)?;
    }
    builder.push(")");
    Ok(())
}

pub(super) fn push_where(
    builder: &mut QueryBuilder<'_, Postgres>,
    kind: EntityKind,
    filter: Option<&Predicate<ColumnName>>,
) -> DomainResult<()> {
    if let Some(filter) = filter {
        builder.push(" WHERE ");
        push_predicate(builder, kind, filter)?;
    }
    Ok(())
}

/// `SELECT <columns> FROM <table> [WHERE] ORDER BY .. [LIMIT .. OFFSET ..]`.
/// Rows are always ordered, falling back to the id, so pages are stable.
pub(super) fn select<'a>(
    kind: EntityKind,
    columns: &[&'static str],
    query: &Query,
) -> DomainResult<QueryBuilder<'a, Postgres>> {
    let mut builder = QueryBuilder::new("SELECT ");
    builder.push(columns.join(", "));
    builder.push(" FROM ").push(kind.table());
    push_where(&mut builder, kind, query.filter.as_ref())?;

    builder.push(" ORDER BY ");
    if let Some(order) = &query.order {
        builder
            .push(checked(kind, order.column)?)
            .push(if order.ascending { " ASC" } else { " DESC NULLS LAST" })
            .push(", ");
    }
    builder.push("id ASC");

    if let Some(window) = query.window {
        builder
            .push(" LIMIT ")
            .push_bind(i64::try_from(window.limit).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(window.offset).unwrap_or(i64::MAX));
    }
    Ok(builder)
}

pub(super) fn count<'a>(
    kind: EntityKind,
    filter: Option<&Predicate<ColumnName>>,
) -> DomainResult<QueryBuilder<'a, Postgres>> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
    builder.push(kind.table());
    push_where(&mut builder, kind, filter)?;
    Ok(builder)
}

pub(super) fn insert<'a>(
    kind: EntityKind,
    fields: &[(&'static str, FieldValue)],
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("INSERT INTO ");
    builder.push(kind.table()).push(" (");
    builder.push(
        fields
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", "),
    );
    builder.push(") VALUES (");
    for (i, (_, value)) in fields.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, value);
    }
    builder.push(")");
    builder
}

/// `UPDATE .. SET .. WHERE id = $ [AND version = $]`; zero affected rows
/// means the row vanished or its token moved on.
pub(super) fn update<'a>(
    kind: EntityKind,
    id: uuid::Uuid,
    fields: &[(&'static str, FieldValue)],
    expected: Option<uuid::Uuid>,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE ");
    builder.push(kind.table()).push(" SET ");
    let mut first = true;
    for (name, value) in fields.iter().filter(|(name, _)| *name != "id") {
        if !first {
            builder.push(", ");
        }
        first = false;
        builder.push(*name).push(" = ");
        push_value(&mut builder, value);
    }
    builder.push(" WHERE id = ").push_bind(id);
    if let Some(expected) = expected {
        builder.push(" AND version = ").push_bind(expected);
    }
    builder
}

pub(super) fn delete<'a>(
    kind: EntityKind,
    id: uuid::Uuid,
    expected: Option<uuid::Uuid>,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("DELETE FROM ");
    builder.push(kind.table()).push(" WHERE id = ").push_bind(id);
    if let Some(expected) = expected {
        builder.push(" AND version = ").push_bind(expected);
    }
    builder
}
