//! Scoped list queries shared by every resource table.
//!
//! Rows are always aliased `t`. The scope predicate comes first, then equality
//! filters, then an optional `LIKE` search across text columns.

use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::app::scope::Scope;

/// Alias every resource query uses for its primary table.
pub const ALIAS: &str = "t";

/// One page of a list request. `number` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    /// Rows skipped before this page. Pages are built by `PageParams::page`, which rejects overflowing offsets.
    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

/// Value of an equality filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

/// Scoped list request against one table.
#[derive(Debug)]
pub struct ListQuery<'a> {
    pub scope: &'a Scope,
    /// Qualified column and required value, e.g. `("t.status", Text("pending"))`.
    pub filters: Vec<(&'static str, FilterValue)>,
    /// Columns searched with `LIKE %term%`, matched if any column matches.
    pub search: Option<(&'static [&'static str], String)>,
    /// Already-validated `ORDER BY` body.
    pub order_by: String,
    pub page: Page,
}

fn push_conditions<'a>(qb: &mut QueryBuilder<'a, Sqlite>, query: &ListQuery<'_>) {
    query.scope.push_predicate(qb, ALIAS);

    for (column, value) in &query.filters {
        qb.push(format!(" AND {column} = "));
        match value {
            FilterValue::Text(text) => {
                qb.push_bind(text.clone());
            }
            FilterValue::Bool(flag) => {
                qb.push_bind(*flag);
            }
        }
    }

    if let Some((columns, term)) = &query.search {
        let pattern = format!("%{}%", term);
        qb.push(" AND (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(format!("{column} LIKE "));
            qb.push_bind(pattern.clone());
        }
        qb.push(")");
    }
}

/// Fetch one page of scoped rows plus the total number of matching rows.
///
/// `from` must alias the primary table as `t` and may add joins for display columns.
pub async fn fetch_page<T>(
    pool: &SqlitePool,
    select: &str,
    from: &str,
    query: &ListQuery<'_>,
) -> Result<(Vec<T>, i64), sqlx::Error>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut count = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {from} WHERE "));
    push_conditions(&mut count, query);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {select} FROM {from} WHERE "));
    push_conditions(&mut qb, query);
    qb.push(format!(" ORDER BY {} LIMIT ", query.order_by));
    qb.push_bind(query.page.size);
    qb.push(" OFFSET ");
    qb.push_bind(query.page.offset());

    let rows = qb.build_query_as::<T>().fetch_all(pool).await?;
    Ok((rows, total))
}

/// Fetch a single row by id, only if the scope admits it.
pub async fn fetch_scoped<'e, E, T>(
    executor: E,
    select: &str,
    from: &str,
    scope: &Scope,
    id: &str,
) -> Result<Option<T>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {select} FROM {from} WHERE {ALIAS}.id = "));
    qb.push_bind(id.to_string());
    qb.push(" AND ");
    scope.push_predicate(&mut qb, ALIAS);
    qb.build_query_as::<T>().fetch_optional(executor).await
}

/// Fetch every scoped row, unpaged. For exports and report generation.
pub async fn fetch_all_scoped<T>(
    pool: &SqlitePool,
    select: &str,
    from: &str,
    scope: &Scope,
    order_by: &str,
) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {select} FROM {from} WHERE "));
    scope.push_predicate(&mut qb, ALIAS);
    qb.push(format!(" ORDER BY {order_by}"));
    qb.build_query_as::<T>().fetch_all(pool).await
}

/// Count scoped rows of `table`.
pub async fn count_scoped(
    pool: &SqlitePool,
    table: &str,
    scope: &Scope,
    extra: Option<(&'static str, FilterValue)>,
) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {table} {ALIAS} WHERE "));
    scope.push_predicate(&mut qb, ALIAS);
    if let Some((column, value)) = extra {
        qb.push(format!(" AND {column} = "));
        match value {
            FilterValue::Text(text) => {
                qb.push_bind(text);
            }
            FilterValue::Bool(flag) => {
                qb.push_bind(flag);
            }
        }
    }
    qb.build_query_scalar().fetch_one(pool).await
}

/// Resolve an `ordering` request (`field` or `-field`) against the allowed fields.
/// Unknown fields fall back to `default`. Ties break on id so pages are stable.
pub fn order_clause(requested: Option<&str>, allowed: &[(&str, &str)], default: &str) -> String {
    let resolve = |raw: &str| {
        let (field, direction) = match raw.strip_prefix('-') {
            Some(field) => (field, "DESC"),
            None => (raw, "ASC"),
        };
        allowed
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| format!("{column} {direction}, {ALIAS}.id {direction}"))
    };

    requested
        .and_then(resolve)
        .or_else(|| resolve(default))
        .unwrap_or_else(|| format!("{ALIAS}.id DESC"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[(&str, &str)] = &[("start_date", "t.start_date"), ("title", "t.title")];

    #[test]
    fn descending_prefix() {
        assert_eq!(
            order_clause(Some("-title"), FIELDS, "-start_date"),
            "t.title DESC, t.id DESC"
        );
    }

    #[test]
    fn unknown_field_uses_default() {
        assert_eq!(
            order_clause(Some("password"), FIELDS, "-start_date"),
            "t.start_date DESC, t.id DESC"
        );
        assert_eq!(order_clause(None, FIELDS, "title"), "t.title ASC, t.id ASC");
    }

    #[test]
    fn page_offset() {
        assert_eq!(Page { number: 1, size: 20 }.offset(), 0);
        assert_eq!(Page { number: 3, size: 20 }.offset(), 40);
    }
}
