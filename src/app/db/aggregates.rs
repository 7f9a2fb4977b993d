use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing::{self, ListQuery};
use crate::app::scope::Scope;

const SELECT: &str = "t.id, t.indicator_id, i.name AS indicator_name, t.project_id, p.name AS project_name, \
    t.organization_id, o.name AS organization_name, t.period_start, t.period_end, t.value, t.notes, \
    t.created_at, t.updated_at, t.created_by, cb.username AS created_by_name";

const FROM: &str = "aggregates t \
    JOIN indicators i ON i.id = t.indicator_id \
    JOIN projects p ON p.id = t.project_id \
    JOIN organizations o ON o.id = t.organization_id \
    LEFT JOIN users cb ON cb.id = t.created_by";

/// Ordering fields exposed to clients.
pub const ORDERING: &[(&str, &str)] = &[
    ("period_start", "t.period_start"),
    ("period_end", "t.period_end"),
    ("created_at", "t.created_at"),
];

/// Database row for aggregates table, with display columns.
#[derive(Debug, FromRow, Serialize)]
pub struct Aggregate {
    pub id: String,
    #[serde(rename = "indicator")]
    pub indicator_id: String,
    pub indicator_name: String,
    #[serde(rename = "project")]
    pub project_id: String,
    pub project_name: String,
    #[serde(rename = "organization")]
    pub organization_id: String,
    pub organization_name: String,
    pub period_start: String,
    pub period_end: String,
    pub value: i64,
    pub notes: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<String>,
    pub created_by_name: Option<String>,
}

/// Per-indicator roll-up used by indicator summary reports.
#[derive(Debug, FromRow)]
pub struct IndicatorTotal {
    pub indicator_id: String,
    pub indicator_name: String,
    pub aggregate_count: i64,
    pub total_value: i64,
}

/// Data structure for inserting a new aggregate.
pub struct NewAggregate {
    pub id: String,
    pub indicator_id: String,
    pub project_id: String,
    pub organization_id: String,
    pub period_start: String,
    pub period_end: String,
    pub value: i64,
    pub notes: String,
    pub created_by: String,
}

/// Full set of writable fields after merging a partial update.
pub struct AggregateChanges<'a> {
    pub indicator_id: &'a str,
    pub project_id: &'a str,
    pub organization_id: &'a str,
    pub period_start: &'a str,
    pub period_end: &'a str,
    pub value: i64,
    pub notes: &'a str,
}

/// List aggregates within scope.
pub async fn list(pool: &SqlitePool, query: &ListQuery<'_>) -> Result<(Vec<Aggregate>, i64), sqlx::Error> {
    listing::fetch_page(pool, SELECT, FROM, query).await
}

/// Find an aggregate by ID within scope.
pub async fn find_scoped<'e, E>(executor: E, scope: &Scope, id: &str) -> Result<Option<Aggregate>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    listing::fetch_scoped(executor, SELECT, FROM, scope, id).await
}

/// Every aggregate of one indicator within scope, newest period first.
pub async fn for_indicator(pool: &SqlitePool, scope: &Scope, indicator_id: &str) -> Result<Vec<Aggregate>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {SELECT} FROM {FROM} WHERE "));
    scope.push_predicate(&mut qb, listing::ALIAS);
    qb.push(" AND t.indicator_id = ");
    qb.push_bind(indicator_id.to_string());
    qb.push(" ORDER BY t.period_start DESC, t.id DESC");
    qb.build_query_as::<Aggregate>().fetch_all(pool).await
}

/// Insert a new aggregate.
pub async fn insert<'e, E>(executor: E, aggregate: &NewAggregate) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO aggregates (id, indicator_id, project_id, organization_id, period_start, period_end, value, notes, created_at, updated_at, created_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&aggregate.id)
    .bind(&aggregate.indicator_id)
    .bind(&aggregate.project_id)
    .bind(&aggregate.organization_id)
    .bind(&aggregate.period_start)
    .bind(&aggregate.period_end)
    .bind(aggregate.value)
    .bind(&aggregate.notes)
    .bind(now)
    .bind(now)
    .bind(&aggregate.created_by)
    .execute(executor)
    .await?;
    Ok(())
}

/// Overwrite the writable fields of an aggregate.
pub async fn update(pool: &SqlitePool, id: &str, changes: &AggregateChanges<'_>) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE aggregates SET indicator_id = ?, project_id = ?, organization_id = ?, period_start = ?, period_end = ?, value = ?, notes = ?, updated_at = ? WHERE id = ?",
    )
    .bind(changes.indicator_id)
    .bind(changes.project_id)
    .bind(changes.organization_id)
    .bind(changes.period_start)
    .bind(changes.period_end)
    .bind(changes.value)
    .bind(changes.notes)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete an aggregate by ID.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM aggregates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Count and sum of aggregate values per indicator, within scope and optionally one organization.
pub async fn totals_by_indicator(
    pool: &SqlitePool,
    scope: &Scope,
    organization_id: Option<&str>,
) -> Result<Vec<IndicatorTotal>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT i.id AS indicator_id, i.name AS indicator_name, COUNT(t.id) AS aggregate_count, \
         COALESCE(SUM(t.value), 0) AS total_value \
         FROM aggregates t JOIN indicators i ON i.id = t.indicator_id WHERE ",
    );
    scope.push_predicate(&mut qb, listing::ALIAS);
    if let Some(org) = organization_id {
        qb.push(" AND t.organization_id = ");
        qb.push_bind(org.to_string());
    }
    qb.push(" GROUP BY i.id, i.name ORDER BY i.name, i.id");
    qb.build_query_as::<IndicatorTotal>().fetch_all(pool).await
}
