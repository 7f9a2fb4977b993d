use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing::{self, ListQuery};
use crate::app::scope::Scope;

const SELECT: &str = "t.id, t.name, t.description, t.report_type, t.organization_id, o.name AS organization_name, \
    t.is_public, t.parameters, t.cached_data, t.last_generated, \
    t.created_at, t.updated_at, t.created_by, cb.username AS created_by_name";

const FROM: &str = "reports t \
    LEFT JOIN organizations o ON o.id = t.organization_id \
    LEFT JOIN users cb ON cb.id = t.created_by";

/// Searchable columns for `?search=`.
pub const SEARCH_COLUMNS: &[&str] = &["t.name", "t.description"];

/// Ordering fields exposed to clients.
pub const ORDERING: &[(&str, &str)] = &[
    ("created_at", "t.created_at"),
    ("name", "t.name"),
    ("last_generated", "t.last_generated"),
];

/// Database row for reports table. `parameters` and `cached_data` hold JSON text.
#[derive(Debug, FromRow, Serialize)]
pub struct Report {
    pub id: String,
    pub name: String,
    pub description: String,
    pub report_type: String,
    #[serde(rename = "organization")]
    pub organization_id: Option<String>,
    pub organization_name: Option<String>,
    pub is_public: bool,
    #[serde(skip)]
    pub parameters: String,
    #[serde(skip)]
    pub cached_data: Option<String>,
    pub last_generated: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<String>,
    pub created_by_name: Option<String>,
}

/// Data structure for inserting a new report.
pub struct NewReport {
    pub id: String,
    pub name: String,
    pub description: String,
    pub report_type: String,
    pub organization_id: Option<String>,
    pub is_public: bool,
    pub parameters: String,
    pub cached_data: Option<String>,
    pub created_by: String,
}

/// Full set of writable fields after merging a partial update.
pub struct ReportChanges<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub report_type: &'a str,
    pub organization_id: Option<&'a str>,
    pub is_public: bool,
    pub parameters: &'a str,
    pub cached_data: Option<&'a str>,
}

/// List reports within scope.
pub async fn list(pool: &SqlitePool, query: &ListQuery<'_>) -> Result<(Vec<Report>, i64), sqlx::Error> {
    listing::fetch_page(pool, SELECT, FROM, query).await
}

/// Find a report by ID within scope.
pub async fn find_scoped<'e, E>(executor: E, scope: &Scope, id: &str) -> Result<Option<Report>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    listing::fetch_scoped(executor, SELECT, FROM, scope, id).await
}

/// Insert a new report.
pub async fn insert<'e, E>(executor: E, report: &NewReport) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO reports (id, name, description, report_type, organization_id, is_public, parameters, cached_data, created_at, updated_at, created_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&report.id)
    .bind(&report.name)
    .bind(&report.description)
    .bind(&report.report_type)
    .bind(&report.organization_id)
    .bind(report.is_public)
    .bind(&report.parameters)
    .bind(&report.cached_data)
    .bind(now)
    .bind(now)
    .bind(&report.created_by)
    .execute(executor)
    .await?;
    Ok(())
}

/// Overwrite the writable fields of a report.
pub async fn update(pool: &SqlitePool, id: &str, changes: &ReportChanges<'_>) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE reports SET name = ?, description = ?, report_type = ?, organization_id = ?, is_public = ?, parameters = ?, \
         cached_data = ?, updated_at = ? WHERE id = ?",
    )
    .bind(changes.name)
    .bind(changes.description)
    .bind(changes.report_type)
    .bind(changes.organization_id)
    .bind(changes.is_public)
    .bind(changes.parameters)
    .bind(changes.cached_data)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Stamp `last_generated`, replacing the table when one is given. Returns the stamp.
pub async fn store_generated(pool: &SqlitePool, id: &str, cached_data: Option<&str>) -> Result<i64, sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE reports SET cached_data = COALESCE(?, cached_data), last_generated = ?, updated_at = ? WHERE id = ?",
    )
    .bind(cached_data)
    .bind(now)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(now)
}

/// Delete a report by ID.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM reports WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
