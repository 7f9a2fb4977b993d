use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing::{self, ListQuery};
use crate::app::scope::Scope;

const SELECT: &str = "t.id, t.title, t.description, t.type AS event_type, t.status, \
    t.project_id, p.name AS project_name, t.organization_id, o.name AS organization_name, \
    t.start_date, t.end_date, t.location, t.expected_participants, t.actual_participants, \
    (SELECT COUNT(*) FROM participants pt WHERE pt.event_id = t.id) AS participants_count, \
    t.budget, t.actual_cost, \
    (SELECT group_concat(ei.indicator_id) FROM event_indicators ei WHERE ei.event_id = t.id) AS indicator_ids, \
    t.created_at, t.updated_at, t.created_by, cb.username AS created_by_name";

const FROM: &str = "events t \
    LEFT JOIN projects p ON p.id = t.project_id \
    JOIN organizations o ON o.id = t.organization_id \
    LEFT JOIN users cb ON cb.id = t.created_by";

/// Searchable columns for `?search=`.
pub const SEARCH_COLUMNS: &[&str] = &["t.title", "t.description", "t.location"];

/// Ordering fields exposed to clients.
pub const ORDERING: &[(&str, &str)] = &[
    ("start_date", "t.start_date"),
    ("created_at", "t.created_at"),
    ("title", "t.title"),
];

/// Database row for events table, with display and derived columns.
#[derive(Debug, FromRow, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub status: String,
    #[serde(rename = "project")]
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    #[serde(rename = "organization")]
    pub organization_id: String,
    pub organization_name: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub location: String,
    pub expected_participants: i64,
    pub actual_participants: i64,
    pub participants_count: i64,
    pub budget: f64,
    pub actual_cost: f64,
    /// Comma-joined linked indicator IDs, None when there are none.
    #[serde(skip)]
    pub indicator_ids: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<String>,
    pub created_by_name: Option<String>,
}

impl Event {
    pub fn indicators(&self) -> Vec<String> {
        self.indicator_ids
            .as_deref()
            .map(|ids| ids.split(',').map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Data structure for inserting a new event.
pub struct NewEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub status: String,
    pub project_id: Option<String>,
    pub organization_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub location: String,
    pub expected_participants: i64,
    pub budget: f64,
    pub actual_cost: f64,
    pub created_by: String,
}

/// Full set of writable fields after merging a partial update.
pub struct EventChanges<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub event_type: &'a str,
    pub status: &'a str,
    pub project_id: Option<&'a str>,
    pub organization_id: &'a str,
    pub start_date: &'a str,
    pub end_date: Option<&'a str>,
    pub location: &'a str,
    pub expected_participants: i64,
    pub actual_participants: i64,
    pub budget: f64,
    pub actual_cost: f64,
}

/// Compact row for the dashboard activity feed.
#[derive(Debug, FromRow, Serialize)]
pub struct RecentEvent {
    pub id: String,
    pub title: String,
    pub status: String,
    pub start_date: String,
    pub organization_id: String,
}

/// List events within scope.
pub async fn list(pool: &SqlitePool, query: &ListQuery<'_>) -> Result<(Vec<Event>, i64), sqlx::Error> {
    listing::fetch_page(pool, SELECT, FROM, query).await
}

/// Find an event by ID within scope.
pub async fn find_scoped<'e, E>(executor: E, scope: &Scope, id: &str) -> Result<Option<Event>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    listing::fetch_scoped(executor, SELECT, FROM, scope, id).await
}

/// Every event within scope, newest first.
pub async fn all_scoped(pool: &SqlitePool, scope: &Scope) -> Result<Vec<Event>, sqlx::Error> {
    listing::fetch_all_scoped(pool, SELECT, FROM, scope, "t.start_date DESC, t.id DESC").await
}

/// Most recent events within scope.
pub async fn recent_scoped(pool: &SqlitePool, scope: &Scope, limit: i64) -> Result<Vec<RecentEvent>, sqlx::Error> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
        "SELECT t.id, t.title, t.status, t.start_date, t.organization_id FROM events t WHERE ",
    );
    scope.push_predicate(&mut qb, listing::ALIAS);
    qb.push(" ORDER BY t.start_date DESC, t.id DESC LIMIT ");
    qb.push_bind(limit);
    qb.build_query_as::<RecentEvent>().fetch_all(pool).await
}

/// Insert a new event.
pub async fn insert(conn: &mut SqliteConnection, event: &NewEvent) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO events (id, title, description, type, status, project_id, organization_id, start_date, end_date, location, \
         expected_participants, actual_participants, budget, actual_cost, created_at, updated_at, created_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?)",
    )
    .bind(&event.id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(&event.event_type)
    .bind(&event.status)
    .bind(&event.project_id)
    .bind(&event.organization_id)
    .bind(&event.start_date)
    .bind(&event.end_date)
    .bind(&event.location)
    .bind(event.expected_participants)
    .bind(event.budget)
    .bind(event.actual_cost)
    .bind(now)
    .bind(now)
    .bind(&event.created_by)
    .execute(conn)
    .await?;
    Ok(())
}

/// Replace the indicators linked to an event.
pub async fn set_indicators(
    conn: &mut SqliteConnection,
    event_id: &str,
    indicator_ids: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM event_indicators WHERE event_id = ?")
        .bind(event_id)
        .execute(&mut *conn)
        .await?;
    for indicator_id in indicator_ids {
        sqlx::query("INSERT OR IGNORE INTO event_indicators (event_id, indicator_id) VALUES (?, ?)")
            .bind(event_id)
            .bind(indicator_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Overwrite the writable fields of an event.
pub async fn update(conn: &mut SqliteConnection, id: &str, changes: &EventChanges<'_>) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE events SET title = ?, description = ?, type = ?, status = ?, project_id = ?, organization_id = ?, start_date = ?, end_date = ?, \
         location = ?, expected_participants = ?, actual_participants = ?, budget = ?, actual_cost = ?, updated_at = ? WHERE id = ?",
    )
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.event_type)
    .bind(changes.status)
    .bind(changes.project_id)
    .bind(changes.organization_id)
    .bind(changes.start_date)
    .bind(changes.end_date)
    .bind(changes.location)
    .bind(changes.expected_participants)
    .bind(changes.actual_participants)
    .bind(changes.budget)
    .bind(changes.actual_cost)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Recompute `actual_participants` from attended participants. Returns the new count.
pub async fn refresh_actual_participants(conn: &mut SqliteConnection, id: &str) -> Result<i64, sqlx::Error> {
    let attended: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE event_id = ? AND attended = 1")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE events SET actual_participants = ?, updated_at = ? WHERE id = ?")
        .bind(attended)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(attended)
}

/// Set an event's status.
pub async fn set_status(conn: &mut SqliteConnection, id: &str, status: &str) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE events SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Delete an event by ID. Participants and indicator links cascade.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
