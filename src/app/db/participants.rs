use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing::{self, ListQuery};
use super::respondents::DISPLAY_NAME_SQL;
use crate::app::scope::Scope;

const SELECT: &str = "t.id, t.event_id, e.title AS event_title, t.respondent_id, \
    CASE WHEN r.id IS NULL THEN NULL ELSE {display} END AS respondent_name, \
    t.name, t.gender, t.contact, t.attended, t.notes, t.created_at";

const FROM: &str = "participants t \
    JOIN events e ON e.id = t.event_id \
    LEFT JOIN respondents r ON r.id = t.respondent_id";

/// Searchable columns for `?search=`.
pub const SEARCH_COLUMNS: &[&str] = &["t.name", "t.contact"];

/// Ordering fields exposed to clients.
pub const ORDERING: &[(&str, &str)] = &[("created_at", "t.created_at"), ("name", "t.name")];

fn select() -> String {
    SELECT.replace("{display}", DISPLAY_NAME_SQL)
}

/// Database row for participants table.
#[derive(Debug, FromRow, Serialize)]
pub struct Participant {
    pub id: String,
    #[serde(rename = "event")]
    pub event_id: String,
    pub event_title: String,
    #[serde(rename = "respondent")]
    pub respondent_id: Option<String>,
    /// Display name of the linked respondent.
    pub respondent_name: Option<String>,
    pub name: String,
    pub gender: String,
    pub contact: String,
    pub attended: bool,
    pub notes: String,
    pub created_at: i64,
}

/// Data structure for inserting a new participant.
pub struct NewParticipant {
    pub id: String,
    pub event_id: String,
    pub respondent_id: Option<String>,
    pub name: String,
    pub gender: String,
    pub contact: String,
    pub attended: bool,
    pub notes: String,
}

/// Full set of writable fields after merging a partial update.
pub struct ParticipantChanges<'a> {
    pub respondent_id: Option<&'a str>,
    pub name: &'a str,
    pub gender: &'a str,
    pub contact: &'a str,
    pub attended: bool,
    pub notes: &'a str,
}

/// List participants within scope.
pub async fn list(pool: &SqlitePool, query: &ListQuery<'_>) -> Result<(Vec<Participant>, i64), sqlx::Error> {
    listing::fetch_page(pool, &select(), FROM, query).await
}

/// Find a participant by ID within scope.
pub async fn find_scoped<'e, E>(executor: E, scope: &Scope, id: &str) -> Result<Option<Participant>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    listing::fetch_scoped(executor, &select(), FROM, scope, id).await
}

/// All participants of one event, oldest first. The caller has already scoped the event.
pub async fn for_event<'e, E>(executor: E, event_id: &str) -> Result<Vec<Participant>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM {FROM} WHERE t.event_id = ? ORDER BY t.created_at, t.id",
        select()
    );
    sqlx::query_as::<_, Participant>(&sql)
        .bind(event_id)
        .fetch_all(executor)
        .await
}

/// Insert a new participant.
pub async fn insert(conn: &mut SqliteConnection, participant: &NewParticipant) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO participants (id, event_id, respondent_id, name, gender, contact, attended, notes, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&participant.id)
    .bind(&participant.event_id)
    .bind(&participant.respondent_id)
    .bind(&participant.name)
    .bind(&participant.gender)
    .bind(&participant.contact)
    .bind(participant.attended)
    .bind(&participant.notes)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Overwrite the writable fields of a participant.
pub async fn update(pool: &SqlitePool, id: &str, changes: &ParticipantChanges<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE participants SET respondent_id = ?, name = ?, gender = ?, contact = ?, attended = ?, notes = ? WHERE id = ?",
    )
    .bind(changes.respondent_id)
    .bind(changes.name)
    .bind(changes.gender)
    .bind(changes.contact)
    .bind(changes.attended)
    .bind(changes.notes)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a participant by ID.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM participants WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// True when the unique (event, respondent) pair already exists.
pub fn is_duplicate(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
