use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing::{self, ListQuery};
use super::respondents::DISPLAY_NAME_SQL;
use crate::app::scope::Scope;

const SELECT: &str = "t.id, t.respondent_id, {display} AS respondent_name, r.organization_id, \
    t.service_type, t.description, t.provider, t.start_date, t.end_date, t.status, t.notes, \
    t.created_at, t.updated_at, t.created_by, cb.username AS created_by_name";

const FROM: &str = "social_services t \
    JOIN respondents r ON r.id = t.respondent_id \
    LEFT JOIN users cb ON cb.id = t.created_by";

pub const SEARCH_COLUMNS: &[&str] = &["t.service_type", "t.description", "t.provider"];

pub const ORDERING: &[(&str, &str)] = &[
    ("start_date", "t.start_date"),
    ("created_at", "t.created_at"),
];

fn select() -> String {
    SELECT.replace("{display}", DISPLAY_NAME_SQL)
}

#[derive(Debug, FromRow, Serialize)]
pub struct SocialService {
    pub id: String,
    #[serde(rename = "respondent")]
    pub respondent_id: String,
    pub respondent_name: String,
    /// Organization of the respondent, which is what scopes the service.
    pub organization_id: String,
    pub service_type: String,
    pub description: String,
    pub provider: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub status: String,
    pub notes: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<String>,
    pub created_by_name: Option<String>,
}

pub struct NewSocialService {
    pub id: String,
    pub respondent_id: String,
    pub service_type: String,
    pub description: String,
    pub provider: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub status: String,
    pub notes: String,
    pub created_by: String,
}

pub struct SocialServiceChanges<'a> {
    pub respondent_id: &'a str,
    pub service_type: &'a str,
    pub description: &'a str,
    pub provider: &'a str,
    pub start_date: &'a str,
    pub end_date: Option<&'a str>,
    pub status: &'a str,
    pub notes: &'a str,
}

pub async fn list(pool: &SqlitePool, query: &ListQuery<'_>) -> Result<(Vec<SocialService>, i64), sqlx::Error> {
    listing::fetch_page(pool, &select(), FROM, query).await
}

pub async fn find_scoped<'e, E>(executor: E, scope: &Scope, id: &str) -> Result<Option<SocialService>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    listing::fetch_scoped(executor, &select(), FROM, scope, id).await
}

pub async fn insert<'e, E>(executor: E, service: &NewSocialService) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO social_services (id, respondent_id, service_type, description, provider, start_date, end_date, status, notes, created_at, updated_at, created_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&service.id)
    .bind(&service.respondent_id)
    .bind(&service.service_type)
    .bind(&service.description)
    .bind(&service.provider)
    .bind(&service.start_date)
    .bind(&service.end_date)
    .bind(&service.status)
    .bind(&service.notes)
    .bind(now)
    .bind(now)
    .bind(&service.created_by)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, id: &str, changes: &SocialServiceChanges<'_>) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE social_services SET respondent_id = ?, service_type = ?, description = ?, provider = ?, start_date = ?, end_date = ?, \
         status = ?, notes = ?, updated_at = ? WHERE id = ?",
    )
    .bind(changes.respondent_id)
    .bind(changes.service_type)
    .bind(changes.description)
    .bind(changes.provider)
    .bind(changes.start_date)
    .bind(changes.end_date)
    .bind(changes.status)
    .bind(changes.notes)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM social_services WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
