use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing;
use crate::app::scope::Scope;

/// Display name used wherever a respondent is shown next to another record.
/// Expects the respondents table aliased `r`.
pub const DISPLAY_NAME_SQL: &str =
    "CASE WHEN r.is_anonymous = 1 THEN 'Anonymous' ELSE trim(r.first_name || ' ' || r.last_name) END";

/// Database row for respondents table.
#[derive(Debug, FromRow)]
pub struct Respondent {
    pub id: String,
    pub organization_id: String,
    pub first_name: String,
    pub last_name: String,
    pub is_anonymous: bool,
    pub created_at: i64,
    pub created_by: Option<String>,
}

/// Data structure for inserting a new respondent.
pub struct NewRespondent {
    pub id: String,
    pub organization_id: String,
    pub first_name: String,
    pub last_name: String,
    pub is_anonymous: bool,
    pub created_by: Option<String>,
}

/// Insert a new respondent.
pub async fn insert<'e, E>(executor: E, respondent: &NewRespondent) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO respondents (id, organization_id, first_name, last_name, is_anonymous, created_at, created_by) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&respondent.id)
    .bind(&respondent.organization_id)
    .bind(&respondent.first_name)
    .bind(&respondent.last_name)
    .bind(respondent.is_anonymous)
    .bind(now)
    .bind(&respondent.created_by)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find a respondent by ID, regardless of scope.
pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Respondent>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Respondent>(
        "SELECT id, organization_id, first_name, last_name, is_anonymous, created_at, created_by FROM respondents WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Count respondents within scope.
pub async fn count_scoped(pool: &SqlitePool, scope: &Scope) -> Result<i64, sqlx::Error> {
    listing::count_scoped(pool, "respondents", scope, None).await
}
