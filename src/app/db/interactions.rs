use sqlx::{SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing;
use crate::app::scope::Scope;

/// Data structure for inserting a new interaction (an assessment sitting with a respondent).
pub struct NewInteraction {
    pub id: String,
    pub respondent_id: String,
    pub interaction_date: String,
    pub created_by: Option<String>,
}

/// Insert a new interaction.
pub async fn insert<'e, E>(executor: E, interaction: &NewInteraction) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO interactions (id, respondent_id, interaction_date, created_at, created_by) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&interaction.id)
    .bind(&interaction.respondent_id)
    .bind(&interaction.interaction_date)
    .bind(now)
    .bind(&interaction.created_by)
    .execute(executor)
    .await?;
    Ok(())
}

/// Count interactions within scope.
pub async fn count_scoped(pool: &SqlitePool, scope: &Scope) -> Result<i64, sqlx::Error> {
    listing::count_scoped(pool, "interactions", scope, None).await
}
