use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

/// Database row for indicators table. Indicators are a shared catalog, not organization-scoped.
#[derive(Debug, FromRow)]
pub struct Indicator {
    pub id: String,
    pub name: String,
    pub code: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Data structure for inserting a new indicator.
pub struct NewIndicator {
    pub id: String,
    pub name: String,
    pub code: String,
    pub is_active: bool,
}

/// Insert a new indicator.
pub async fn insert<'e, E>(executor: E, indicator: &NewIndicator) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("INSERT INTO indicators (id, name, code, is_active, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(&indicator.id)
        .bind(&indicator.name)
        .bind(&indicator.code)
        .bind(indicator.is_active)
        .bind(now)
        .execute(executor)
        .await?;
    Ok(())
}

/// Find an indicator by ID.
pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Indicator>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Indicator>("SELECT id, name, code, is_active, created_at FROM indicators WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Count how many of the given IDs exist.
pub async fn count_existing<'e, E>(executor: E, ids: &[String]) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(0);
    }
    let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new("SELECT COUNT(*) FROM indicators WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");
    qb.build_query_scalar().fetch_one(executor).await
}

/// Count active indicators.
pub async fn count_active<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM indicators WHERE is_active = 1")
        .fetch_one(executor)
        .await
}
