use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

/// Database row for saved_queries table. `query` holds JSON text.
#[derive(Debug, FromRow, Serialize)]
pub struct SavedQuery {
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub name: String,
    pub description: String,
    #[serde(skip)]
    pub query: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data structure for inserting a new saved query.
pub struct NewSavedQuery {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub query: String,
}

/// Saved queries of one user, newest first, with the total count.
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> Result<(Vec<SavedQuery>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_queries WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let rows = sqlx::query_as::<_, SavedQuery>(
        "SELECT id, user_id, name, description, query, created_at, updated_at FROM saved_queries \
         WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok((rows, total))
}

/// Find a saved query owned by `user_id`.
pub async fn find_owned(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<SavedQuery>, sqlx::Error> {
    sqlx::query_as::<_, SavedQuery>(
        "SELECT id, user_id, name, description, query, created_at, updated_at FROM saved_queries WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &SqlitePool, saved: &NewSavedQuery) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO saved_queries (id, user_id, name, description, query, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&saved.id)
    .bind(&saved.user_id)
    .bind(&saved.name)
    .bind(&saved.description)
    .bind(&saved.query)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, id: &str, name: &str, description: &str, query: &str) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE saved_queries SET name = ?, description = ?, query = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(description)
        .bind(query)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM saved_queries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
