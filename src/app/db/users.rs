use sqlx::FromRow;
use time::OffsetDateTime;

use crate::app::domain::{Principal, UserId, UserRole};

/// Database row for users table.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub organization_id: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

impl User {
    /// Build the request principal. Returns None when the stored role is not a known role.
    pub fn to_principal(&self) -> Option<Principal> {
        let role = self.role.parse::<UserRole>().ok()?;
        Some(Principal {
            user_id: self.id.clone(),
            username: self.username.clone(),
            role,
            organization_id: self.organization_id.clone(),
        })
    }
}

/// Data structure for inserting a new user.
pub struct NewUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub organization_id: Option<String>,
}

/// Find a user by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    user_id: &str,
) -> Result<Option<User>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, role, organization_id, is_active, created_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Find a user by username.
pub async fn find_by_username<'e, E>(
    executor: E,
    username: &str,
) -> Result<Option<User>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, role, organization_id, is_active, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(executor)
    .await
}

/// Insert a new user into the database.
pub async fn insert<'e, E>(
    executor: E,
    user: &NewUser,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();

    sqlx::query(
        "INSERT INTO users (id, username, email, role, organization_id, is_active, created_at) VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(user.id.as_str())
    .bind(&user.username)
    .bind(&user.email)
    .bind(user.role.to_string())
    .bind(&user.organization_id)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(())
}
