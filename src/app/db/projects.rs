use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing::{self, FilterValue};
use crate::app::scope::Scope;

/// Database row for projects table.
#[derive(Debug, FromRow)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub code: String,
    pub status: String,
    pub created_at: i64,
}

/// Data structure for inserting a new project.
pub struct NewProject {
    pub id: String,
    pub name: String,
    pub code: String,
    pub status: String,
}

/// Insert a new project into the database.
pub async fn insert<'e, E>(executor: E, project: &NewProject) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("INSERT INTO projects (id, name, code, status, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.code)
        .bind(&project.status)
        .bind(now)
        .execute(executor)
        .await?;
    Ok(())
}

/// Link a project to a participating organization.
pub async fn add_organization<'e, E>(
    executor: E,
    project_id: &str,
    organization_id: &str,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("INSERT OR IGNORE INTO project_organizations (project_id, organization_id) VALUES (?, ?)")
        .bind(project_id)
        .bind(organization_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Find a project by ID.
pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Project>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Project>("SELECT id, name, code, status, created_at FROM projects WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Count active projects within scope.
pub async fn count_active_scoped(pool: &SqlitePool, scope: &Scope) -> Result<i64, sqlx::Error> {
    listing::count_scoped(
        pool,
        "projects",
        scope,
        Some(("t.status", FilterValue::Text("active".to_string()))),
    )
    .await
}
