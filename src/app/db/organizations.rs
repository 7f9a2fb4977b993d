use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing::{self, ListQuery};
use crate::app::domain::{OrganizationId, OrganizationType};
use crate::app::scope::Scope;

const SELECT: &str = "t.id, t.name, t.code, t.type AS org_type, t.parent_id, p.name AS parent_name, \
    t.description, t.address, t.phone, t.email, t.is_active, \
    (SELECT COUNT(*) FROM organizations c WHERE c.parent_id = t.id) AS children_count, \
    (SELECT COUNT(*) FROM users u WHERE u.organization_id = t.id) AS users_count, \
    t.created_at, t.updated_at, t.created_by, cb.username AS created_by_name";

const FROM: &str = "organizations t \
    LEFT JOIN organizations p ON p.id = t.parent_id \
    LEFT JOIN users cb ON cb.id = t.created_by";

/// Searchable columns for `?search=`.
pub const SEARCH_COLUMNS: &[&str] = &["t.name", "t.code"];

/// Ordering fields exposed to clients.
pub const ORDERING: &[(&str, &str)] = &[("name", "t.name"), ("code", "t.code"), ("created_at", "t.created_at")];

/// Database row for organizations table, with display columns.
#[derive(Debug, FromRow, Serialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub org_type: String,
    #[serde(rename = "parent")]
    pub parent_id: Option<String>,
    pub parent_name: Option<String>,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub is_active: bool,
    pub children_count: i64,
    pub users_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: Option<String>,
    pub created_by_name: Option<String>,
}

/// Minimal row used to assemble the hierarchy tree.
#[derive(Debug, Clone, FromRow)]
pub struct TreeRow {
    pub id: String,
    pub name: String,
    pub code: String,
    pub org_type: String,
    pub parent_id: Option<String>,
}

/// Data structure for inserting a new organization.
pub struct NewOrganization {
    pub id: OrganizationId,
    pub name: String,
    pub code: String,
    pub org_type: OrganizationType,
    pub parent_id: Option<String>,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_by: Option<String>,
}

/// Full set of writable fields after merging a partial update.
pub struct OrganizationChanges<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub org_type: OrganizationType,
    pub parent_id: Option<&'a str>,
    pub description: &'a str,
    pub address: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub is_active: bool,
}

/// List organizations within scope.
pub async fn list(
    pool: &SqlitePool,
    query: &ListQuery<'_>,
) -> Result<(Vec<Organization>, i64), sqlx::Error> {
    listing::fetch_page(pool, SELECT, FROM, query).await
}

/// Find an organization by ID within scope.
pub async fn find_scoped<'e, E>(
    executor: E,
    scope: &Scope,
    id: &str,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    listing::fetch_scoped(executor, SELECT, FROM, scope, id).await
}

/// Check whether an organization exists, regardless of scope.
pub async fn exists<'e, E>(executor: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations WHERE id = ?")
        .bind(id)
        .fetch_one(executor)
        .await?;
    Ok(count > 0)
}

/// Check whether an organization code is taken by another organization.
pub async fn code_taken(
    pool: &SqlitePool,
    code: &str,
    except_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM organizations WHERE code = ? AND id IS NOT ?",
    )
    .bind(code)
    .bind(except_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// IDs of an organization and all of its descendants.
pub async fn subtree_ids(pool: &SqlitePool, id: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "WITH RECURSIVE subtree(id) AS (SELECT ? UNION SELECT o.id FROM organizations o JOIN subtree s ON o.parent_id = s.id) SELECT id FROM subtree",
    )
    .bind(id)
    .fetch_all(pool)
    .await
}

/// Active organizations within scope, for building the tree.
pub async fn list_active_scoped(
    pool: &SqlitePool,
    scope: &Scope,
) -> Result<Vec<TreeRow>, sqlx::Error> {
    let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
        "SELECT t.id, t.name, t.code, t.type AS org_type, t.parent_id FROM organizations t WHERE t.is_active = 1 AND ",
    );
    scope.push_predicate(&mut qb, listing::ALIAS);
    qb.push(" ORDER BY t.name, t.id");
    qb.build_query_as::<TreeRow>().fetch_all(pool).await
}

/// Insert a new organization.
pub async fn insert<'e, E>(
    executor: E,
    organization: &NewOrganization,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organizations (id, name, code, type, parent_id, description, address, phone, email, is_active, created_at, updated_at, created_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)",
    )
    .bind(organization.id.as_str())
    .bind(&organization.name)
    .bind(&organization.code)
    .bind(organization.org_type.to_string())
    .bind(&organization.parent_id)
    .bind(&organization.description)
    .bind(&organization.address)
    .bind(&organization.phone)
    .bind(&organization.email)
    .bind(now)
    .bind(now)
    .bind(&organization.created_by)
    .execute(executor)
    .await?;
    Ok(())
}

/// Overwrite the writable fields of an organization. `created_by` is never touched.
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    changes: &OrganizationChanges<'_>,
) -> Result<(), sqlx::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "UPDATE organizations SET name = ?, code = ?, type = ?, parent_id = ?, description = ?, address = ?, phone = ?, email = ?, is_active = ?, updated_at = ? WHERE id = ?",
    )
    .bind(changes.name)
    .bind(changes.code)
    .bind(changes.org_type.to_string())
    .bind(changes.parent_id)
    .bind(changes.description)
    .bind(changes.address)
    .bind(changes.phone)
    .bind(changes.email)
    .bind(changes.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete an organization by ID.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM organizations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
