use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;

use super::listing::{self, ListQuery};
use super::respondents::DISPLAY_NAME_SQL;
use crate::app::scope::Scope;

const SELECT: &str = "t.id, t.respondent_id, {display} AS respondent_name, \
    t.from_organization_id, fo.name AS from_organization_name, \
    t.to_organization_id, too.name AS to_organization_name, \
    t.reason, t.status, t.referred_date, t.completed_date, t.notes, \
    t.created_at, t.created_by, cb.username AS created_by_name";

const FROM: &str = "referrals t \
    JOIN respondents r ON r.id = t.respondent_id \
    JOIN organizations fo ON fo.id = t.from_organization_id \
    JOIN organizations too ON too.id = t.to_organization_id \
    LEFT JOIN users cb ON cb.id = t.created_by";

/// Searchable columns for `?search=`.
pub const SEARCH_COLUMNS: &[&str] = &["t.reason", "t.notes"];

/// Ordering fields exposed to clients.
pub const ORDERING: &[(&str, &str)] = &[
    ("referred_date", "t.referred_date"),
    ("created_at", "t.created_at"),
];

fn select() -> String {
    SELECT.replace("{display}", DISPLAY_NAME_SQL)
}

/// Database row for referrals table, with display columns.
#[derive(Debug, FromRow, Serialize)]
pub struct Referral {
    pub id: String,
    #[serde(rename = "respondent")]
    pub respondent_id: String,
    pub respondent_name: String,
    #[serde(rename = "from_organization")]
    pub from_organization_id: String,
    pub from_organization_name: String,
    #[serde(rename = "to_organization")]
    pub to_organization_id: String,
    pub to_organization_name: String,
    pub reason: String,
    pub status: String,
    pub referred_date: String,
    pub completed_date: Option<String>,
    pub notes: String,
    pub created_at: i64,
    pub created_by: Option<String>,
    pub created_by_name: Option<String>,
}

/// Status tally for report generation.
#[derive(Debug, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Data structure for inserting a new referral.
pub struct NewReferral {
    pub id: String,
    pub respondent_id: String,
    pub from_organization_id: String,
    pub to_organization_id: String,
    pub reason: String,
    pub status: String,
    pub referred_date: String,
    pub notes: String,
    pub created_by: String,
}

/// Full set of writable fields after merging a partial update.
pub struct ReferralChanges<'a> {
    pub respondent_id: &'a str,
    pub from_organization_id: &'a str,
    pub to_organization_id: &'a str,
    pub reason: &'a str,
    pub status: &'a str,
    pub referred_date: &'a str,
    pub completed_date: Option<&'a str>,
    pub notes: &'a str,
}

/// List referrals within scope.
pub async fn list(pool: &SqlitePool, query: &ListQuery<'_>) -> Result<(Vec<Referral>, i64), sqlx::Error> {
    listing::fetch_page(pool, &select(), FROM, query).await
}

/// Find a referral by ID within scope.
pub async fn find_scoped<'e, E>(executor: E, scope: &Scope, id: &str) -> Result<Option<Referral>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    listing::fetch_scoped(executor, &select(), FROM, scope, id).await
}

/// Insert a new referral.
pub async fn insert<'e, E>(executor: E, referral: &NewReferral) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO referrals (id, respondent_id, from_organization_id, to_organization_id, reason, status, referred_date, notes, created_at, created_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&referral.id)
    .bind(&referral.respondent_id)
    .bind(&referral.from_organization_id)
    .bind(&referral.to_organization_id)
    .bind(&referral.reason)
    .bind(&referral.status)
    .bind(&referral.referred_date)
    .bind(&referral.notes)
    .bind(now)
    .bind(&referral.created_by)
    .execute(executor)
    .await?;
    Ok(())
}

/// Overwrite the writable fields of a referral.
pub async fn update(pool: &SqlitePool, id: &str, changes: &ReferralChanges<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE referrals SET respondent_id = ?, from_organization_id = ?, to_organization_id = ?, reason = ?, status = ?, \
         referred_date = ?, completed_date = ?, notes = ? WHERE id = ?",
    )
    .bind(changes.respondent_id)
    .bind(changes.from_organization_id)
    .bind(changes.to_organization_id)
    .bind(changes.reason)
    .bind(changes.status)
    .bind(changes.referred_date)
    .bind(changes.completed_date)
    .bind(changes.notes)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Set status, and the completion date when one is given.
pub async fn set_status(
    pool: &SqlitePool,
    id: &str,
    status: &str,
    completed_date: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE referrals SET status = ?, completed_date = COALESCE(?, completed_date) WHERE id = ?")
        .bind(status)
        .bind(completed_date)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a referral by ID.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM referrals WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Referrals per status within scope, optionally touching one organization.
pub async fn count_by_status(
    pool: &SqlitePool,
    scope: &Scope,
    organization_id: Option<&str>,
) -> Result<Vec<StatusCount>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT t.status, COUNT(*) AS count FROM referrals t WHERE ");
    scope.push_predicate(&mut qb, listing::ALIAS);
    if let Some(org) = organization_id {
        qb.push(" AND (t.from_organization_id = ");
        qb.push_bind(org.to_string());
        qb.push(" OR t.to_organization_id = ");
        qb.push_bind(org.to_string());
        qb.push(")");
    }
    qb.push(" GROUP BY t.status ORDER BY t.status");
    qb.build_query_as::<StatusCount>().fetch_all(pool).await
}
