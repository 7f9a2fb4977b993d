//! Resolving referenced records for write gating.
//!
//! A create or update payload names other records (an organization, a respondent,
//! an event). Before anything is written, the organizations those references reach
//! must be admitted by the caller's scope. A missing reference and an unreachable
//! one produce the same validation error.

use sqlx::SqliteExecutor;

use crate::app::{
    db,
    domain::Principal,
    error::AppError,
    features::pagination::invalid,
    scope::{scope, ResourceFacts, ResourceKind, Scope},
};

/// Fail with a validation error naming `field` unless `scope` admits `facts`.
pub fn require_admitted(scope: &Scope, facts: &ResourceFacts, field: &str) -> Result<(), AppError> {
    if scope.admits(facts) {
        Ok(())
    } else {
        Err(invalid(field))
    }
}

/// An organization that exists and that `scope` admits as the row's organization.
pub async fn organization<'e, E>(executor: E, scope: &Scope, id: &str, field: &str) -> Result<(), AppError>
where
    E: SqliteExecutor<'e>,
{
    if !db::organizations::exists(executor, id).await? {
        return Err(invalid(field));
    }
    require_admitted(scope, &ResourceFacts::reaching([id]), field)
}

/// A respondent the principal can reach. Returns the respondent's organization.
pub async fn respondent<'e, E>(executor: E, principal: &Principal, id: &str, field: &str) -> Result<String, AppError>
where
    E: SqliteExecutor<'e>,
{
    let respondent = db::respondents::find_by_id(executor, id)
        .await?
        .ok_or_else(|| invalid(field))?;
    let respondents = scope(principal, ResourceKind::Respondent);
    require_admitted(&respondents, &ResourceFacts::reaching([respondent.organization_id.as_str()]), field)?;
    Ok(respondent.organization_id)
}

/// A project that exists. Projects are shared between organizations, so only existence is checked.
pub async fn project<'e, E>(executor: E, id: &str, field: &str) -> Result<(), AppError>
where
    E: SqliteExecutor<'e>,
{
    db::projects::find_by_id(executor, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| invalid(field))
}

/// An indicator that exists.
pub async fn indicator<'e, E>(executor: E, id: &str, field: &str) -> Result<(), AppError>
where
    E: SqliteExecutor<'e>,
{
    db::indicators::find_by_id(executor, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| invalid(field))
}

/// Every listed indicator exists. Duplicates are allowed and collapse on insert.
pub async fn indicators<'e, E>(executor: E, ids: &[String], field: &str) -> Result<(), AppError>
where
    E: SqliteExecutor<'e>,
{
    let mut unique: Vec<String> = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    let found = db::indicators::count_existing(executor, &unique).await?;
    if found as usize == unique.len() {
        Ok(())
    } else {
        Err(invalid(field))
    }
}
