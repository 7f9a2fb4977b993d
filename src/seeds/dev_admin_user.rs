use std::env;

use async_trait::async_trait;
use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime};

use crate::app::db::{self, NewUser};
use crate::app::domain::{UserId, UserRole};
use crate::seeds::{Seed, SeedOutcome};

/// How long the seeded development token stays valid.
const TOKEN_LIFETIME_DAYS: i64 = 365;

/// Admin account with a fixed bearer token for local development.
/// Reads `SEED_ADMIN_USERNAME` and `SEED_ADMIN_TOKEN`; skipped when either is unset.
pub struct DevAdminUser {
    pub credentials: Option<(String, String)>,
}

impl DevAdminUser {
    pub fn from_env() -> Self {
        let read = |key: &str| {
            env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            credentials: read("SEED_ADMIN_USERNAME").zip(read("SEED_ADMIN_TOKEN")),
        }
    }
}

#[async_trait]
impl Seed for DevAdminUser {
    fn version(&self) -> i64 {
        20260101120000
    }

    fn description(&self) -> &str {
        "dev_admin_user"
    }

    async fn run(&self, pool: &SqlitePool) -> Result<SeedOutcome, sqlx::Error> {
        let Some((username, token)) = &self.credentials else {
            return Ok(SeedOutcome::Skipped);
        };

        let user_id = match db::users::find_by_username(pool, username).await? {
            Some(user) => user.id,
            None => {
                let user_id = UserId::new();
                let new_user = NewUser {
                    id: user_id.clone(),
                    username: username.clone(),
                    email: String::new(),
                    role: UserRole::Admin,
                    organization_id: None,
                };
                db::users::insert(pool, &new_user).await?;
                user_id.as_str()
            }
        };

        let expires_at = OffsetDateTime::now_utc() + Duration::days(TOKEN_LIFETIME_DAYS);
        if db::sessions::find_valid(pool, token).await?.is_none() {
            db::sessions::insert_with_id(pool, token, &user_id, expires_at).await?;
        }

        tracing::info!(%username, "dev admin ready; use the configured token as a bearer token");
        Ok(SeedOutcome::Applied)
    }
}
