use serde::Serialize;

use super::UserRole;

/// The authenticated actor behind a request. Passed explicitly to scope and transition operations.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
    pub organization_id: Option<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
