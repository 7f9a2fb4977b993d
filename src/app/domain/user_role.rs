use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Portal role. Only `Admin` bypasses organization scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Officer,
    Collector,
    Client,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }
}
