use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Social service status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}
