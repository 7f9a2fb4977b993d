use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Activity status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Planned,
    Ongoing,
    Completed,
    Cancelled,
}

/// Activity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventType {
    Training,
    Meeting,
    Outreach,
    Workshop,
    #[default]
    Other,
}
