use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Referral lifecycle. `Rejected` has no dedicated action; it is only set through a field update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReferralStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Completed,
}
