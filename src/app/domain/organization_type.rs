use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Organization category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrganizationType {
    #[default]
    Ngo,
    Government,
    Partner,
    Funder,
}
