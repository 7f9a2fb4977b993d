use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Report kind. Decides which table `generate` builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportType {
    IndicatorSummary,
    EventAttendance,
    ReferralStatus,
    /// Client-supplied table; `generate` only refreshes the timestamp.
    Custom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_string_is_snake_case() {
        assert_eq!(ReportType::IndicatorSummary.to_string(), "indicator_summary");
        assert_eq!("event_attendance".parse::<ReportType>().unwrap(), ReportType::EventAttendance);
    }
}
