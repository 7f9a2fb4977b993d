pub mod event_status;
pub mod metrics;
pub mod organization_id;
pub mod organization_type;
pub mod principal;
pub mod referral_status;
pub mod report_table;
pub mod report_type;
pub mod service_status;
pub mod user_id;
pub mod user_role;
pub mod validation_helpers;

pub use event_status::{EventStatus, EventType};
pub use organization_id::OrganizationId;
pub use organization_type::OrganizationType;
pub use principal::Principal;
pub use referral_status::ReferralStatus;
pub use report_table::{CachedDataInput, ReportTable, ReportTableError};
pub use report_type::ReportType;
pub use service_status::ServiceStatus;
pub use user_id::UserId;
pub use user_role::UserRole;
