pub mod aggregates;
pub mod events;
pub mod indicators;
pub mod interactions;
pub mod listing;
pub mod organizations;
pub mod participants;
pub mod projects;
pub mod referrals;
pub mod reports;
pub mod respondents;
pub mod saved_queries;
pub mod sessions;
pub mod social_services;
pub mod users;

pub use listing::{FilterValue, ListQuery, Page};
pub use users::{NewUser, User};
