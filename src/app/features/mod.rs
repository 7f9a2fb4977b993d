pub mod activities;
pub mod aggregates;
pub mod analysis;
pub mod organizations;
pub mod pagination;
pub mod patch;
pub mod references;
pub mod social;
pub mod users;
