pub mod alerts;
pub mod approvals;
pub mod auth;
pub mod buildings;
pub mod documents;
pub mod owners;
pub mod projects;
pub mod tasks;
pub mod units;
