/// Nexus Portal - internship administration backend
///
/// An admin backend managing users, internships, tasks, clients, and bills,
/// with auto-issued, publicly verifiable internship completion certificates.

pub mod account;
pub mod api;
pub mod artifact;
pub mod auth;
pub mod certificate;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod internship;
pub mod jobs;
pub mod metrics;
pub mod rate_limit;
pub mod records;
pub mod server;
