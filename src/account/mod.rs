/// Identity & access layer
///
/// Handles account registration, login, sessions, and role lookups for the
/// admin/intern/member roles consumed by the rest of the API.

mod manager;

pub use manager::AccountManager;

use crate::db::models::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Self-registration request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 256))]
    pub password: String,
}

/// Admin account-creation request (may set role and internship window)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 256))]
    pub password: String,
    pub role: Option<Role>,
    pub internship_start: Option<DateTime<Utc>>,
    pub internship_end: Option<DateTime<Utc>>,
}

/// Admin account update request (role/status changes; no hard deletes)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub internship_start: Option<DateTime<Utc>>,
    pub internship_end: Option<DateTime<Utc>>,
    pub deactivated: Option<bool>,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login/session response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Session info (for GET /session)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Validated session from a bearer token
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub account_id: String,
    pub session_id: String,
    pub role: Role,
}

/// JWT claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Account id
    pub sub: String,
    /// Session id
    pub sid: String,
    pub role: String,
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}
