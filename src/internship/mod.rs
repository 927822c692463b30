/// Internship lifecycle management
///
/// The completion workflow lives here: validating eligibility, atomically
/// transitioning status, and triggering certificate issuance.

mod manager;

pub use manager::InternshipManager;

use crate::{
    certificate::CertificateSummary,
    db::models::{Internship, InternshipStatus},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Internship creation request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInternshipRequest {
    pub intern_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Status update request (forward transitions only)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: InternshipStatus,
}

/// Response for a completion: the canonical updated internship plus the
/// certificate summary. No follow-up fetch is needed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub internship: Internship,
    pub certificate: CertificateSummary,
}

/// An intern's own internship with its certificate summary, if issued
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyInternshipResponse {
    pub internship: Internship,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateSummary>,
}
