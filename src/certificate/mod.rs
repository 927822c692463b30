/// Certificate registry
///
/// Mints unique, publicly verifiable completion certificates. The registry
/// persists certificate metadata before any artifact upload is attempted, so
/// verification works even while a rendered artifact is still pending.

mod registry;

pub use registry::CertificateRegistry;

use crate::db::models::Certificate;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Compact certificate summary returned alongside a completed internship
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    pub certificate_id: String,
    pub verify_url: String,
    pub artifact_url: Option<String>,
}

/// Public verification response.
///
/// Exposes only descriptive fields; internal record ids of unrelated
/// entities are never included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<VerifiedCertificate>,
}

/// Minimal descriptive fields for a verified certificate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCertificate {
    pub certificate_id: String,
    pub intern_name: String,
    pub internship_title: String,
    pub issued_at: DateTime<Utc>,
}

/// Full public display payload for the certificate page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub certificate_id: String,
    pub intern_name: String,
    pub internship_title: String,
    pub issued_at: DateTime<Utc>,
    pub artifact_url: Option<String>,
    pub verify_url: String,
}

impl VerifyResponse {
    pub fn valid(cert: &Certificate) -> Self {
        Self {
            valid: true,
            certificate: Some(VerifiedCertificate {
                certificate_id: cert.certificate_id.clone(),
                intern_name: cert.intern_name.clone(),
                internship_title: cert.internship_title.clone(),
                issued_at: cert.issued_at,
            }),
        }
    }

    pub fn invalid() -> Self {
        Self {
            valid: false,
            certificate: None,
        }
    }
}
