/// Certificate registry implementation
use crate::{
    certificate::{CertificateSummary, VerifyResponse, ViewResponse},
    db::models::{Certificate, Internship},
    error::{is_unique_violation, ApiError, ApiResult},
    metrics,
};
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Fixed prefix of every certificate identifier
const ID_PREFIX: &str = "NEX";
/// Length of the random segment
const RANDOM_LEN: usize = 8;
/// Hex characters in the checksum suffix
const CHECKSUM_LEN: usize = 6;
/// Attempts before giving up on an id collision.
///
/// The database UNIQUE constraint is the correctness guarantee; the random
/// segment only has to avoid collisions often enough that a handful of
/// retries always succeeds.
const MAX_MINT_ATTEMPTS: u32 = 5;

/// Certificate registry service
pub struct CertificateRegistry {
    db: SqlitePool,
    signing_secret: String,
    public_url: String,
}

impl CertificateRegistry {
    pub fn new(db: SqlitePool, signing_secret: String, public_url: String) -> Self {
        Self {
            db,
            signing_secret,
            public_url,
        }
    }

    /// Issue a certificate for a completed internship.
    ///
    /// Idempotent: issuing twice for the same internship returns the
    /// existing certificate, enforced by UNIQUE(internship_id). An id
    /// collision on UNIQUE(certificate_id) is retried with fresh randomness
    /// and never surfaces to the caller.
    pub async fn issue(&self, internship: &Internship, intern_name: &str) -> ApiResult<Certificate> {
        if let Some(existing) = self.find_for_internship(&internship.id).await? {
            return Ok(existing);
        }

        for attempt in 0..MAX_MINT_ATTEMPTS {
            let issued_at = Utc::now();
            let certificate_id =
                self.generate_certificate_id(&internship.id, issued_at);
            let id = Uuid::new_v4().to_string();

            let result = sqlx::query(
                "INSERT INTO certificate (id, certificate_id, internship_id, intern_id, intern_name, internship_title, issued_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&id)
            .bind(&certificate_id)
            .bind(&internship.id)
            .bind(&internship.intern_id)
            .bind(intern_name)
            .bind(&internship.title)
            .bind(issued_at)
            .execute(&self.db)
            .await;

            match result {
                Ok(_) => {
                    metrics::CERTIFICATES_ISSUED_TOTAL.inc();
                    tracing::info!(
                        "Issued certificate {} for internship {}",
                        certificate_id,
                        internship.id
                    );
                    return Ok(Certificate {
                        id,
                        certificate_id,
                        internship_id: internship.id.clone(),
                        intern_id: internship.intern_id.clone(),
                        intern_name: intern_name.to_string(),
                        internship_title: internship.title.clone(),
                        issued_at,
                        artifact_url: None,
                        artifact_uploaded_at: None,
                    });
                }
                Err(e) if is_unique_violation(&e) => {
                    // A concurrent issuance for the same internship wins the
                    // race; return its certificate rather than erroring.
                    if let Some(existing) = self.find_for_internship(&internship.id).await? {
                        return Ok(existing);
                    }
                    // Otherwise the display id collided; retry with fresh
                    // randomness.
                    tracing::warn!(
                        "Certificate id collision on attempt {}, retrying",
                        attempt + 1
                    );
                }
                Err(e) => return Err(ApiError::Database(e)),
            }
        }

        Err(ApiError::Internal(
            "Exhausted certificate id generation attempts".to_string(),
        ))
    }

    /// Attach a hosted artifact URL to an already-issued certificate.
    ///
    /// The certificate id never changes; a failed upload can be retried
    /// later and attached with this call.
    pub async fn attach_artifact(&self, certificate_id: &str, url: &str) -> ApiResult<Certificate> {
        let result = sqlx::query(
            "UPDATE certificate SET artifact_url = ?1, artifact_uploaded_at = ?2 WHERE certificate_id = ?3",
        )
        .bind(url)
        .bind(Utc::now())
        .bind(certificate_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!(
                "Certificate {} not found",
                certificate_id
            )));
        }

        self.get(certificate_id).await
    }

    /// Public verification lookup. Unknown ids yield `valid: false`,
    /// never an error.
    pub async fn verify(&self, certificate_id: &str) -> ApiResult<VerifyResponse> {
        match self.find(certificate_id).await? {
            Some(cert) => Ok(VerifyResponse::valid(&cert)),
            None => Ok(VerifyResponse::invalid()),
        }
    }

    /// Public display payload for the certificate page
    pub async fn view(&self, certificate_id: &str) -> ApiResult<ViewResponse> {
        let cert = self.get(certificate_id).await?;

        Ok(ViewResponse {
            verify_url: self.verify_url(&cert.certificate_id),
            certificate_id: cert.certificate_id,
            intern_name: cert.intern_name,
            internship_title: cert.internship_title,
            issued_at: cert.issued_at,
            artifact_url: cert.artifact_url,
        })
    }

    /// Get a certificate by display id, or 404
    pub async fn get(&self, certificate_id: &str) -> ApiResult<Certificate> {
        self.find(certificate_id).await?.ok_or_else(|| {
            ApiError::NotFound(format!("Certificate {} not found", certificate_id))
        })
    }

    /// Find a certificate by display id
    pub async fn find(&self, certificate_id: &str) -> ApiResult<Option<Certificate>> {
        let row = sqlx::query("SELECT * FROM certificate WHERE certificate_id = ?1")
            .bind(certificate_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?;

        row.as_ref().map(certificate_from_row).transpose()
    }

    /// Find the certificate for an internship, if one was issued
    pub async fn find_for_internship(&self, internship_id: &str) -> ApiResult<Option<Certificate>> {
        let row = sqlx::query("SELECT * FROM certificate WHERE internship_id = ?1")
            .bind(internship_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?;

        row.as_ref().map(certificate_from_row).transpose()
    }

    /// List all issued certificates (admin dashboard)
    pub async fn list(&self) -> ApiResult<Vec<Certificate>> {
        let rows = sqlx::query("SELECT * FROM certificate ORDER BY issued_at DESC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)?;

        rows.iter().map(certificate_from_row).collect()
    }

    /// Certificates issued without a hosted artifact (for the retry job)
    pub async fn list_pending_artifacts(&self, limit: i64) -> ApiResult<Vec<Certificate>> {
        let rows = sqlx::query(
            "SELECT * FROM certificate WHERE artifact_url IS NULL ORDER BY issued_at ASC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        rows.iter().map(certificate_from_row).collect()
    }

    /// Build the compact summary returned with a completed internship
    pub fn summary(&self, cert: &Certificate) -> CertificateSummary {
        CertificateSummary {
            certificate_id: cert.certificate_id.clone(),
            verify_url: self.verify_url(&cert.certificate_id),
            artifact_url: cert.artifact_url.clone(),
        }
    }

    /// Public verification URL for a certificate id
    pub fn verify_url(&self, certificate_id: &str) -> String {
        format!("{}/certificates/verify/{}", self.public_url, certificate_id)
    }

    /// Generate a display id: fixed prefix, random segment, checksum suffix
    /// derived from the internship id and issuance time.
    fn generate_certificate_id(&self, internship_id: &str, issued_at: DateTime<Utc>) -> String {
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RANDOM_LEN)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();

        let checksum = self.checksum_suffix(internship_id, issued_at);

        format!("{}-{}-{}", ID_PREFIX, random, checksum)
    }

    /// Checksum suffix: first bytes of SHA-256 over internship id, issuance
    /// time, and the signing secret, hex-encoded uppercase.
    fn checksum_suffix(&self, internship_id: &str, issued_at: DateTime<Utc>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(internship_id.as_bytes());
        hasher.update(issued_at.to_rfc3339().as_bytes());
        hasher.update(self.signing_secret.as_bytes());
        let digest = hasher.finalize();

        hex::encode(&digest[..CHECKSUM_LEN / 2]).to_uppercase()
    }
}

/// Map a database row to a Certificate
fn certificate_from_row(row: &SqliteRow) -> ApiResult<Certificate> {
    Ok(Certificate {
        id: row.get("id"),
        certificate_id: row.get("certificate_id"),
        internship_id: row.get("internship_id"),
        intern_id: row.get("intern_id"),
        intern_name: row.get("intern_name"),
        internship_title: row.get("internship_title"),
        issued_at: row.get("issued_at"),
        artifact_url: row.get("artifact_url"),
        artifact_uploaded_at: row.get("artifact_uploaded_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The lazy pool spawns its maintenance task on the current runtime, so
    // even the pure id-generation tests run under tokio.
    fn registry() -> CertificateRegistry {
        let pool = SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        CertificateRegistry::new(
            pool,
            "test-signing-secret".to_string(),
            "http://localhost:4000".to_string(),
        )
    }

    #[tokio::test]
    async fn certificate_id_has_expected_shape() {
        let reg = registry();
        let id = reg.generate_certificate_id("internship-1", Utc::now());

        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "NEX");
        assert_eq!(parts[1].len(), RANDOM_LEN);
        assert_eq!(parts[2].len(), CHECKSUM_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn checksum_is_stable_for_same_inputs() {
        let reg = registry();
        let at = Utc::now();

        assert_eq!(
            reg.checksum_suffix("internship-1", at),
            reg.checksum_suffix("internship-1", at)
        );
        assert_ne!(
            reg.checksum_suffix("internship-1", at),
            reg.checksum_suffix("internship-2", at)
        );
    }

    #[tokio::test]
    async fn random_segments_do_not_repeat_in_practice() {
        use std::collections::HashSet;

        let reg = registry();
        let at = Utc::now();
        let ids: HashSet<String> = (0..100)
            .map(|_| reg.generate_certificate_id("internship-1", at))
            .collect();

        assert_eq!(ids.len(), 100);
    }
}
