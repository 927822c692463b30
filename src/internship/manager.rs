/// Internship lifecycle manager implementation
use crate::{
    account::AccountManager,
    artifact::ArtifactStore,
    certificate::CertificateRegistry,
    db::models::{Certificate, Internship, InternshipStatus},
    error::{is_unique_violation, ApiError, ApiResult},
    internship::{CreateInternshipRequest, MyInternshipResponse},
    metrics,
};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

/// Internship lifecycle manager service
pub struct InternshipManager {
    db: SqlitePool,
    accounts: Arc<AccountManager>,
    registry: Arc<CertificateRegistry>,
    artifacts: Option<Arc<ArtifactStore>>,
}

impl InternshipManager {
    pub fn new(
        db: SqlitePool,
        accounts: Arc<AccountManager>,
        registry: Arc<CertificateRegistry>,
        artifacts: Option<Arc<ArtifactStore>>,
    ) -> Self {
        Self {
            db,
            accounts,
            registry,
            artifacts,
        }
    }

    /// Create an internship for an intern.
    ///
    /// The partial unique index on non-completed internships enforces at
    /// most one active internship per intern.
    pub async fn create(&self, req: CreateInternshipRequest) -> ApiResult<Internship> {
        if req.end_date <= req.start_date {
            return Err(ApiError::Validation(
                "End date must be after start date".to_string(),
            ));
        }

        let intern = self.accounts.get_account(&req.intern_id).await?;
        if intern.deactivated_at.is_some() {
            return Err(ApiError::Validation(
                "Cannot create an internship for a deactivated account".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO internship (id, intern_id, title, start_date, end_date, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&id)
        .bind(&req.intern_id)
        .bind(&req.title)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(InternshipStatus::Pending.as_str())
        .bind(now)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            if is_unique_violation(&e) {
                return Err(ApiError::Conflict(
                    "Intern already has an active internship".to_string(),
                ));
            }
            return Err(ApiError::Database(e));
        }

        Ok(Internship {
            id,
            intern_id: req.intern_id,
            title: req.title,
            start_date: req.start_date,
            end_date: req.end_date,
            status: InternshipStatus::Pending,
            certificate_id: None,
            created_at: now,
            completed_at: None,
        })
    }

    /// Advance an internship's status. Transitions are forward-only, and
    /// completion must go through `complete` so a certificate is issued.
    pub async fn update_status(
        &self,
        internship_id: &str,
        new_status: InternshipStatus,
    ) -> ApiResult<Internship> {
        if new_status == InternshipStatus::Completed {
            return Err(ApiError::Validation(
                "Completion goes through the completion endpoint".to_string(),
            ));
        }

        let internship = self.get(internship_id).await?;

        if !internship.status.can_transition_to(new_status) {
            return Err(ApiError::Conflict(format!(
                "Cannot transition from {} to {}",
                internship.status.as_str(),
                new_status.as_str()
            )));
        }

        // Guard on the status we read so a racing completion cannot be
        // rolled backward between the check and the write.
        let updated = sqlx::query("UPDATE internship SET status = ?1 WHERE id = ?2 AND status = ?3")
            .bind(new_status.as_str())
            .bind(internship_id)
            .bind(internship.status.as_str())
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::Conflict(
                "Internship status changed concurrently".to_string(),
            ));
        }

        self.get(internship_id).await
    }

    /// Complete an internship and issue its certificate.
    ///
    /// The status transition is a storage-level compare-and-set: of two
    /// simultaneous completion requests only one flips the row, and the
    /// loser receives the existing certificate rather than an error.
    /// Certificate metadata is durable before any artifact upload starts;
    /// upload failures never fail completion.
    pub async fn complete(&self, internship_id: &str) -> ApiResult<(Internship, Certificate)> {
        let internship = self.get(internship_id).await?;

        let now = Utc::now();
        let updated = sqlx::query(
            "UPDATE internship SET status = ?1, completed_at = ?2 WHERE id = ?3 AND status != ?1",
        )
        .bind(InternshipStatus::Completed.as_str())
        .bind(now)
        .bind(internship_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        if updated.rows_affected() == 0 {
            // Already completed (idempotent retry or a lost race). Return
            // the existing certificate when there is one; if issuance never
            // finished, fall through and let the registry's idempotent
            // issue converge.
            if let Some(cert) = self.registry.find_for_internship(internship_id).await? {
                let internship = self.get(internship_id).await?;
                return Ok((internship, cert));
            }
        }

        let intern = self.accounts.get_account(&internship.intern_id).await?;
        let certificate = self.registry.issue(&internship, &intern.name).await?;

        // Link the certificate back onto the internship and the owning
        // account.
        sqlx::query("UPDATE internship SET certificate_id = ?1 WHERE id = ?2")
            .bind(&certificate.certificate_id)
            .bind(internship_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        self.accounts
            .link_certificate(&internship.intern_id, &certificate.certificate_id)
            .await?;

        self.spawn_artifact_upload(certificate.clone());

        let internship = self.get(internship_id).await?;
        Ok((internship, certificate))
    }

    /// Manual completion path: resolve the intern's active internship and
    /// complete it.
    pub async fn complete_for_intern(
        &self,
        intern_id: &str,
    ) -> ApiResult<(Internship, Certificate)> {
        let row = sqlx::query(
            "SELECT id FROM internship WHERE intern_id = ?1 AND status != ?2",
        )
        .bind(intern_id)
        .bind(InternshipStatus::Completed.as_str())
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No active internship for intern {}", intern_id))
        })?;

        let internship_id: String = row.get("id");
        self.complete(&internship_id).await
    }

    /// An intern's own (latest) internship with certificate summary
    pub async fn get_own(&self, intern_id: &str) -> ApiResult<MyInternshipResponse> {
        let row = sqlx::query(
            "SELECT * FROM internship WHERE intern_id = ?1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(intern_id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("No internship on record".to_string()))?;

        let internship = internship_from_row(&row)?;
        let certificate = self
            .registry
            .find_for_internship(&internship.id)
            .await?
            .map(|c| self.registry.summary(&c));

        Ok(MyInternshipResponse {
            internship,
            certificate,
        })
    }

    /// Get an internship by id
    pub async fn get(&self, internship_id: &str) -> ApiResult<Internship> {
        let row = sqlx::query("SELECT * FROM internship WHERE id = ?1")
            .bind(internship_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Internship {} not found", internship_id))
            })?;

        internship_from_row(&row)
    }

    /// List all internships (admin dashboard)
    pub async fn list(&self) -> ApiResult<Vec<Internship>> {
        let rows = sqlx::query("SELECT * FROM internship ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)?;

        rows.iter().map(internship_from_row).collect()
    }

    /// Retry the artifact upload for an issued certificate (admin action)
    pub async fn retry_artifact(&self, certificate_id: &str) -> ApiResult<Certificate> {
        let certificate = self.registry.get(certificate_id).await?;

        let store = self.artifacts.as_ref().ok_or_else(|| {
            ApiError::Validation("Artifact store is not configured".to_string())
        })?;

        let url = store
            .upload(&certificate)
            .await
            .map_err(|e| ApiError::ArtifactStorage(e.to_string()))?;

        self.registry
            .attach_artifact(&certificate.certificate_id, &url)
            .await
    }

    /// Fire-and-forget artifact upload. Issuance is never blocked on the
    /// external host; failures are logged and left for the retry job.
    fn spawn_artifact_upload(&self, certificate: Certificate) {
        let Some(store) = self.artifacts.clone() else {
            tracing::debug!(
                "No artifact store configured; certificate {} issued without artifact",
                certificate.certificate_id
            );
            return;
        };
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            match store.upload(&certificate).await {
                Ok(url) => {
                    match registry
                        .attach_artifact(&certificate.certificate_id, &url)
                        .await
                    {
                        Ok(_) => metrics::ARTIFACT_UPLOADS_TOTAL.inc(),
                        Err(e) => tracing::error!(
                            "Failed to attach artifact to {}: {}",
                            certificate.certificate_id,
                            e
                        ),
                    }
                }
                Err(e) => {
                    metrics::ARTIFACT_UPLOADS_FAILED_TOTAL.inc();
                    tracing::warn!(
                        "Artifact upload failed for {} (artifact pending): {}",
                        certificate.certificate_id,
                        e
                    );
                }
            }
        });
    }
}

/// Map a database row to an Internship
fn internship_from_row(row: &SqliteRow) -> ApiResult<Internship> {
    let status = InternshipStatus::from_str(row.get::<String, _>("status").as_str())?;

    Ok(Internship {
        id: row.get("id"),
        intern_id: row.get("intern_id"),
        title: row.get("title"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status,
        certificate_id: row.get("certificate_id"),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    })
}
