/// Background task implementations
use crate::{context::AppContext, error::ApiResult, metrics};

/// Cleanup expired sessions
pub async fn cleanup_expired_sessions(ctx: &AppContext) -> ApiResult<u64> {
    ctx.account_manager.cleanup_expired_sessions().await
}

/// Retry artifact uploads for certificates still in the artifact-pending
/// state. Individual failures are logged and left for the next run.
pub async fn retry_pending_artifacts(ctx: &AppContext) -> ApiResult<u64> {
    let Some(store) = ctx.artifact_store.as_ref() else {
        // No artifact host configured; nothing to retry
        return Ok(0);
    };

    let pending = ctx.certificate_registry.list_pending_artifacts(50).await?;
    let mut attached = 0;

    for certificate in pending {
        match store.upload(&certificate).await {
            Ok(url) => {
                ctx.certificate_registry
                    .attach_artifact(&certificate.certificate_id, &url)
                    .await?;
                metrics::ARTIFACT_UPLOADS_TOTAL.inc();
                attached += 1;
            }
            Err(e) => {
                metrics::ARTIFACT_UPLOADS_FAILED_TOTAL.inc();
                tracing::warn!(
                    "Artifact upload retry failed for {}: {}",
                    certificate.certificate_id,
                    e
                );
            }
        }
    }

    Ok(attached)
}

/// Health check - verify the database is reachable
pub async fn health_check(ctx: &AppContext) -> ApiResult<()> {
    sqlx::query("SELECT 1").fetch_one(&ctx.db).await?;

    Ok(())
}
