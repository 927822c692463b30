/// Certificate endpoints
///
/// Verification and viewing are public by design: anyone holding a
/// certificate id can confirm it without authentication.
use crate::{
    auth::AdminAuthContext,
    certificate::{VerifyResponse, ViewResponse},
    context::AppContext,
    db::models::Certificate,
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

/// Build certificate routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/certificates", get(list_certificates))
        .route("/certificates/verify/:certificate_id", get(verify))
        .route("/certificates/view/:certificate_id", get(view))
        .route(
            "/certificates/:certificate_id/retry-artifact",
            post(retry_artifact),
        )
}

/// List issued certificates (admin)
async fn list_certificates(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> ApiResult<Json<Vec<Certificate>>> {
    let certificates = ctx.certificate_registry.list().await?;
    Ok(Json(certificates))
}

/// Public verification by certificate id. Unknown ids return
/// `valid: false` rather than an error.
async fn verify(
    State(ctx): State<AppContext>,
    Path(certificate_id): Path<String>,
) -> ApiResult<Json<VerifyResponse>> {
    let response = ctx.certificate_registry.verify(&certificate_id).await?;
    Ok(Json(response))
}

/// Public display payload for the certificate page
async fn view(
    State(ctx): State<AppContext>,
    Path(certificate_id): Path<String>,
) -> ApiResult<Json<ViewResponse>> {
    let response = ctx.certificate_registry.view(&certificate_id).await?;
    Ok(Json(response))
}

/// Retry a pending artifact upload (admin). The certificate id never
/// changes; only the artifact URL is attached.
async fn retry_artifact(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(certificate_id): Path<String>,
) -> ApiResult<Json<Certificate>> {
    let certificate = ctx
        .internship_manager
        .retry_artifact(&certificate_id)
        .await?;
    Ok(Json(certificate))
}
