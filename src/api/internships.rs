/// Internship lifecycle endpoints
use crate::{
    auth::{AdminAuthContext, AuthContext},
    context::AppContext,
    db::models::Internship,
    error::{ApiError, ApiResult},
    internship::{
        CompletionResponse, CreateInternshipRequest, MyInternshipResponse, UpdateStatusRequest,
    },
    metrics,
};
use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use validator::Validate;

/// Build internship routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/internships", get(list_internships).post(create_internship))
        .route("/internships/:id", get(get_internship))
        .route("/internships/:id/status", patch(update_status))
        .route(
            "/internship-management/complete/:internship_id",
            post(complete),
        )
        .route(
            "/internship-management/complete-manual/:intern_id",
            post(complete_manual),
        )
        .route("/internship-management/me", get(my_internship))
}

/// List all internships (admin)
async fn list_internships(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> ApiResult<Json<Vec<Internship>>> {
    let internships = ctx.internship_manager.list().await?;
    Ok(Json(internships))
}

/// Create an internship (admin)
async fn create_internship(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Json(req): Json<CreateInternshipRequest>,
) -> ApiResult<Json<Internship>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let internship = ctx.internship_manager.create(req).await?;
    Ok(Json(internship))
}

/// Get an internship (admin)
async fn get_internship(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Internship>> {
    let internship = ctx.internship_manager.get(&id).await?;
    Ok(Json(internship))
}

/// Advance internship status (admin; forward transitions only)
async fn update_status(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Internship>> {
    let internship = ctx.internship_manager.update_status(&id, req.status).await?;
    Ok(Json(internship))
}

/// Complete an internship and issue its certificate (admin).
///
/// Idempotent: a duplicate request returns the same certificate.
async fn complete(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(internship_id): Path<String>,
) -> ApiResult<Json<CompletionResponse>> {
    let (internship, certificate) = ctx.internship_manager.complete(&internship_id).await?;
    metrics::INTERNSHIP_COMPLETIONS_TOTAL.inc();
    let certificate = ctx.certificate_registry.summary(&certificate);

    Ok(Json(CompletionResponse {
        internship,
        certificate,
    }))
}

/// Complete an intern's active internship by intern id (admin)
async fn complete_manual(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(intern_id): Path<String>,
) -> ApiResult<Json<CompletionResponse>> {
    let (internship, certificate) = ctx
        .internship_manager
        .complete_for_intern(&intern_id)
        .await?;
    metrics::INTERNSHIP_COMPLETIONS_TOTAL.inc();
    let certificate = ctx.certificate_registry.summary(&certificate);

    Ok(Json(CompletionResponse {
        internship,
        certificate,
    }))
}

/// The caller's own internship with certificate summary
async fn my_internship(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ApiResult<Json<MyInternshipResponse>> {
    let response = ctx.internship_manager.get_own(&auth.account_id).await?;
    Ok(Json(response))
}
