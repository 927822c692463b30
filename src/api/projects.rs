/// Project endpoints (admin dashboard)
use crate::{
    auth::AdminAuthContext,
    context::AppContext,
    db::models::Project,
    error::{ApiError, ApiResult},
    records::{CreateProjectRequest, UpdateProjectRequest},
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

async fn list_projects(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(ctx.project_manager.list().await?))
}

async fn create_project(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    Ok(Json(ctx.project_manager.create(req).await?))
}

async fn get_project(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    Ok(Json(ctx.project_manager.get(&id).await?))
}

async fn update_project(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    Ok(Json(ctx.project_manager.update(&id, req).await?))
}

async fn delete_project(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.project_manager.delete(&id).await?;
    Ok(Json(serde_json::json!({})))
}
