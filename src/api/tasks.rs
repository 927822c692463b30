/// Task endpoints (admin dashboard)
use crate::{
    auth::AdminAuthContext,
    context::AppContext,
    db::models::Task,
    error::{ApiError, ApiResult},
    records::{CreateTaskRequest, UpdateTaskRequest},
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

async fn list_tasks(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(ctx.task_manager.list().await?))
}

async fn create_task(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    Ok(Json(ctx.task_manager.create(req).await?))
}

async fn get_task(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    Ok(Json(ctx.task_manager.get(&id).await?))
}

async fn update_task(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    Ok(Json(ctx.task_manager.update(&id, req).await?))
}

async fn delete_task(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.task_manager.delete(&id).await?;
    Ok(Json(serde_json::json!({})))
}
