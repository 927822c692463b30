/// Client endpoints (admin dashboard)
use crate::{
    auth::AdminAuthContext,
    context::AppContext,
    db::models::Client,
    error::{ApiError, ApiResult},
    records::{CreateClientRequest, UpdateClientRequest},
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

async fn list_clients(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> ApiResult<Json<Vec<Client>>> {
    Ok(Json(ctx.client_manager.list().await?))
}

async fn create_client(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Json(req): Json<CreateClientRequest>,
) -> ApiResult<Json<Client>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    Ok(Json(ctx.client_manager.create(req).await?))
}

async fn get_client(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    Ok(Json(ctx.client_manager.get(&id).await?))
}

async fn update_client(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
    Json(req): Json<UpdateClientRequest>,
) -> ApiResult<Json<Client>> {
    Ok(Json(ctx.client_manager.update(&id, req).await?))
}

async fn delete_client(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.client_manager.delete(&id).await?;
    Ok(Json(serde_json::json!({})))
}
