/// Bill endpoints (admin dashboard)
use crate::{
    auth::AdminAuthContext,
    context::AppContext,
    db::models::Bill,
    error::{ApiError, ApiResult},
    records::{CreateBillRequest, UpdateBillRequest},
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/bills", get(list_bills).post(create_bill))
        .route(
            "/bills/:id",
            get(get_bill).put(update_bill).delete(delete_bill),
        )
}

async fn list_bills(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> ApiResult<Json<Vec<Bill>>> {
    Ok(Json(ctx.bill_manager.list().await?))
}

async fn create_bill(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Json(req): Json<CreateBillRequest>,
) -> ApiResult<Json<Bill>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    Ok(Json(ctx.bill_manager.create(req).await?))
}

async fn get_bill(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Bill>> {
    Ok(Json(ctx.bill_manager.get(&id).await?))
}

async fn update_bill(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
    Json(req): Json<UpdateBillRequest>,
) -> ApiResult<Json<Bill>> {
    Ok(Json(ctx.bill_manager.update(&id, req).await?))
}

async fn delete_bill(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.bill_manager.delete(&id).await?;
    Ok(Json(serde_json::json!({})))
}
