/// User administration endpoints
use crate::{
    account::{CreateUserRequest, UpdateUserRequest},
    auth::AdminAuthContext,
    context::AppContext,
    db::models::{Account, Role},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use validator::Validate;

/// Build user routes (all admin-gated)
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", patch(update_user))
}

/// List all user records
async fn list_users(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> ApiResult<Json<Vec<Account>>> {
    let accounts = ctx.account_manager.list_accounts().await?;
    Ok(Json(accounts))
}

/// Create a user with an explicit role and optional internship window
async fn create_user(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<Account>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let account = ctx
        .account_manager
        .create_account(
            req.name,
            req.email,
            req.password,
            req.role.unwrap_or(Role::Member),
            req.internship_start,
            req.internship_end,
        )
        .await?;

    Ok(Json(account))
}

/// Update a user (role, internship window, soft deactivation)
async fn update_user(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<Account>> {
    let account = ctx.account_manager.update_account(&id, req).await?;
    Ok(Json(account))
}
