/// Registration, login, and session endpoints
use crate::{
    account::{LoginRequest, RegisterRequest, SessionInfo, SessionResponse},
    auth::AuthContext,
    context::AppContext,
    db::models::Role,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

/// Build session routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/session", get(get_session))
        .route("/logout", post(logout))
}

/// Self-registration endpoint. New accounts get the member role; only an
/// admin may elevate them afterwards.
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let account = ctx
        .account_manager
        .create_account(req.name, req.email, req.password, Role::Member, None, None)
        .await?;

    tracing::info!("Registered account {}", account.id);

    let session = ctx.account_manager.create_session(&account).await?;

    Ok(Json(SessionResponse {
        token: session.access_token,
        user_id: account.id,
        name: account.name,
        email: account.email,
        role: account.role,
    }))
}

/// Login endpoint
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let (account, session) = ctx.account_manager.login(&req.email, &req.password).await?;

    Ok(Json(SessionResponse {
        token: session.access_token,
        user_id: account.id,
        name: account.name,
        email: account.email,
        role: account.role,
    }))
}

/// Current session info
async fn get_session(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ApiResult<Json<SessionInfo>> {
    let account = ctx.account_manager.get_account(&auth.account_id).await?;

    Ok(Json(SessionInfo {
        user_id: account.id,
        name: account.name,
        email: account.email,
        role: account.role,
    }))
}

/// Logout (delete session)
async fn logout(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.account_manager
        .delete_session(&auth.session.session_id)
        .await?;

    Ok(Json(serde_json::json!({})))
}
