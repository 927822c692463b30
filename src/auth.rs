/// Authentication extractors and utilities
use crate::{
    account::ValidatedSession,
    api::middleware::extract_bearer_token,
    context::AppContext,
    db::models::Role,
    error::ApiError,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Authenticated context - extracts and validates session from request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: String,
    pub session: ValidatedSession,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Authentication("Missing authorization header".to_string()))?;

        let session = state.account_manager.validate_access_token(&token).await?;
        let account_id = session.account_id.clone();

        Ok(AuthContext {
            account_id,
            session,
        })
    }
}

/// Admin authentication context - requires the admin role
#[derive(Debug, Clone)]
pub struct AdminAuthContext {
    pub account_id: String,
    pub session: ValidatedSession,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;

        if auth.session.role != Role::Admin {
            tracing::warn!(
                "Account {} attempted an admin operation without the admin role",
                auth.account_id
            );
            return Err(ApiError::Authorization("Admin role required".to_string()));
        }

        Ok(AdminAuthContext {
            account_id: auth.account_id,
            session: auth.session,
        })
    }
}
