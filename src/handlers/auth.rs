//! Token issuance and identity endpoints.

use axum::extract::Extension;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{decode_jwt, generate_jwt, verify_password, Claims};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

/// POST /api/v1/user/token/ - exchange credentials for a JWT
pub async fn token_obtain(
    Extension(state): Extension<AppState>,
    axum::Json(body): axum::Json<TokenRequest>,
) -> ApiResult<Value> {
    let user = state
        .store
        .user_by_email(&body.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !user.is_active || !verify_password(&user.email, &body.password, &user.password_digest) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let claims = Claims::new(user.id, user.email.clone(), user.role, user.is_staff);
    let token =
        generate_jwt(&claims).map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    tracing::info!(user = %user.id, "token issued");
    Ok(ApiResponse::success(json!({
        "token": token,
        "expires_at": claims.exp,
        "user": user.to_view(),
    })))
}

/// POST /api/v1/user/token/refresh/ - re-issue a token that still validates
pub async fn token_refresh(
    Extension(state): Extension<AppState>,
    axum::Json(body): axum::Json<RefreshRequest>,
) -> ApiResult<Value> {
    let claims = decode_jwt(&body.token).map_err(|e| ApiError::unauthorized(e.to_string()))?;

    // Re-check the principal so a deactivated user cannot keep refreshing.
    let user = state
        .store
        .user_by_id(claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let fresh = Claims::new(user.id, user.email.clone(), user.role, user.is_staff);
    let token =
        generate_jwt(&fresh).map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "expires_at": fresh.exp,
    })))
}

/// GET /api/v1/user/whoami/ - identity behind the presented token
pub async fn whoami(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "id": auth.user_id,
        "email": auth.email,
        "role": auth.role,
        "is_staff": auth.is_staff,
    })))
}
