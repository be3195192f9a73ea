//! Authentication API endpoints.

use axum::extract::{Extension, State};

use super::extract::Json;
use super::{error, success, ApiResult};
use crate::auth::Claims;
use crate::models::{LoginRequest, LoginResponse, User, Validate};
use crate::AppState;

/// POST /api/auth/login - Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if let Err(e) = request.validate() {
        return error(e.into());
    }

    match state.authenticator.login(&request) {
        Ok(response) => success(response),
        Err(e) => error(e),
    }
}

/// POST /api/auth/logout - Revoke the presented token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<()> {
    state.authenticator.revoke(&claims).await;
    tracing::info!("User '{}' logged out", claims.sub);
    success(())
}

/// GET /api/auth/me - The user behind the presented token.
pub async fn me(Extension(claims): Extension<Claims>) -> ApiResult<User> {
    success(claims.user())
}
