use axum::extract::State;
use axum::Extension;

use crate::api::response::{ApiResponse, JsonBody};
use crate::app::AppState;
use crate::auth::RequestContext;
use crate::error::AppResult;
use crate::services::{LoginRequest, LoginResponse, UserInfo};

pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let response = state.auth_service.login(request).await?;
    Ok(ApiResponse::success(response))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> ApiResponse<()> {
    ApiResponse::ok()
}

pub async fn user_info(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> AppResult<ApiResponse<UserInfo>> {
    let info = state.auth_service.user_info(context.user_id).await?;
    Ok(ApiResponse::success(info))
}

pub async fn permissions(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let permissions = state.auth_service.permissions(context.user_id).await?;
    Ok(ApiResponse::success(permissions))
}
