use axum::extract::State;
use axum::Extension;
use tracing::info;

use crate::api::response::{ApiResponse, JsonBody, PageResult, PathParam, QueryParams};
use crate::app::AppState;
use crate::auth::RequestContext;
use crate::entities::user;
use crate::error::AppResult;
use crate::services::{CreateUserInput, ListQuery, UpdateUserInput, UserWithRoles};

pub async fn list_users(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> AppResult<ApiResponse<PageResult<UserWithRoles>>> {
    let page = state.user_service.list_users(&query).await?;
    Ok(ApiResponse::success(page))
}

pub async fn get_user(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<i32>,
) -> AppResult<ApiResponse<UserWithRoles>> {
    let user = state.user_service.get_user(user_id).await?;
    Ok(ApiResponse::success(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    JsonBody(input): JsonBody<CreateUserInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.create_user(input).await?;
    info!(by = context.user_id, user_id = user.id, "created user via api");
    Ok(ApiResponse::success(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<i32>,
    JsonBody(input): JsonBody<UpdateUserInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.update_user(user_id, input).await?;
    Ok(ApiResponse::success(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    PathParam(user_id): PathParam<i32>,
) -> AppResult<ApiResponse<()>> {
    state.user_service.delete_user(user_id).await?;
    info!(by = context.user_id, user_id, "deleted user via api");
    Ok(ApiResponse::ok())
}
