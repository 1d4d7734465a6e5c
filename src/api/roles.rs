use axum::extract::State;

use crate::api::response::{ApiResponse, JsonBody, PageResult, PathParam, QueryParams};
use crate::app::AppState;
use crate::entities::role;
use crate::error::AppResult;
use crate::services::{ListQuery, RoleInput};

pub async fn list_roles(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> AppResult<ApiResponse<PageResult<role::Model>>> {
    let page = state.role_service.list_roles(&query).await?;
    Ok(ApiResponse::success(page))
}

pub async fn get_role(
    State(state): State<AppState>,
    PathParam(role_id): PathParam<i32>,
) -> AppResult<ApiResponse<role::Model>> {
    let role = state.role_service.get_role(role_id).await?;
    Ok(ApiResponse::success(role))
}

pub async fn create_role(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RoleInput>,
) -> AppResult<ApiResponse<role::Model>> {
    let role = state.role_service.create_role(input).await?;
    Ok(ApiResponse::success(role))
}

pub async fn update_role(
    State(state): State<AppState>,
    PathParam(role_id): PathParam<i32>,
    JsonBody(input): JsonBody<RoleInput>,
) -> AppResult<ApiResponse<role::Model>> {
    let role = state.role_service.update_role(role_id, input).await?;
    Ok(ApiResponse::success(role))
}

pub async fn delete_role(
    State(state): State<AppState>,
    PathParam(role_id): PathParam<i32>,
) -> AppResult<ApiResponse<()>> {
    state.role_service.delete_role(role_id).await?;
    Ok(ApiResponse::ok())
}

pub async fn role_menus(
    State(state): State<AppState>,
    PathParam(role_id): PathParam<i32>,
) -> AppResult<ApiResponse<Vec<i32>>> {
    let menu_ids = state.role_service.role_menus(role_id).await?;
    Ok(ApiResponse::success(menu_ids))
}

/// Body is a bare JSON array of menu ids.
pub async fn assign_role_menus(
    State(state): State<AppState>,
    PathParam(role_id): PathParam<i32>,
    JsonBody(menu_ids): JsonBody<Vec<i32>>,
) -> AppResult<ApiResponse<()>> {
    state.role_service.assign_role_menus(role_id, &menu_ids).await?;
    Ok(ApiResponse::ok())
}
