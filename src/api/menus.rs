use axum::extract::State;
use axum::Extension;

use crate::api::response::{ApiResponse, JsonBody, PathParam};
use crate::app::AppState;
use crate::auth::RequestContext;
use crate::entities::menu;
use crate::error::AppResult;
use crate::services::{MenuInput, MenuNode};

pub async fn menu_tree(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<MenuNode>>> {
    let tree = state.menu_service.menu_tree().await?;
    Ok(ApiResponse::success(tree))
}

/// Navigation for the caller: only `menu` rows reachable through their roles.
pub async fn user_menus(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> AppResult<ApiResponse<Vec<MenuNode>>> {
    let tree = state
        .permission_service
        .get_user_menu_tree(context.user_id)
        .await?;
    Ok(ApiResponse::success(tree))
}

pub async fn get_menu(
    State(state): State<AppState>,
    PathParam(menu_id): PathParam<i32>,
) -> AppResult<ApiResponse<menu::Model>> {
    let menu = state.menu_service.get_menu(menu_id).await?;
    Ok(ApiResponse::success(menu))
}

pub async fn create_menu(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<MenuInput>,
) -> AppResult<ApiResponse<menu::Model>> {
    let menu = state.menu_service.create_menu(input).await?;
    Ok(ApiResponse::success(menu))
}

pub async fn update_menu(
    State(state): State<AppState>,
    PathParam(menu_id): PathParam<i32>,
    JsonBody(input): JsonBody<MenuInput>,
) -> AppResult<ApiResponse<menu::Model>> {
    let menu = state.menu_service.update_menu(menu_id, input).await?;
    Ok(ApiResponse::success(menu))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    PathParam(menu_id): PathParam<i32>,
) -> AppResult<ApiResponse<()>> {
    state.menu_service.delete_menu(menu_id).await?;
    Ok(ApiResponse::ok())
}
