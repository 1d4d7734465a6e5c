use axum::extract::State;
use axum::Extension;

use crate::api::response::{ApiResponse, JsonBody, PageResult, PathParam, QueryParams};
use crate::app::AppState;
use crate::auth::RequestContext;
use crate::entities::article;
use crate::error::AppResult;
use crate::services::{ArticleInput, ArticleQuery};

pub async fn list_articles(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ArticleQuery>,
) -> AppResult<ApiResponse<PageResult<article::Model>>> {
    let page = state.article_service.list_articles(&query).await?;
    Ok(ApiResponse::success(page))
}

pub async fn get_article(
    State(state): State<AppState>,
    PathParam(article_id): PathParam<i32>,
) -> AppResult<ApiResponse<article::Model>> {
    let article = state.article_service.get_article(article_id).await?;
    Ok(ApiResponse::success(article))
}

pub async fn save_article(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    JsonBody(input): JsonBody<ArticleInput>,
) -> AppResult<ApiResponse<article::Model>> {
    let article = state
        .article_service
        .save_article(input, context.user_id)
        .await?;
    Ok(ApiResponse::success(article))
}

pub async fn delete_article(
    State(state): State<AppState>,
    PathParam(article_id): PathParam<i32>,
) -> AppResult<ApiResponse<()>> {
    state.article_service.delete_article(article_id).await?;
    Ok(ApiResponse::ok())
}
