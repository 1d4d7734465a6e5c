use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;

use crate::api::response::PageResult;
use crate::entities::{article, prelude::*, sea_orm_active_enums::ArticleStatus};
use crate::error::{AppError, AppResult};
use crate::services::DEFAULT_PAGE_SIZE;

/// Create-or-update payload: an `id` selects the article to overwrite.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<i32>,
    pub status: Option<ArticleStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleQuery {
    pub page: Option<i64>,
    pub size: Option<u64>,
}

#[derive(Clone)]
pub struct ArticleService {
    db: DatabaseConnection,
}

impl ArticleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest first. A page number of zero or less returns every article on a
    /// single page.
    pub async fn list_articles(&self, query: &ArticleQuery) -> AppResult<PageResult<article::Model>> {
        let select = Article::find()
            .order_by_desc(article::Column::CreatedAt)
            .order_by_desc(article::Column::Id);

        let page = query.page.unwrap_or(1);
        if page <= 0 {
            let records = select.all(&self.db).await?;
            let total = records.len() as u64;
            return Ok(PageResult::new(records, total, 1, total));
        }

        let page = page as u64;
        let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await?;
        let records = paginator.fetch_page(page - 1).await?;

        Ok(PageResult::new(records, total, page, size))
    }

    pub async fn get_article(&self, article_id: i32) -> AppResult<article::Model> {
        Article::find_by_id(article_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("article"))
    }

    /// Insert when no id is given, otherwise overwrite the supplied fields.
    /// New articles are attributed to `caller_id` unless an author is named.
    pub async fn save_article(&self, input: ArticleInput, caller_id: i32) -> AppResult<article::Model> {
        let now = Utc::now();

        let Some(article_id) = input.id else {
            let title = input
                .title
                .map(|title| title.trim().to_string())
                .filter(|title| !title.is_empty())
                .ok_or_else(|| AppError::Validation("title is required".into()))?;

            let article = article::ActiveModel {
                title: Set(title),
                content: Set(input.content.unwrap_or_default()),
                author_id: Set(Some(input.author_id.unwrap_or(caller_id))),
                status: Set(input.status.unwrap_or_default()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            }
            .insert(&self.db)
            .await?;

            info!(article_id = article.id, "article created");
            return Ok(article);
        };

        let existing = self.get_article(article_id).await?;
        let mut active: article::ActiveModel = existing.into();

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::Validation("title must not be empty".into()));
            }
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(author_id) = input.author_id {
            active.author_id = Set(Some(author_id));
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(now.into());

        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_article(&self, article_id: i32) -> AppResult<()> {
        let result = Article::delete_by_id(article_id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("article"));
        }

        info!(article_id, "article deleted");
        Ok(())
    }
}
