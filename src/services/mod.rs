pub mod article;
pub mod auth;
pub mod chat;
pub mod excel;
pub mod menu;
pub mod menu_tree;
pub mod role;
pub mod user;

pub use article::*;
pub use auth::*;
pub use chat::*;
pub use excel::*;
pub use menu::*;
pub use menu_tree::*;
pub use role::*;
pub use user::*;

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Paging and keyword filter shared by the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub keyword: Option<String>,
}

impl ListQuery {
    /// Trimmed keyword, `None` when blank.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
    }
}

/// 1-based page number and a size clamped to `1..=MAX_PAGE_SIZE`.
pub fn normalize_page(page: Option<u64>, size: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, size)
}
