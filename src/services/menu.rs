use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::info;

use crate::entities::menu::{self, ROOT_PARENT_ID};
use crate::entities::{prelude::*, role_menu, sea_orm_active_enums::MenuType};
use crate::error::{AppError, AppResult};
use crate::services::menu_tree::{build_tree, MenuNode};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuInput {
    pub title: Option<String>,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<i32>,
    pub keep_alive: Option<i32>,
    pub sort_order: Option<i32>,
    #[serde(rename = "type")]
    pub menu_type: Option<MenuType>,
    pub permission: Option<String>,
}

#[derive(Clone)]
pub struct MenuService {
    db: DatabaseConnection,
}

impl MenuService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every menu and button, as a forest ordered by sort order.
    pub async fn menu_tree(&self) -> AppResult<Vec<MenuNode>> {
        let menus = Menu::find()
            .order_by_asc(menu::Column::SortOrder)
            .order_by_asc(menu::Column::Id)
            .all(&self.db)
            .await?;

        Ok(build_tree(menus))
    }

    pub async fn get_menu(&self, menu_id: i32) -> AppResult<menu::Model> {
        Menu::find_by_id(menu_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("menu"))
    }

    pub async fn create_menu(&self, input: MenuInput) -> AppResult<menu::Model> {
        let title = input
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .ok_or_else(|| AppError::Validation("title is required".into()))?;
        let parent_id = input.parent_id.unwrap_or(ROOT_PARENT_ID);
        self.ensure_parent_exists(parent_id).await?;

        let now = Utc::now();
        let menu = menu::ActiveModel {
            title: Set(title),
            path: Set(input.path),
            icon: Set(input.icon),
            parent_id: Set(parent_id),
            keep_alive: Set(input.keep_alive.unwrap_or(0)),
            sort_order: Set(input.sort_order.unwrap_or(0)),
            menu_type: Set(input.menu_type.unwrap_or_default()),
            permission: Set(input.permission.filter(|p| !p.trim().is_empty())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(menu_id = menu.id, title = %menu.title, "menu created");
        Ok(menu)
    }

    pub async fn update_menu(&self, menu_id: i32, input: MenuInput) -> AppResult<menu::Model> {
        let menu = self.get_menu(menu_id).await?;
        let mut active: menu::ActiveModel = menu.into();

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::Validation("title must not be empty".into()));
            }
            active.title = Set(title);
        }
        if let Some(parent_id) = input.parent_id {
            if parent_id == menu_id {
                return Err(AppError::Validation("a menu cannot be its own parent".into()));
            }
            self.ensure_parent_exists(parent_id).await?;
            active.parent_id = Set(parent_id);
        }
        if let Some(path) = input.path {
            active.path = Set(Some(path));
        }
        if let Some(icon) = input.icon {
            active.icon = Set(Some(icon));
        }
        if let Some(keep_alive) = input.keep_alive {
            active.keep_alive = Set(keep_alive);
        }
        if let Some(sort_order) = input.sort_order {
            active.sort_order = Set(sort_order);
        }
        if let Some(menu_type) = input.menu_type {
            active.menu_type = Set(menu_type);
        }
        if let Some(permission) = input.permission {
            let permission = permission.trim().to_string();
            active.permission = Set((!permission.is_empty()).then_some(permission));
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Delete a menu and the role links pointing at it. Children are left in
    /// place and disappear from built trees until re-parented.
    pub async fn delete_menu(&self, menu_id: i32) -> AppResult<()> {
        let tx = self.db.begin().await?;

        RoleMenu::delete_many()
            .filter(role_menu::Column::MenuId.eq(menu_id))
            .exec(&tx)
            .await?;

        let result = Menu::delete_by_id(menu_id).exec(&tx).await?;
        if result.rows_affected == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound("menu"));
        }

        tx.commit().await?;

        info!(menu_id, "menu deleted");
        Ok(())
    }

    async fn ensure_parent_exists(&self, parent_id: i32) -> AppResult<()> {
        if parent_id == ROOT_PARENT_ID {
            return Ok(());
        }
        if Menu::find_by_id(parent_id).one(&self.db).await?.is_none() {
            return Err(AppError::Validation(format!(
                "parent menu {} does not exist",
                parent_id
            )));
        }
        Ok(())
    }
}
