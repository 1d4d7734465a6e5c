use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::info;

use crate::api::response::PageResult;
use crate::entities::{prelude::*, role, role_menu, user_role};
use crate::error::{AppError, AppResult};
use crate::services::{normalize_page, ListQuery};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInput {
    pub role_code: Option<String>,
    pub role_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct RoleService {
    db: DatabaseConnection,
}

impl RoleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_roles(&self, query: &ListQuery) -> AppResult<PageResult<role::Model>> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Role::find();
        if let Some(keyword) = query.keyword() {
            select = select.filter(
                Condition::any()
                    .add(role::Column::RoleName.contains(keyword))
                    .add(role::Column::RoleCode.contains(keyword)),
            );
        }

        let paginator = select.order_by_asc(role::Column::Id).paginate(&self.db, size);
        let total = paginator.num_items().await?;
        let records = paginator.fetch_page(page - 1).await?;

        Ok(PageResult::new(records, total, page, size))
    }

    pub async fn get_role(&self, role_id: i32) -> AppResult<role::Model> {
        Role::find_by_id(role_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("role"))
    }

    pub async fn create_role(&self, input: RoleInput) -> AppResult<role::Model> {
        let role_code = required(input.role_code, "roleCode")?;
        let role_name = required(input.role_name, "roleName")?;

        if self.code_taken(&role_code, None).await? {
            return Err(AppError::Conflict(format!("role code '{}' already exists", role_code)));
        }

        let now = Utc::now();
        let role = role::ActiveModel {
            role_code: Set(role_code),
            role_name: Set(role_name),
            description: Set(input.description),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(role_id = role.id, role_code = %role.role_code, "role created");
        Ok(role)
    }

    pub async fn update_role(&self, role_id: i32, input: RoleInput) -> AppResult<role::Model> {
        let role = self.get_role(role_id).await?;
        let mut active: role::ActiveModel = role.into();

        if let Some(role_code) = input.role_code {
            let role_code = non_blank(role_code, "roleCode")?;
            if self.code_taken(&role_code, Some(role_id)).await? {
                return Err(AppError::Conflict(format!(
                    "role code '{}' already exists",
                    role_code
                )));
            }
            active.role_code = Set(role_code);
        }
        if let Some(role_name) = input.role_name {
            active.role_name = Set(non_blank(role_name, "roleName")?);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Delete a role together with every menu and user link that references it.
    pub async fn delete_role(&self, role_id: i32) -> AppResult<()> {
        let tx = self.db.begin().await?;

        RoleMenu::delete_many()
            .filter(role_menu::Column::RoleId.eq(role_id))
            .exec(&tx)
            .await?;
        UserRole::delete_many()
            .filter(user_role::Column::RoleId.eq(role_id))
            .exec(&tx)
            .await?;

        let result = Role::delete_by_id(role_id).exec(&tx).await?;
        if result.rows_affected == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound("role"));
        }

        tx.commit().await?;

        info!(role_id, "role deleted");
        Ok(())
    }

    /// Menu ids currently linked to the role.
    pub async fn role_menus(&self, role_id: i32) -> AppResult<Vec<i32>> {
        let links = RoleMenu::find()
            .filter(role_menu::Column::RoleId.eq(role_id))
            .order_by_asc(role_menu::Column::MenuId)
            .all(&self.db)
            .await?;

        Ok(links.into_iter().map(|link| link.menu_id).collect())
    }

    /// Replace the role's menu set. Either the whole new set is stored or the
    /// previous one is left untouched.
    pub async fn assign_role_menus(&self, role_id: i32, menu_ids: &[i32]) -> AppResult<()> {
        let mut seen = HashSet::new();
        let links: Vec<role_menu::ActiveModel> = menu_ids
            .iter()
            .copied()
            .filter(|menu_id| seen.insert(*menu_id))
            .map(|menu_id| role_menu::ActiveModel {
                role_id: Set(role_id),
                menu_id: Set(menu_id),
            })
            .collect();

        let tx = self.db.begin().await?;

        if Role::find_by_id(role_id).one(&tx).await?.is_none() {
            tx.rollback().await?;
            return Err(AppError::NotFound("role"));
        }

        RoleMenu::delete_many()
            .filter(role_menu::Column::RoleId.eq(role_id))
            .exec(&tx)
            .await?;

        let count = links.len();
        if !links.is_empty() {
            if let Err(err) = RoleMenu::insert_many(links).exec_without_returning(&tx).await {
                tx.rollback().await?;
                return Err(err.into());
            }
        }

        tx.commit().await?;

        info!(role_id, menus = count, "role menus reassigned");
        Ok(())
    }

    async fn code_taken(&self, role_code: &str, except: Option<i32>) -> AppResult<bool> {
        let mut select = Role::find().filter(role::Column::RoleCode.eq(role_code));
        if let Some(role_id) = except {
            select = select.filter(role::Column::Id.ne(role_id));
        }
        Ok(select.one(&self.db).await?.is_some())
    }
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    non_blank(value.unwrap_or_default(), field)
}

fn non_blank(value: String, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
