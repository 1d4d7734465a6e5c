use std::collections::{HashMap, HashSet};

use bcrypt::hash;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::response::PageResult;
use crate::entities::{prelude::*, role, user, user_role};
use crate::error::{AppError, AppResult};
use crate::services::{normalize_page, ListQuery};

const DEFAULT_AVATAR_BASE: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<i32>,
    pub role_ids: Option<Vec<i32>>,
}

/// Absent fields are left unchanged; an empty password keeps the current one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<i32>,
    pub role_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: user::Model,
    pub roles: Vec<role::Model>,
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    hash_cost: u32,
}

impl UserService {
    pub fn new(db: DatabaseConnection, hash_cost: u32) -> Self {
        Self { db, hash_cost }
    }

    pub async fn list_users(&self, query: &ListQuery) -> AppResult<PageResult<UserWithRoles>> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = User::find();
        if let Some(keyword) = query.keyword() {
            select = select.filter(
                Condition::any()
                    .add(user::Column::Username.contains(keyword))
                    .add(user::Column::Email.contains(keyword)),
            );
        }

        let paginator = select
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .paginate(&self.db, size);
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page - 1).await?;

        let records = self.attach_roles(users).await?;
        Ok(PageResult::new(records, total, page, size))
    }

    pub async fn get_user(&self, user_id: i32) -> AppResult<UserWithRoles> {
        let user = self
            .find_user_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        let mut with_roles = self.attach_roles(vec![user]).await?;
        with_roles.pop().ok_or(AppError::NotFound("user"))
    }

    pub async fn find_user_by_id(&self, user_id: i32) -> AppResult<Option<user::Model>> {
        Ok(User::find_by_id(user_id).one(&self.db).await?)
    }

    pub async fn find_user_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        Ok(User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Roles assigned to a user, in assignment order.
    pub async fn get_user_roles(&self, user_id: i32) -> AppResult<Vec<role::Model>> {
        let mut grouped = roles_by_user(&self.db, &[user_id]).await?;
        Ok(grouped.remove(&user_id).unwrap_or_default())
    }

    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<user::Model> {
        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("username is required".into()));
        }
        if input.password.is_empty() {
            return Err(AppError::Validation("password is required".into()));
        }

        let password_hash = hash(&input.password, self.hash_cost)?;
        let avatar = input
            .avatar
            .filter(|avatar| !avatar.trim().is_empty())
            .unwrap_or_else(|| format!("{}{}", DEFAULT_AVATAR_BASE, username));

        let tx = self.db.begin().await?;

        // Check if username is already taken
        if User::find()
            .filter(user::Column::Username.eq(&username))
            .one(&tx)
            .await?
            .is_some()
        {
            tx.rollback().await?;
            return Err(AppError::DuplicateUsername);
        }

        let now = Utc::now();
        let new_user = user::ActiveModel {
            username: Set(username),
            password_hash: Set(password_hash),
            email: Set(input.email),
            avatar: Set(Some(avatar)),
            status: Set(input.status.unwrap_or(1)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let user = new_user.insert(&tx).await?;

        if let Some(role_ids) = input.role_ids.as_deref() {
            insert_user_roles(&tx, user.id, role_ids).await?;
        }

        tx.commit().await?;

        info!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub async fn update_user(&self, user_id: i32, input: UpdateUserInput) -> AppResult<user::Model> {
        let user = self
            .find_user_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        let mut user_active: user::ActiveModel = user.into();

        let username = input.username.map(|name| name.trim().to_string());
        if let Some(username) = &username {
            if username.is_empty() {
                return Err(AppError::Validation("username must not be empty".into()));
            }
            user_active.username = Set(username.clone());
        }
        if let Some(password) = input.password.as_deref().filter(|p| !p.is_empty()) {
            user_active.password_hash = Set(hash(password, self.hash_cost)?);
        }
        if let Some(email) = input.email {
            user_active.email = Set(Some(email));
        }
        if let Some(avatar) = input.avatar {
            user_active.avatar = Set(Some(avatar));
        }
        if let Some(status) = input.status {
            user_active.status = Set(status);
        }
        user_active.updated_at = Set(Utc::now().into());

        // Row update and role replacement commit together.
        let tx = self.db.begin().await?;

        if let Some(username) = &username {
            if User::find()
                .filter(user::Column::Username.eq(username))
                .filter(user::Column::Id.ne(user_id))
                .one(&tx)
                .await?
                .is_some()
            {
                tx.rollback().await?;
                return Err(AppError::DuplicateUsername);
            }
        }

        let updated_user = user_active.update(&tx).await?;

        if let Some(role_ids) = input.role_ids.as_deref() {
            UserRole::delete_many()
                .filter(user_role::Column::UserId.eq(user_id))
                .exec(&tx)
                .await?;
            if let Err(err) = insert_user_roles(&tx, user_id, role_ids).await {
                tx.rollback().await?;
                return Err(err);
            }
        }

        tx.commit().await?;

        Ok(updated_user)
    }

    /// Remove the user's role links, then the user row, atomically.
    pub async fn delete_user(&self, user_id: i32) -> AppResult<()> {
        let tx = self.db.begin().await?;

        UserRole::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&tx)
            .await?;

        let result = User::delete_by_id(user_id).exec(&tx).await?;
        if result.rows_affected == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound("user"));
        }

        tx.commit().await?;

        info!(user_id, "user deleted");
        Ok(())
    }

    async fn attach_roles(&self, users: Vec<user::Model>) -> AppResult<Vec<UserWithRoles>> {
        let user_ids: Vec<i32> = users.iter().map(|user| user.id).collect();
        let mut grouped = roles_by_user(&self.db, &user_ids).await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let roles = grouped.remove(&user.id).unwrap_or_default();
                UserWithRoles { user, roles }
            })
            .collect())
    }
}

async fn roles_by_user<C: ConnectionTrait>(
    db: &C,
    user_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<role::Model>>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = UserRole::find()
        .filter(user_role::Column::UserId.is_in(user_ids.iter().copied()))
        .all(db)
        .await?;
    if links.is_empty() {
        return Ok(HashMap::new());
    }

    let role_ids: HashSet<i32> = links.iter().map(|link| link.role_id).collect();
    let roles: HashMap<i32, role::Model> = Role::find()
        .filter(role::Column::Id.is_in(role_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|role| (role.id, role))
        .collect();

    let mut grouped: HashMap<i32, Vec<role::Model>> = HashMap::new();
    for link in links {
        if let Some(role) = roles.get(&link.role_id) {
            grouped.entry(link.user_id).or_default().push(role.clone());
        }
    }
    Ok(grouped)
}

async fn insert_user_roles<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    role_ids: &[i32],
) -> AppResult<()> {
    let mut seen = HashSet::new();
    let links: Vec<user_role::ActiveModel> = role_ids
        .iter()
        .copied()
        .filter(|role_id| seen.insert(*role_id))
        .map(|role_id| user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
        })
        .collect();

    if links.is_empty() {
        return Ok(());
    }

    UserRole::insert_many(links).exec_without_returning(db).await?;
    Ok(())
}
