use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use std::env;

use backoffice::entities::{role, user, user_role};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Only seed admin user if environment variables are set
        let admin_username = match env::var("ADMIN_USERNAME") {
            Ok(username) => username,
            Err(_) => {
                println!("⚠️  ADMIN_USERNAME not set, skipping admin user creation");
                return Ok(());
            }
        };

        let admin_password = match env::var("ADMIN_PASSWORD") {
            Ok(password) => password,
            Err(_) => {
                println!("⚠️  ADMIN_PASSWORD not set, skipping admin user creation");
                return Ok(());
            }
        };

        let admin_email = env::var("ADMIN_EMAIL").ok();

        println!("🌱 Seeding admin user: {}", admin_username);

        let db = manager.get_connection();

        let existing_user = user::Entity::find()
            .filter(user::Column::Username.eq(&admin_username))
            .one(db)
            .await?;

        if existing_user.is_some() {
            println!("✅ Admin user already exists, skipping creation");
            return Ok(());
        }

        let password_hash = hash(&admin_password, DEFAULT_COST)
            .map_err(|e| DbErr::Custom(format!("Failed to hash password: {}", e)))?;

        let now = Utc::now();
        let admin_user = user::ActiveModel {
            username: Set(admin_username.clone()),
            password_hash: Set(password_hash),
            email: Set(admin_email),
            avatar: Set(Some(format!(
                "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
                admin_username
            ))),
            status: Set(1),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let admin_role = role::Entity::find()
            .filter(role::Column::RoleCode.eq("admin"))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::Custom("Admin role not found".to_string()))?;

        user_role::Entity::insert(user_role::ActiveModel {
            user_id: Set(admin_user.id),
            role_id: Set(admin_role.id),
        })
        .exec_without_returning(db)
        .await?;

        println!("✅ Admin user created successfully: {}", admin_username);

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let admin_username = match env::var("ADMIN_USERNAME") {
            Ok(username) => username,
            Err(_) => {
                println!("⚠️  ADMIN_USERNAME not set, cannot remove admin user");
                return Ok(());
            }
        };

        let db = manager.get_connection();

        let result = user::Entity::delete_many()
            .filter(user::Column::Username.eq(&admin_username))
            .exec(db)
            .await?;

        if result.rows_affected > 0 {
            println!("🗑️  Admin user removed: {}", admin_username);
        } else {
            println!("⚠️  Admin user not found: {}", admin_username);
        }

        Ok(())
    }
}
