//! In-memory SQLite fixtures shared by the unit and integration tests.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    Schema, Set,
};

use crate::entities::{
    menu, prelude::*, role, role_menu, sea_orm_active_enums::MenuType, user, user_role,
};

/// Low bcrypt cost so hashing does not dominate test time.
pub const TEST_HASH_COST: u32 = 4;

pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // A single connection keeps every query on the same in-memory database.
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let statements = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Role),
        schema.create_table_from_entity(Menu),
        schema.create_table_from_entity(UserRole),
        schema.create_table_from_entity(RoleMenu),
        schema.create_table_from_entity(Article),
        schema.create_table_from_entity(ChatMessage),
    ];
    for statement in statements {
        db.execute(backend.build(&statement)).await.expect("create table");
    }

    db
}

pub async fn insert_user(db: &DatabaseConnection, username: &str) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(bcrypt::hash("secret", TEST_HASH_COST).expect("hash")),
        email: Set(Some(format!("{username}@example.com"))),
        avatar: Set(None),
        status: Set(1),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn insert_role(db: &DatabaseConnection, code: &str) -> role::Model {
    let now = Utc::now();
    role::ActiveModel {
        role_code: Set(code.to_string()),
        role_name: Set(format!("{code} role")),
        description: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert role")
}

pub async fn insert_menu(
    db: &DatabaseConnection,
    title: &str,
    parent_id: i32,
    sort_order: i32,
    menu_type: MenuType,
    permission: Option<&str>,
) -> menu::Model {
    let now = Utc::now();
    menu::ActiveModel {
        title: Set(title.to_string()),
        path: Set(None),
        icon: Set(None),
        parent_id: Set(parent_id),
        keep_alive: Set(0),
        sort_order: Set(sort_order),
        menu_type: Set(menu_type),
        permission: Set(permission.map(str::to_string)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert menu")
}

pub async fn link_user_role(db: &DatabaseConnection, user_id: i32, role_id: i32) {
    UserRole::insert(user_role::ActiveModel {
        user_id: Set(user_id),
        role_id: Set(role_id),
    })
    .exec_without_returning(db)
    .await
    .expect("link user role");
}

pub async fn link_role_menu(db: &DatabaseConnection, role_id: i32, menu_id: i32) {
    RoleMenu::insert(role_menu::ActiveModel {
        role_id: Set(role_id),
        menu_id: Set(menu_id),
    })
    .exec_without_returning(db)
    .await
    .expect("link role menu");
}
