use sea_orm_migration::sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use chrono::Utc;

use backoffice::entities::{menu, role, role_menu, sea_orm_active_enums::MenuType};

/// Returns the role with `role_code`, creating it when missing.
pub async fn ensure_role(
    db: &impl ConnectionTrait,
    role_code: &str,
    role_name: &str,
    description: &str,
) -> Result<role::Model, DbErr> {
    if let Some(existing) = role::Entity::find()
        .filter(role::Column::RoleCode.eq(role_code))
        .one(db)
        .await?
    {
        println!("✅ Role already exists: {}", role_code);
        return Ok(existing);
    }

    let now = Utc::now();
    let role = role::ActiveModel {
        role_code: Set(role_code.to_string()),
        role_name: Set(role_name.to_string()),
        description: Set(Some(description.to_string())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    println!("✅ Created role: {}", role_code);

    Ok(role)
}

/// One seeded menu or button row.
pub struct MenuSeed {
    pub title: &'static str,
    pub path: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub keep_alive: bool,
    pub menu_type: MenuType,
    pub permission: Option<&'static str>,
}

impl MenuSeed {
    pub const fn page(title: &'static str, path: &'static str, icon: Option<&'static str>, permission: Option<&'static str>) -> Self {
        Self { title, path: Some(path), icon, keep_alive: true, menu_type: MenuType::Menu, permission }
    }

    pub const fn button(title: &'static str, permission: &'static str) -> Self {
        Self { title, path: None, icon: None, keep_alive: false, menu_type: MenuType::Button, permission: Some(permission) }
    }
}

pub async fn insert_menu(
    db: &impl ConnectionTrait,
    seed: &MenuSeed,
    parent_id: i32,
    sort_order: i32,
) -> Result<menu::Model, DbErr> {
    let now = Utc::now();
    let menu = menu::ActiveModel {
        title: Set(seed.title.to_string()),
        path: Set(seed.path.map(str::to_string)),
        icon: Set(seed.icon.map(str::to_string)),
        parent_id: Set(parent_id),
        keep_alive: Set(i32::from(seed.keep_alive)),
        sort_order: Set(sort_order),
        menu_type: Set(seed.menu_type),
        permission: Set(seed.permission.map(str::to_string)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(menu)
}

/// Links menus to a role, skipping links that already exist.
pub async fn grant_menus_to_role(
    db: &impl ConnectionTrait,
    role_id: i32,
    menu_ids: &[i32],
) -> Result<(), DbErr> {
    for menu_id in menu_ids {
        let existing = role_menu::Entity::find()
            .filter(role_menu::Column::RoleId.eq(role_id))
            .filter(role_menu::Column::MenuId.eq(*menu_id))
            .one(db)
            .await?;

        if existing.is_none() {
            role_menu::Entity::insert(role_menu::ActiveModel {
                role_id: Set(role_id),
                menu_id: Set(*menu_id),
            })
            .exec_without_returning(db)
            .await?;
        }
    }

    Ok(())
}
