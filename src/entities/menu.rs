//! `SeaORM` Entity, navigation menu and button permission rows

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MenuType;

/// Parent id carried by top level menus.
pub const ROOT_PARENT_ID: i32 = 0;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sys_menu")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub parent_id: i32,
    pub keep_alive: i32,
    pub sort_order: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub menu_type: MenuType,
    /// Permission string such as `user:add`; buttons and protected menus carry one.
    pub permission: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::role_menu::Entity")]
    RoleMenu,
}

impl Related<super::role_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleMenu.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::role_menu::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::role_menu::Relation::Menu.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
