//! `SeaORM` entities for the back office schema

pub mod prelude;

pub mod article;
pub mod chat_message;
pub mod menu;
pub mod role;
pub mod role_menu;
pub mod sea_orm_active_enums;
pub mod user;
pub mod user_role;
