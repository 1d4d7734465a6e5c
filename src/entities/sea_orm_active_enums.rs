use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, DeriveActiveEnum, Serialize, Deserialize, EnumIter)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MenuType {
    #[default]
    #[sea_orm(string_value = "menu")]
    Menu,
    #[sea_orm(string_value = "button")]
    Button,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, DeriveActiveEnum, Serialize, Deserialize, EnumIter)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    #[sea_orm(num_value = 0)]
    Draft,
    #[sea_orm(num_value = 1)]
    Published,
}
