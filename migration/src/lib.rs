pub use sea_orm_migration::prelude::*;

mod rbac_helpers;
mod m20250901_000001_create_back_office_tables;
mod m20250901_000002_seed_rbac_data;
mod m20250901_000003_seed_admin_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_back_office_tables::Migration),
            Box::new(m20250901_000002_seed_rbac_data::Migration),
            Box::new(m20250901_000003_seed_admin_user::Migration),
        ]
    }
}
