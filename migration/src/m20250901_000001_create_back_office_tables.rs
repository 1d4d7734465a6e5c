use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SysUser::Table)
                    .if_not_exists()
                    .col(pk_auto(SysUser::Id))
                    .col(string(SysUser::Username).unique_key())
                    .col(string(SysUser::PasswordHash))
                    .col(string_null(SysUser::Email))
                    .col(string_null(SysUser::Avatar))
                    .col(integer(SysUser::Status).default(1)) // 0 disabled, 1 enabled
                    .col(timestamp_with_time_zone(SysUser::CreatedAt))
                    .col(timestamp_with_time_zone(SysUser::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SysRole::Table)
                    .if_not_exists()
                    .col(pk_auto(SysRole::Id))
                    .col(string(SysRole::RoleCode).unique_key())
                    .col(string(SysRole::RoleName))
                    .col(string_null(SysRole::Description))
                    .col(timestamp_with_time_zone(SysRole::CreatedAt))
                    .col(timestamp_with_time_zone(SysRole::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Children are found through parent_id; 0 marks a root.
        manager
            .create_table(
                Table::create()
                    .table(SysMenu::Table)
                    .if_not_exists()
                    .col(pk_auto(SysMenu::Id))
                    .col(string(SysMenu::Title))
                    .col(string_null(SysMenu::Path))
                    .col(string_null(SysMenu::Icon))
                    .col(integer(SysMenu::ParentId).default(0))
                    .col(integer(SysMenu::KeepAlive).default(0))
                    .col(integer(SysMenu::SortOrder).default(0))
                    .col(string_len(SysMenu::MenuType, 16).default("menu"))
                    .col(string_null(SysMenu::Permission))
                    .col(timestamp_with_time_zone(SysMenu::CreatedAt))
                    .col(timestamp_with_time_zone(SysMenu::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sys_menu-parent_id")
                    .table(SysMenu::Table)
                    .col(SysMenu::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SysUserRole::Table)
                    .if_not_exists()
                    .col(integer(SysUserRole::UserId))
                    .col(integer(SysUserRole::RoleId))
                    .primary_key(
                        Index::create()
                            .col(SysUserRole::UserId)
                            .col(SysUserRole::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sys_user_role-user")
                            .from(SysUserRole::Table, SysUserRole::UserId)
                            .to(SysUser::Table, SysUser::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sys_user_role-role")
                            .from(SysUserRole::Table, SysUserRole::RoleId)
                            .to(SysRole::Table, SysRole::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SysRoleMenu::Table)
                    .if_not_exists()
                    .col(integer(SysRoleMenu::RoleId))
                    .col(integer(SysRoleMenu::MenuId))
                    .primary_key(
                        Index::create()
                            .col(SysRoleMenu::RoleId)
                            .col(SysRoleMenu::MenuId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sys_role_menu-role")
                            .from(SysRoleMenu::Table, SysRoleMenu::RoleId)
                            .to(SysRole::Table, SysRole::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sys_role_menu-menu")
                            .from(SysRoleMenu::Table, SysRoleMenu::MenuId)
                            .to(SysMenu::Table, SysMenu::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Article::Table)
                    .if_not_exists()
                    .col(pk_auto(Article::Id))
                    .col(string(Article::Title))
                    .col(text(Article::Content))
                    .col(integer_null(Article::AuthorId))
                    .col(integer(Article::Status).default(0)) // 0 draft, 1 published
                    .col(timestamp_with_time_zone(Article::CreatedAt))
                    .col(timestamp_with_time_zone(Article::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatMessage::Table)
                    .if_not_exists()
                    .col(pk_auto(ChatMessage::Id))
                    .col(integer_null(ChatMessage::SenderId))
                    .col(integer_null(ChatMessage::ReceiverId))
                    .col(text(ChatMessage::Message))
                    .col(timestamp_with_time_zone(ChatMessage::SendTime))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatMessage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Article::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysRoleMenu::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysUserRole::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysMenu::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysRole::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysUser::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum SysUser {
    Table,
    Id,
    Username,
    PasswordHash,
    Email,
    Avatar,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SysRole {
    Table,
    Id,
    RoleCode,
    RoleName,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SysMenu {
    Table,
    Id,
    Title,
    Path,
    Icon,
    ParentId,
    KeepAlive,
    SortOrder,
    #[sea_orm(iden = "type")]
    MenuType,
    Permission,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SysUserRole {
    Table,
    UserId,
    RoleId,
}

#[derive(DeriveIden)]
enum SysRoleMenu {
    Table,
    RoleId,
    MenuId,
}

#[derive(DeriveIden)]
enum Article {
    Table,
    Id,
    Title,
    Content,
    AuthorId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ChatMessage {
    Table,
    Id,
    SenderId,
    ReceiverId,
    Message,
    SendTime,
}
