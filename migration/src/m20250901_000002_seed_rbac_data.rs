use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use backoffice::entities::{menu, role, role_menu};

use crate::rbac_helpers::{ensure_role, grant_menus_to_role, insert_menu, MenuSeed};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Top level page, its child pages, and the buttons under each child.
struct Section {
    page: MenuSeed,
    children: &'static [(MenuSeed, &'static [MenuSeed])],
}

const SECTIONS: &[Section] = &[
    Section {
        page: MenuSeed::page("Dashboard", "/dashboard", Some("LayoutDashboard"), None),
        children: &[],
    },
    Section {
        page: MenuSeed::page("System", "/system", Some("Settings"), None),
        children: &[
            (
                MenuSeed::page("Users", "/system/user", None, Some("user:list")),
                &[
                    MenuSeed::button("Add user", "user:add"),
                    MenuSeed::button("Edit user", "user:edit"),
                    MenuSeed::button("Delete user", "user:delete"),
                ],
            ),
            (
                MenuSeed::page("Roles", "/system/role", None, Some("role:list")),
                &[
                    MenuSeed::button("Add role", "role:add"),
                    MenuSeed::button("Edit role", "role:edit"),
                    MenuSeed::button("Delete role", "role:delete"),
                    MenuSeed::button("Assign permissions", "role:permission"),
                ],
            ),
            (
                MenuSeed::page("Menus", "/system/menu", None, Some("menu:list")),
                &[
                    MenuSeed::button("Add menu", "menu:add"),
                    MenuSeed::button("Edit menu", "menu:edit"),
                    MenuSeed::button("Delete menu", "menu:delete"),
                ],
            ),
        ],
    },
    Section {
        page: MenuSeed::page("Articles", "/article", Some("FileText"), None),
        children: &[
            (
                MenuSeed::page("Editor", "/article/editor", None, Some("article:add")),
                &[],
            ),
            (
                MenuSeed::page("Preview", "/article/preview", None, Some("article:list")),
                &[MenuSeed::button("Delete article", "article:delete")],
            ),
        ],
    },
    Section {
        page: MenuSeed::page("Excel", "/excel", Some("Sheet"), None),
        children: &[],
    },
    Section {
        page: MenuSeed::page("Chat", "/chat", Some("MessageCircle"), None),
        children: &[],
    },
];

/// Editors get the article pages plus the dashboard, excel and chat pages.
const EDITOR_PAGES: &[&str] = &["/dashboard", "/article", "/excel", "/chat"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        println!("🌱 Seeding RBAC data...");

        let admin = ensure_role(db, "admin", "Administrator", "Full back office access").await?;
        let editor = ensure_role(db, "editor", "Editor", "Writes and publishes articles").await?;

        if menu::Entity::find().one(db).await?.is_some() {
            println!("✅ Menus already seeded, skipping");
            return Ok(());
        }

        let mut all_ids = Vec::new();
        let mut editor_ids = Vec::new();

        for (section_order, section) in SECTIONS.iter().enumerate() {
            let root = insert_menu(db, &section.page, 0, section_order as i32 + 1).await?;
            let editor_section = section
                .page
                .path
                .is_some_and(|path| EDITOR_PAGES.contains(&path));
            all_ids.push(root.id);
            if editor_section {
                editor_ids.push(root.id);
            }

            for (child_order, (child, buttons)) in section.children.iter().enumerate() {
                let page = insert_menu(db, child, root.id, child_order as i32 + 1).await?;
                all_ids.push(page.id);
                if editor_section {
                    editor_ids.push(page.id);
                }

                for (button_order, button) in buttons.iter().enumerate() {
                    let row = insert_menu(db, button, page.id, button_order as i32 + 1).await?;
                    all_ids.push(row.id);
                    if editor_section {
                        editor_ids.push(row.id);
                    }
                }
            }
            println!("✅ Created menu section: {}", section.page.title);
        }

        grant_menus_to_role(db, admin.id, &all_ids).await?;
        println!("✅ Assigned all {} menus to admin role", all_ids.len());

        grant_menus_to_role(db, editor.id, &editor_ids).await?;
        println!("✅ Assigned {} menus to editor role", editor_ids.len());

        println!("🎉 RBAC seeding complete");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        role_menu::Entity::delete_many().exec(db).await?;
        menu::Entity::delete_many().exec(db).await?;
        role::Entity::delete_many()
            .filter(role::Column::RoleCode.is_in(["admin", "editor"]))
            .exec(db)
            .await?;

        println!("🗑️  RBAC seed data removed");
        Ok(())
    }
}
