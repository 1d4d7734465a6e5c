use std::collections::{BTreeSet, HashSet};

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{menu, prelude::*, role_menu, sea_orm_active_enums::MenuType, user_role};
use crate::services::menu_tree::{build_tree, MenuNode};

/// Resolves what a user may see and do through their roles.
///
/// Nothing is cached: every call walks user -> roles -> menus again, so role
/// and menu reassignments take effect on the next request.
#[derive(Clone)]
pub struct PermissionService {
    db: DatabaseConnection,
}

impl PermissionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Role ids assigned to a user.
    pub async fn get_user_role_ids(&self, user_id: i32) -> Result<Vec<i32>, DbErr> {
        let links = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(links.into_iter().map(|link| link.role_id).collect())
    }

    /// Distinct menu ids reachable through any of the user's roles.
    async fn get_user_menu_ids(&self, user_id: i32) -> Result<Vec<i32>, DbErr> {
        let role_ids = self.get_user_role_ids(user_id).await?;
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let links = RoleMenu::find()
            .filter(role_menu::Column::RoleId.is_in(role_ids))
            .all(&self.db)
            .await?;

        let mut seen = HashSet::new();
        Ok(links
            .into_iter()
            .map(|link| link.menu_id)
            .filter(|menu_id| seen.insert(*menu_id))
            .collect())
    }

    /// Union of the permission strings carried by every menu or button the
    /// user's roles are linked to.
    pub async fn get_user_permissions(&self, user_id: i32) -> Result<BTreeSet<String>, DbErr> {
        let menu_ids = self.get_user_menu_ids(user_id).await?;
        if menu_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let menus = Menu::find()
            .filter(menu::Column::Id.is_in(menu_ids))
            .filter(menu::Column::Permission.is_not_null())
            .all(&self.db)
            .await?;

        Ok(menus
            .into_iter()
            .filter_map(|menu| menu.permission)
            .filter(|permission| !permission.is_empty())
            .collect())
    }

    /// Navigation tree for a user; buttons are left out.
    pub async fn get_user_menu_tree(&self, user_id: i32) -> Result<Vec<MenuNode>, DbErr> {
        let menu_ids = self.get_user_menu_ids(user_id).await?;
        if menu_ids.is_empty() {
            return Ok(Vec::new());
        }

        let menus = Menu::find()
            .filter(menu::Column::Id.is_in(menu_ids))
            .filter(menu::Column::MenuType.eq(MenuType::Menu))
            .order_by_asc(menu::Column::SortOrder)
            .order_by_asc(menu::Column::Id)
            .all(&self.db)
            .await?;

        Ok(build_tree(menus))
    }

    /// Check if user has a specific permission
    pub async fn user_has_permission(&self, user_id: i32, permission: &str) -> Result<bool, DbErr> {
        if permission.is_empty() {
            return Ok(false);
        }
        let permissions = self.get_user_permissions(user_id).await?;
        Ok(permissions.contains(permission))
    }

    pub async fn user_has_any_permission(
        &self,
        user_id: i32,
        permissions: &[&str],
    ) -> Result<bool, DbErr> {
        if permissions.is_empty() {
            return Ok(false);
        }
        let granted = self.get_user_permissions(user_id).await?;
        Ok(permissions.iter().any(|permission| granted.contains(*permission)))
    }

    pub async fn user_has_all_permissions(
        &self,
        user_id: i32,
        permissions: &[&str],
    ) -> Result<bool, DbErr> {
        if permissions.is_empty() {
            return Ok(false);
        }
        let granted = self.get_user_permissions(user_id).await?;
        Ok(permissions.iter().all(|permission| granted.contains(*permission)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        insert_menu, insert_role, insert_user, link_role_menu, link_user_role, test_db,
    };

    #[tokio::test]
    async fn user_without_roles_sees_nothing() {
        let db = test_db().await;
        let user = insert_user(&db, "nobody").await;
        let menu = insert_menu(&db, "Users", 0, 1, MenuType::Menu, Some("user:list")).await;
        let role = insert_role(&db, "admin").await;
        link_role_menu(&db, role.id, menu.id).await;

        let service = PermissionService::new(db);
        assert!(service.get_user_permissions(user.id).await.unwrap().is_empty());
        assert!(service.get_user_menu_tree(user.id).await.unwrap().is_empty());
        assert!(!service.user_has_permission(user.id, "user:list").await.unwrap());
    }

    #[tokio::test]
    async fn role_without_menus_grants_nothing() {
        let db = test_db().await;
        let user = insert_user(&db, "idle").await;
        let role = insert_role(&db, "empty").await;
        link_user_role(&db, user.id, role.id).await;

        let service = PermissionService::new(db);
        assert!(service.get_user_permissions(user.id).await.unwrap().is_empty());
        assert!(service.get_user_menu_tree(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn permissions_are_the_union_across_roles() {
        let db = test_db().await;
        let user = insert_user(&db, "both").await;
        let first = insert_role(&db, "user-admin").await;
        let second = insert_role(&db, "article-admin").await;
        let add_user = insert_menu(&db, "Add user", 0, 1, MenuType::Button, Some("user:add")).await;
        let delete_article =
            insert_menu(&db, "Delete article", 0, 2, MenuType::Button, Some("article:delete")).await;
        link_role_menu(&db, first.id, add_user.id).await;
        link_role_menu(&db, second.id, delete_article.id).await;
        link_user_role(&db, user.id, first.id).await;
        link_user_role(&db, user.id, second.id).await;

        let service = PermissionService::new(db);
        let permissions = service.get_user_permissions(user.id).await.unwrap();
        let expected: BTreeSet<String> =
            ["article:delete", "user:add"].iter().map(|p| p.to_string()).collect();
        assert_eq!(permissions, expected);
        assert!(service.user_has_permission(user.id, "user:add").await.unwrap());
        assert!(service.user_has_permission(user.id, "article:delete").await.unwrap());
        assert!(service
            .user_has_all_permissions(user.id, &["user:add", "article:delete"])
            .await
            .unwrap());
        assert!(service
            .user_has_any_permission(user.id, &["role:add", "user:add"])
            .await
            .unwrap());
        assert!(!service
            .user_has_all_permissions(user.id, &["user:add", "role:add"])
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn shared_menus_are_deduplicated_and_empty_permissions_skipped() {
        let db = test_db().await;
        let user = insert_user(&db, "overlap").await;
        let first = insert_role(&db, "r1").await;
        let second = insert_role(&db, "r2").await;
        let shared = insert_menu(&db, "Users", 0, 1, MenuType::Menu, Some("user:list")).await;
        let blank = insert_menu(&db, "Home", 0, 0, MenuType::Menu, Some("")).await;
        for role in [&first, &second] {
            link_role_menu(&db, role.id, shared.id).await;
            link_role_menu(&db, role.id, blank.id).await;
            link_user_role(&db, user.id, role.id).await;
        }

        let service = PermissionService::new(db);
        let permissions = service.get_user_permissions(user.id).await.unwrap();
        assert_eq!(permissions.into_iter().collect::<Vec<_>>(), vec!["user:list"]);

        let tree = service.get_user_menu_tree(user.id).await.unwrap();
        let ids: Vec<i32> = tree.iter().map(MenuNode::id).collect();
        assert_eq!(ids, vec![blank.id, shared.id]);
    }

    #[tokio::test]
    async fn menu_tree_excludes_buttons_and_orders_children() {
        let db = test_db().await;
        let user = insert_user(&db, "nav").await;
        let role = insert_role(&db, "nav-role").await;
        let system = insert_menu(&db, "System", 0, 1, MenuType::Menu, None).await;
        let roles = insert_menu(&db, "Roles", system.id, 2, MenuType::Menu, Some("role:list")).await;
        let users = insert_menu(&db, "Users", system.id, 1, MenuType::Menu, Some("user:list")).await;
        let add = insert_menu(&db, "Add", users.id, 1, MenuType::Button, Some("user:add")).await;
        for menu in [&system, &roles, &users, &add] {
            link_role_menu(&db, role.id, menu.id).await;
        }
        link_user_role(&db, user.id, role.id).await;

        let service = PermissionService::new(db);
        let tree = service.get_user_menu_tree(user.id).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id(), system.id);
        let children: Vec<i32> = tree[0].children.iter().map(MenuNode::id).collect();
        assert_eq!(children, vec![users.id, roles.id]);
        assert!(tree[0].children[0].children.is_empty());

        // The button still contributes its permission.
        assert!(service.user_has_permission(user.id, "user:add").await.unwrap());
    }
}
