mod common;

use axum::http::StatusCode;
use backoffice::entities::{prelude::*, role_menu, user_role};
use backoffice::entities::sea_orm_active_enums::MenuType;
use backoffice::services::MenuInput;
use common::{authed_json_request, authed_request, read_json, seed_role, seed_user, test_app};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn deleting_a_role_removes_its_menu_links() {
    let app = test_app().await;
    let admin = seed_role(&app, "admin", &["role:delete"]).await;
    let doomed = seed_role(&app, "doomed", &["user:list", "menu:list"]).await;
    let (_, token) = seed_user(&app, "root", vec![admin]).await;

    let response = app
        .router
        .clone()
        .oneshot(authed_request("DELETE", &format!("/api/roles/{doomed}"), &token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let remaining = RoleMenu::find()
        .filter(role_menu::Column::RoleId.eq(doomed))
        .all(&app.db)
        .await
        .expect("query");
    assert!(remaining.is_empty());
    assert!(Role::find_by_id(doomed).one(&app.db).await.expect("query").is_none());
}

#[tokio::test]
async fn reassigning_user_roles_leaves_exactly_the_new_link() {
    let app = test_app().await;
    let first = seed_role(&app, "first", &["user:edit"]).await;
    let second = seed_role(&app, "second", &[]).await;
    let (_, token) = seed_user(&app, "editor", vec![first]).await;
    let (target, _) = seed_user(&app, "target", vec![first]).await;

    let response = app
        .router
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/users/{target}"),
            &token,
            json!({"roleIds": [second]}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let links = UserRole::find()
        .filter(user_role::Column::UserId.eq(target))
        .all(&app.db)
        .await
        .expect("query");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].role_id, second);
}

#[tokio::test]
async fn role_menu_assignment_drives_the_user_menu_tree() {
    let app = test_app().await;
    let admin = seed_role(&app, "admin", &["role:permission"]).await;
    let reader = seed_role(&app, "reader", &[]).await;
    let (_, admin_token) = seed_user(&app, "root", vec![admin]).await;
    let (_, reader_token) = seed_user(&app, "reader", vec![reader]).await;

    let system = app
        .state
        .menu_service
        .create_menu(MenuInput {
            title: Some("System".into()),
            path: Some("/system".into()),
            sort_order: Some(2),
            ..Default::default()
        })
        .await
        .expect("menu");
    let dashboard = app
        .state
        .menu_service
        .create_menu(MenuInput {
            title: Some("Dashboard".into()),
            path: Some("/dashboard".into()),
            sort_order: Some(1),
            ..Default::default()
        })
        .await
        .expect("menu");
    let users = app
        .state
        .menu_service
        .create_menu(MenuInput {
            title: Some("Users".into()),
            parent_id: Some(system.id),
            ..Default::default()
        })
        .await
        .expect("menu");
    let add_button = app
        .state
        .menu_service
        .create_menu(MenuInput {
            title: Some("Add".into()),
            parent_id: Some(users.id),
            menu_type: Some(MenuType::Button),
            permission: Some("user:add".into()),
            ..Default::default()
        })
        .await
        .expect("menu");

    let response = app
        .router
        .clone()
        .oneshot(authed_json_request(
            "POST",
            &format!("/api/roles/{reader}/menus"),
            &admin_token,
            json!([system.id, dashboard.id, users.id, add_button.id, users.id]),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/api/roles/{reader}/menus"),
            &admin_token,
        ))
        .await
        .expect("response");
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().expect("ids").len(), 4);

    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/menus/user-menus", &reader_token))
        .await
        .expect("response");
    let body = read_json(response).await;
    let tree = body["data"].as_array().expect("tree");
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0]["title"], "Dashboard");
    assert_eq!(tree[1]["title"], "System");
    assert_eq!(tree[1]["children"][0]["title"], "Users");
    // Buttons never appear in navigation.
    assert_eq!(tree[1]["children"][0]["children"], json!([]));

    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/auth/permissions", &reader_token))
        .await
        .expect("response");
    let body = read_json(response).await;
    assert_eq!(body["data"], json!(["user:add"]));
}

#[tokio::test]
async fn malformed_bodies_and_paths_are_400_envelopes() {
    let app = test_app().await;
    let admin = seed_role(&app, "admin", &["user:add", "user:list"]).await;
    let (_, token) = seed_user(&app, "root", vec![admin]).await;

    let response = app
        .router
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/users",
            &token,
            json!({"username": 42}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], 400);

    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/users/abc", &token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/users",
            &token,
            json!({"username": "root", "password": "pw"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["code"], 500);
    assert_eq!(body["message"], "username already exists");
}
