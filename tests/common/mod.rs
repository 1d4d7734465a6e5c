#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use backoffice::app::{build_router, AppState};
use backoffice::config::AppConfig;
use backoffice::entities::sea_orm_active_enums::MenuType;
use backoffice::services::{CreateUserInput, MenuInput, RoleInput};
use backoffice::test_support::test_db;
use sea_orm::DatabaseConnection;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: DatabaseConnection,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-secret".to_string(),
        jwt_expiration_hours: 1,
        cors_origins: "*".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        api_prefix: "/api".to_string(),
        bcrypt_cost: 4,
        environment: "test".to_string(),
    }
}

pub async fn test_app() -> TestApp {
    let db = test_db().await;
    let state = AppState::new(db.clone(), &test_config());
    let router = build_router(state.clone());
    TestApp { router, state, db }
}

/// Role holding one button per permission string.
pub async fn seed_role(app: &TestApp, code: &str, permissions: &[&str]) -> i32 {
    let role = app
        .state
        .role_service
        .create_role(RoleInput {
            role_code: Some(code.to_string()),
            role_name: Some(format!("{code} role")),
            description: None,
        })
        .await
        .expect("create role");

    let mut menu_ids = Vec::new();
    for permission in permissions {
        let menu = app
            .state
            .menu_service
            .create_menu(MenuInput {
                title: Some(permission.to_string()),
                menu_type: Some(MenuType::Button),
                permission: Some(permission.to_string()),
                ..Default::default()
            })
            .await
            .expect("create menu");
        menu_ids.push(menu.id);
    }

    app.state
        .role_service
        .assign_role_menus(role.id, &menu_ids)
        .await
        .expect("assign menus");
    role.id
}

/// Creates a user with password `secret` and returns its id and a token.
pub async fn seed_user(app: &TestApp, username: &str, role_ids: Vec<i32>) -> (i32, String) {
    let user = app
        .state
        .user_service
        .create_user(CreateUserInput {
            username: username.to_string(),
            password: "secret".to_string(),
            role_ids: Some(role_ids),
            ..Default::default()
        })
        .await
        .expect("create user");

    let roles: Vec<String> = app
        .state
        .user_service
        .get_user_roles(user.id)
        .await
        .expect("user roles")
        .into_iter()
        .map(|role| role.role_code)
        .collect();
    let token = app
        .state
        .jwt_service
        .generate_token(user.id, &user.username, &roles)
        .expect("token");
    (user.id, token)
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}
