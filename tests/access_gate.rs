mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use backoffice::services::ArticleInput;
use common::{
    authed_json_request, authed_request, json_request, read_json, seed_role, seed_user, test_app,
};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn missing_token_is_rejected_with_401_envelope() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["code"], 401);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn forged_token_is_rejected() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/auth/userinfo", "not.a.token"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_user_without_permission_gets_403() {
    let app = test_app().await;
    let (_, token) = seed_user(&app, "viewer", Vec::new()).await;

    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/users", &token))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json(response).await;
    assert_eq!(body["code"], 403);
}

#[tokio::test]
async fn authentication_only_routes_need_no_permission() {
    let app = test_app().await;
    let (user_id, token) = seed_user(&app, "viewer", Vec::new()).await;

    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/auth/userinfo", &token))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["id"], user_id);
    assert_eq!(body["data"]["username"], "viewer");

    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/menus/user-menus", &token))
        .await
        .expect("response");
    let body = read_json(response).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn public_paths_bypass_the_token_check() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"username": "ghost", "password": "x"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["code"], 4001);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/excel/export",
            json!({"headers": ["a"], "data": [["1"]]}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=export.xlsx"
    );

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn permissions_from_every_role_are_honored() {
    let app = test_app().await;
    let first = seed_role(&app, "creator", &["user:add"]).await;
    let second = seed_role(&app, "janitor", &["article:delete"]).await;
    assert_eq!((first, second), (1, 2));
    let (user_id, token) = seed_user(&app, "both", vec![first, second]).await;

    let response = app
        .router
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/users",
            &token,
            json!({"username": "newbie", "password": "pw"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["username"], "newbie");
    assert!(body["data"].get("passwordHash").is_none());

    let article = app
        .state
        .article_service
        .save_article(
            ArticleInput {
                title: Some("old news".into()),
                ..Default::default()
            },
            user_id,
        )
        .await
        .expect("article");
    let response = app
        .router
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/articles/{}", article.id),
            &token,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    // Neither role grants listing users.
    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/users", &token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_then_use_the_issued_token() {
    let app = test_app().await;
    let role = seed_role(&app, "auditor", &["user:list"]).await;
    seed_user(&app, "carol", vec![role]).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"username": "carol", "password": "wrong"}),
        ))
        .await
        .expect("response");
    let body = read_json(response).await;
    assert_eq!(body["code"], 4002);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"username": "carol", "password": "secret"}),
        ))
        .await
        .expect("response");
    let body = read_json(response).await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["userInfo"]["roles"], json!(["auditor"]));
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/auth/permissions", &token))
        .await
        .expect("response");
    let body = read_json(response).await;
    assert_eq!(body["data"], json!(["user:list"]));

    let response = app
        .router
        .clone()
        .oneshot(authed_request("GET", "/api/users?page=1&size=5", &token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"][0]["roles"][0]["roleCode"], "auditor");
}
