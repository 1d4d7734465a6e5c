//! Router composition and the state shared by every handler.

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request, Uri,
    },
    middleware,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info_span, warn, Span};

use crate::api;
use crate::auth::{access_gate, AccessGate, JwtService, PermissionService, RoutePermissions};
use crate::config::AppConfig;
use crate::services::{
    ArticleService, AuthService, ChatRelay, MenuService, RoleService, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub permission_service: PermissionService,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub role_service: RoleService,
    pub menu_service: MenuService,
    pub article_service: ArticleService,
    pub chat_relay: ChatRelay,
    pub gate: AccessGate,
    pub api_prefix: String,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        let jwt_service = JwtService::new(
            &config.jwt_secret,
            Duration::hours(config.jwt_expiration_hours),
        );
        let permission_service = PermissionService::new(db.clone());
        let user_service = UserService::new(db.clone(), config.bcrypt_cost);
        let auth_service = AuthService::new(
            user_service.clone(),
            permission_service.clone(),
            jwt_service.clone(),
        );
        let gate = AccessGate::new(
            jwt_service.clone(),
            permission_service.clone(),
            RoutePermissions::back_office(),
            &config.api_prefix,
        );

        Self {
            jwt_service,
            permission_service,
            auth_service,
            user_service,
            role_service: RoleService::new(db.clone()),
            menu_service: MenuService::new(db.clone()),
            article_service: ArticleService::new(db.clone()),
            chat_relay: ChatRelay::new(db),
            gate,
            api_prefix: config.api_prefix.clone(),
        }
    }
}

/// Routes under the API prefix, all behind the access gate.
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/userinfo", get(api::auth::user_info))
        .route("/auth/permissions", get(api::auth::permissions))
        .route(
            "/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/users/{id}",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        .route(
            "/roles",
            get(api::roles::list_roles).post(api::roles::create_role),
        )
        .route(
            "/roles/{id}",
            get(api::roles::get_role)
                .put(api::roles::update_role)
                .delete(api::roles::delete_role),
        )
        .route(
            "/roles/{id}/menus",
            get(api::roles::role_menus).post(api::roles::assign_role_menus),
        )
        .route(
            "/menus",
            get(api::menus::menu_tree).post(api::menus::create_menu),
        )
        .route("/menus/user-menus", get(api::menus::user_menus))
        .route(
            "/menus/{id}",
            get(api::menus::get_menu)
                .put(api::menus::update_menu)
                .delete(api::menus::delete_menu),
        )
        .route(
            "/articles",
            get(api::articles::list_articles).post(api::articles::save_article),
        )
        .route(
            "/articles/{id}",
            get(api::articles::get_article).delete(api::articles::delete_article),
        )
        .route(
            "/excel/import",
            post(api::excel::import_excel)
                .layer(DefaultBodyLimit::max(api::excel::MAX_UPLOAD_BYTES)),
        )
        .route("/excel/export", post(api::excel::export_excel))
        .route("/chat/test", get(api::chat::chat_test))
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            access_gate,
        ))
}

pub fn build_router(state: AppState) -> Router {
    let api = api_routes(&state);
    let router = if state.api_prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&state.api_prefix, api)
    };

    router
        .route("/health", get(api::health))
        .route("/ws/chat", get(api::chat::chat_socket))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| request_span(request)),
        )
        .with_state(state)
}

fn request_span(request: &Request<Body>) -> Span {
    info_span!(
        "http.request",
        method = %request.method(),
        uri = %redacted_uri(request.uri()),
        version = ?request.version()
    )
}

/// The request URI with any `token` query value masked, so chat sockets
/// opened with `?token=` never put a credential in the logs.
fn redacted_uri(uri: &Uri) -> String {
    let Some(query) = uri.query() else {
        return uri.path().to_string();
    };
    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some(("token", _)) => "token=***",
            _ => pair,
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", uri.path(), query)
}

/// `*` allows any origin; otherwise a comma separated origin list.
pub fn cors_layer(origins: &str) -> CorsLayer {
    if origins.trim() == "*" {
        warn!("CORS set to accept ANY origin (*), only use in development");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_query_values_are_masked() {
        let uri: Uri = "/ws/chat?room=1&token=eyJhbGciOi.abc.def".parse().unwrap();
        assert_eq!(redacted_uri(&uri), "/ws/chat?room=1&token=***");

        let uri: Uri = "/api/users?page=2".parse().unwrap();
        assert_eq!(redacted_uri(&uri), "/api/users?page=2");

        let uri: Uri = "/health".parse().unwrap();
        assert_eq!(redacted_uri(&uri), "/health");
    }
}
