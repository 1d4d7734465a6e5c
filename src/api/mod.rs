//! HTTP handlers. Every JSON response uses the [`response::ApiResponse`] envelope.

pub mod articles;
pub mod auth;
pub mod chat;
pub mod excel;
pub mod menus;
pub mod response;
pub mod roles;
pub mod users;

use axum::response::IntoResponse;

pub async fn health() -> impl IntoResponse {
    "OK"
}
