pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod services;

#[cfg(any(test, feature = "test-util"))]
pub mod test_support;
