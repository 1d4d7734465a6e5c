//! Route metadata consulted by the access gate: `(method, route pattern) -> permission`.
//!
//! Route patterns are written relative to the API prefix and use the same
//! `{param}` syntax as the router, so a lookup is keyed by the matched route
//! rather than by the concrete request path.

use std::collections::HashMap;

use axum::http::Method;

#[derive(Debug, Clone, Default)]
pub struct RoutePermissions {
    entries: HashMap<(Method, String), String>,
}

impl RoutePermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, method: Method, route: &str, permission: &str) -> Self {
        self.entries
            .insert((method, route.to_string()), permission.to_string());
        self
    }

    /// Permission a route demands, if any.
    pub fn required(&self, method: &Method, route: &str) -> Option<&str> {
        self.entries
            .get(&(method.clone(), route.to_string()))
            .map(String::as_str)
    }

    /// Permissions guarding the back office endpoints.
    pub fn back_office() -> Self {
        Self::new()
            .require(Method::GET, "/users", "user:list")
            .require(Method::GET, "/users/{id}", "user:list")
            .require(Method::POST, "/users", "user:add")
            .require(Method::PUT, "/users/{id}", "user:edit")
            .require(Method::DELETE, "/users/{id}", "user:delete")
            .require(Method::GET, "/roles", "role:list")
            .require(Method::GET, "/roles/{id}", "role:list")
            .require(Method::POST, "/roles", "role:add")
            .require(Method::PUT, "/roles/{id}", "role:edit")
            .require(Method::DELETE, "/roles/{id}", "role:delete")
            .require(Method::GET, "/roles/{id}/menus", "role:permission")
            .require(Method::POST, "/roles/{id}/menus", "role:permission")
            .require(Method::GET, "/menus", "menu:list")
            .require(Method::GET, "/menus/{id}", "menu:list")
            .require(Method::POST, "/menus", "menu:add")
            .require(Method::PUT, "/menus/{id}", "menu:edit")
            .require(Method::DELETE, "/menus/{id}", "menu:delete")
            .require(Method::GET, "/articles", "article:list")
            .require(Method::GET, "/articles/{id}", "article:list")
            .require(Method::POST, "/articles", "article:add")
            .require(Method::DELETE, "/articles/{id}", "article:delete")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_keyed_by_method_and_pattern() {
        let table = RoutePermissions::back_office();
        assert_eq!(table.required(&Method::POST, "/users"), Some("user:add"));
        assert_eq!(table.required(&Method::GET, "/users"), Some("user:list"));
        assert_eq!(table.required(&Method::DELETE, "/articles/{id}"), Some("article:delete"));
        assert_eq!(table.required(&Method::GET, "/menus/user-menus"), None);
        assert_eq!(table.required(&Method::PATCH, "/users/{id}"), None);
    }

    #[test]
    fn later_entries_replace_earlier_ones() {
        let table = RoutePermissions::new()
            .require(Method::GET, "/reports", "report:view")
            .require(Method::GET, "/reports", "report:list");
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.required(&Method::GET, "/reports"), Some("report:list"));
    }
}
