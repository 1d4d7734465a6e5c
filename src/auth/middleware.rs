use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{JwtService, PermissionService, RequestContext, RoutePermissions};
use crate::error::AppError;

/// Paths (relative to the API prefix) reachable without a token.
pub const PUBLIC_PATHS: [&str; 3] = ["/auth/login", "/auth/logout", "/excel/export"];

/// Per-request token and permission checks.
#[derive(Clone)]
pub struct AccessGate {
    jwt_service: JwtService,
    permission_service: PermissionService,
    route_permissions: Arc<RoutePermissions>,
    public_paths: Arc<HashSet<String>>,
    api_prefix: Arc<str>,
}

impl AccessGate {
    pub fn new(
        jwt_service: JwtService,
        permission_service: PermissionService,
        route_permissions: RoutePermissions,
        api_prefix: &str,
    ) -> Self {
        Self {
            jwt_service,
            permission_service,
            route_permissions: Arc::new(route_permissions),
            public_paths: Arc::new(PUBLIC_PATHS.iter().map(|path| path.to_string()).collect()),
            api_prefix: Arc::from(api_prefix),
        }
    }

    /// Matched route pattern with the API prefix removed.
    fn route_of(&self, request: &Request) -> String {
        let full = request
            .extensions()
            .get::<MatchedPath>()
            .map(|matched| matched.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());

        match full.strip_prefix(self.api_prefix.as_ref()) {
            Some(rest) if !self.api_prefix.is_empty() => rest.to_string(),
            _ => full,
        }
    }

    fn is_public(&self, route: &str) -> bool {
        self.public_paths.contains(route)
    }

    /// Run both checks; on success returns the caller's context.
    pub async fn check(
        &self,
        method: &Method,
        route: &str,
        headers: &HeaderMap,
    ) -> Result<Option<RequestContext>, AppError> {
        if *method == Method::OPTIONS || self.is_public(route) {
            return Ok(None);
        }

        let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
        let claims = self.jwt_service.verify_token(token).map_err(|err| {
            debug!(error = %err, route, "rejecting request with invalid token");
            AppError::Unauthorized
        })?;
        let context = RequestContext::from(claims);

        if let Some(required) = self.route_permissions.required(method, route) {
            let granted = self
                .permission_service
                .user_has_permission(context.user_id, required)
                .await?;
            if !granted {
                warn!(user_id = context.user_id, permission = required, route, "permission denied");
                return Err(AppError::Forbidden);
            }
        }

        Ok(Some(context))
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn access_gate(
    State(gate): State<AccessGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let route = gate.route_of(&request);
    let context = gate
        .check(request.method(), &route, request.headers())
        .await?;

    if let Some(context) = context {
        request.extensions_mut().insert(context);
    }

    Ok(next.run(request).await)
}
