use bcrypt::verify;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{JwtService, PermissionService};
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::services::user::UserService;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Profile returned on login and by `/auth/userinfo`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub avatar: Option<String>,
    pub roles: Vec<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_info: UserInfo,
}

#[derive(Clone)]
pub struct AuthService {
    user_service: UserService,
    permission_service: PermissionService,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(
        user_service: UserService,
        permission_service: PermissionService,
        jwt_service: JwtService,
    ) -> Self {
        Self {
            user_service,
            permission_service,
            jwt_service,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .user_service
            .find_user_by_username(request.username.trim())
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !verify(&request.password, &user.password_hash)? {
            return Err(AppError::PasswordError);
        }

        let user_info = self.build_user_info(user).await?;
        let token = self
            .jwt_service
            .generate_token(user_info.id, &user_info.username, &user_info.roles)
            .map_err(|e| AppError::Internal(e.into()))?;

        info!(user_id = user_info.id, "user logged in");
        Ok(LoginResponse { token, user_info })
    }

    pub async fn user_info(&self, user_id: i32) -> AppResult<UserInfo> {
        let user = self
            .user_service
            .find_user_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.build_user_info(user).await
    }

    /// Permission strings the user holds, sorted.
    pub async fn permissions(&self, user_id: i32) -> AppResult<Vec<String>> {
        let permissions = self.permission_service.get_user_permissions(user_id).await?;
        Ok(permissions.into_iter().collect())
    }

    async fn build_user_info(&self, user: user::Model) -> AppResult<UserInfo> {
        let roles = self
            .user_service
            .get_user_roles(user.id)
            .await?
            .into_iter()
            .map(|role| role.role_code)
            .collect();

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            roles,
            email: user.email,
        })
    }
}
