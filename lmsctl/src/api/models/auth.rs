//! API request/response models for authentication.

use crate::api::models::users::Role;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Which role partition to authenticate against: "student", "admin", or "instructor"
    pub user_type: String,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub user_type: String,
}

/// Successful login/registration payload: the bearer token plus the identity
/// it encodes, so clients need not decode the token themselves.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub username: String,
    pub role: Role,
    pub user_id: UserId,
}

impl AuthResponse {
    pub fn bearer(token: String, username: String, role: Role, user_id: UserId) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            username,
            role,
            user_id,
        }
    }
}

/// Response of `GET /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationInfo {
    pub enabled: bool,
    pub message: String,
}
