use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) phone_number: Option<String>,
    pub(crate) avatar: Option<String>,
    pub(crate) role: UserRole,
    pub(crate) is_email_verified: bool,
    pub(crate) last_login_at: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            phone_number: user.phone_number,
            avatar: user.avatar,
            role: user.role,
            is_email_verified: user.is_email_verified,
            last_login_at: user.last_login_at.map(format_primitive),
            created_at: format_primitive(user.created_at),
            updated_at: format_primitive(user.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileResponse {
    pub(crate) avatar: Option<String>,
    pub(crate) username: String,
    pub(crate) phone_number: Option<String>,
    pub(crate) email: String,
}

impl ProfileResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            avatar: user.avatar,
            username: user.username,
            phone_number: user.phone_number,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateProfileRequest {
    #[serde(default)]
    pub(crate) username: Option<String>,
    #[serde(default)]
    #[serde(alias = "phoneNumber")]
    pub(crate) phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateRoleRequest {
    pub(crate) id: Uuid,
    pub(crate) role: UserRole,
}

#[derive(Debug, Serialize)]
pub(crate) struct AvatarResponse {
    pub(crate) avatar_url: String,
}
