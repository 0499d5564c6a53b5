use apikit::auth::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::model::{AuthSession, DirectoryEntry, User};
use crate::domain::service::RegisterRequest;

/// Body for `POST /register` and the admin/bootstrap variants.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReq {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub tenant_id: String,
    /// Ignored by the admin paths, which force `Admin`.
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Cliente
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginReq {
    pub tenant_id: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequestReq {
    pub tenant_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResetReq {
    pub tenant_id: String,
    pub email: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordReq {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleReq {
    pub role: Role,
}

/// Comma-separated id list for the batch directory lookup.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DirectoryQuery {
    pub ids: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub tenant_id: String,
    pub role: Role,
    pub locked: bool,
    pub mfa_enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserDto,
}

/// Public directory view; field names are part of the inter-module wire
/// contract consumed by the profile services.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntryDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub account_locked: bool,
    pub created_at: DateTime<Utc>,
}

/// Acknowledgement for `POST /reset-password`; shape is identical whether
/// or not the account exists.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetAckDto {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            tenant_id: user.tenant,
            role: user.role,
            locked: user.locked,
            mfa_enabled: user.mfa_enabled,
            created_at: user.created_at,
        }
    }
}

impl From<AuthSession> for SessionDto {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
            user: session.user.into(),
        }
    }
}

impl From<DirectoryEntry> for DirectoryEntryDto {
    fn from(entry: DirectoryEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            email: entry.email,
            phone_number: entry.phone,
            role: entry.role,
            account_locked: entry.locked,
            created_at: entry.created_at,
        }
    }
}

impl From<RegisterReq> for RegisterRequest {
    fn from(req: RegisterReq) -> Self {
        Self {
            email: req.email,
            password: req.password,
            name: req.name,
            phone: req.phone,
            tenant: req.tenant_id,
            role: req.role,
        }
    }
}
