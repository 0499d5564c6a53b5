use apikit::auth::Role;
use chrono::{DateTime, Utc};

/// A stored account, tenant-scoped.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub tenant: String,
    pub role: Role,
    pub locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub failed_logins: i32,
    pub last_failed_login: Option<DateTime<Utc>>,
    pub mfa_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Data needed to insert an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub tenant: String,
    pub role: Role,
}

/// Public view served by the directory lookups; no tenant, no counters.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for DirectoryEntry {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            locked: user.locked,
            created_at: user.created_at,
        }
    }
}

/// A signed token together with the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Stored reset token row as seen by the service; only unused rows surface.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub id: i64,
    pub expires_at: DateTime<Utc>,
}
