use anyhow::Result;
use apikit::auth::Role;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{NewUser, ResetToken, User};

/// Persistence port for accounts, the tenant registry, and reset tokens.
///
/// Implementations lift driver errors into `anyhow::Error`; the service maps
/// them to domain errors at the boundary.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Lookup scoped by tenant; emails are only unique per tenant.
    async fn find_by_email(&self, tenant: &str, email: &str) -> Result<Option<User>>;

    /// Batch lookup; missing ids are simply absent from the result.
    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>>;

    async fn list_tenant(&self, tenant: &str) -> Result<Vec<User>>;

    async fn email_taken(&self, tenant: &str, email: &str) -> Result<bool>;

    async fn phone_taken(&self, tenant: &str, phone: &str) -> Result<bool>;

    /// Insert the user, creating the tenant registry row when absent.
    /// When `grants_admin` is set, `tenants.has_admin` flips to true in the
    /// same transaction as the insert.
    async fn insert_user(&self, user: NewUser, grants_admin: bool) -> Result<User>;

    /// Registry read: whether the tenant already has an admin account.
    /// Unknown tenants answer false.
    async fn tenant_has_admin(&self, tenant: &str) -> Result<bool>;

    /// Update the role column. When `grants_admin` is set the tenant
    /// registry is updated in the same transaction.
    async fn set_role(&self, id: i64, role: Role, grants_admin: bool) -> Result<()>;

    async fn set_locked(&self, id: i64, locked: bool, at: Option<DateTime<Utc>>) -> Result<()>;

    /// Clears the failure counter and the last-failure timestamp.
    async fn reset_failed_logins(&self, id: i64) -> Result<()>;

    /// Store a failed attempt: the new counter value, the attempt time, and
    /// whether this attempt crossed the lockout threshold.
    async fn record_failed_login(
        &self,
        id: i64,
        failed_logins: i32,
        at: DateTime<Utc>,
        lock: bool,
    ) -> Result<()>;

    async fn set_password_hash(&self, id: i64, hash: &str) -> Result<()>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete_user(&self, id: i64) -> Result<bool>;

    async fn store_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Most recent unused token row matching the hash, if any.
    async fn find_reset_token(&self, user_id: i64, token_hash: &str)
        -> Result<Option<ResetToken>>;

    async fn mark_reset_used(&self, token_id: i64) -> Result<()>;
}
