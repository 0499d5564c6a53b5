//! Account lifecycle and session issuance.

use std::sync::Arc;

use apikit::auth::{Role, TokenSigner};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use super::error::DomainError;
use super::model::{AuthSession, DirectoryEntry, NewUser, User};
use super::password;
use super::repo::AuthRepository;
use crate::config::AuthConfig;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));
static TENANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,100}$").expect("tenant regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{1,15}$").expect("phone regex"));

/// Upper bound on a single directory batch request.
pub const MAX_DIRECTORY_BATCH: usize = 200;

/// Payload for account creation; `role` is ignored by the admin paths.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub tenant: String,
    pub role: Role,
}

pub struct Service {
    repo: Arc<dyn AuthRepository>,
    signer: TokenSigner,
    config: AuthConfig,
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(e.to_string())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn token_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

impl Service {
    pub fn new(repo: Arc<dyn AuthRepository>, signer: TokenSigner, config: AuthConfig) -> Self {
        Self {
            repo,
            signer,
            config,
        }
    }

    fn validate_registration(
        &self,
        email: &str,
        name: &str,
        phone: &str,
        tenant: &str,
        plain: &str,
    ) -> Result<(), DomainError> {
        if !EMAIL_RE.is_match(email) {
            return Err(DomainError::validation("email", "invalid email address"));
        }
        let name_len = name.chars().count();
        if !(2..=100).contains(&name_len) {
            return Err(DomainError::validation(
                "name",
                "must be between 2 and 100 characters",
            ));
        }
        if !PHONE_RE.is_match(phone) {
            return Err(DomainError::validation(
                "phone",
                "must be digits with an optional leading '+', at most 15 digits",
            ));
        }
        if !TENANT_RE.is_match(tenant) {
            return Err(DomainError::validation(
                "tenantId",
                "must be 1-100 characters of letters, digits, '_' or '-'",
            ));
        }
        password::validate_strength(plain)
    }

    fn open_session(&self, user: User) -> Result<AuthSession, DomainError> {
        let issued = self
            .signer
            .issue(user.id, &user.tenant, user.role, &user.name, user.mfa_enabled)
            .map_err(|e| DomainError::internal(format!("token signing failed: {e}")))?;
        Ok(AuthSession {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    async fn ensure_unique(&self, tenant: &str, email: &str, phone: &str) -> Result<(), DomainError> {
        if self.repo.email_taken(tenant, email).await.map_err(db_err)? {
            return Err(DomainError::email_taken(email));
        }
        if self.repo.phone_taken(tenant, phone).await.map_err(db_err)? {
            return Err(DomainError::phone_taken(phone));
        }
        Ok(())
    }

    /// Caller must exist and hold the `Admin` role; anything else is a 403.
    async fn resolve_admin_caller(&self, caller_id: i64) -> Result<User, DomainError> {
        let caller = self
            .repo
            .find_by_id(caller_id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::NotAuthorized)?;
        if caller.role != Role::Admin {
            return Err(DomainError::NotAuthorized);
        }
        Ok(caller)
    }

    /// Tenant scoping is checked before existence: a foreign-tenant row
    /// answers 403, only a truly absent id answers 404.
    async fn resolve_target(&self, caller: &User, target_id: i64) -> Result<User, DomainError> {
        match self.repo.find_by_id(target_id).await.map_err(db_err)? {
            Some(user) if user.tenant == caller.tenant => Ok(user),
            Some(_) => Err(DomainError::NotAuthorized),
            None => Err(DomainError::user_not_found(target_id)),
        }
    }

    #[instrument(name = "auth.service.register", skip(self, req), fields(tenant = %req.tenant))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthSession, DomainError> {
        if req.role == Role::Admin {
            return Err(DomainError::validation("role", "must be Cliente or Cuidador"));
        }
        let email = normalize_email(&req.email);
        self.validate_registration(&email, &req.name, &req.phone, &req.tenant, &req.password)?;
        self.ensure_unique(&req.tenant, &email, &req.phone).await?;

        let password_hash = password::hash_password(&req.password)?;
        let user = self
            .repo
            .insert_user(
                NewUser {
                    email,
                    password_hash,
                    name: req.name,
                    phone: req.phone,
                    tenant: req.tenant,
                    role: req.role,
                },
                false,
            )
            .await
            .map_err(db_err)?;

        info!(user_id = user.id, role = %user.role, "account registered");
        self.open_session(user)
    }

    /// Wrong email, wrong password and a locked account all fail the same
    /// way so the response never leaks which part was at fault.
    #[instrument(name = "auth.service.login", skip(self, email, plain), fields(tenant = %tenant))]
    pub async fn login(
        &self,
        tenant: &str,
        email: &str,
        plain: &str,
    ) -> Result<AuthSession, DomainError> {
        let email = normalize_email(email);
        let Some(user) = self
            .repo
            .find_by_email(tenant, &email)
            .await
            .map_err(db_err)?
        else {
            return Err(DomainError::invalid_credentials());
        };

        if user.locked {
            return Err(DomainError::invalid_credentials());
        }

        if !password::verify_password(plain, &user.password_hash) {
            let failed = user.failed_logins + 1;
            let lock = failed >= self.config.max_failed_logins;
            self.repo
                .record_failed_login(user.id, failed, Utc::now(), lock)
                .await
                .map_err(db_err)?;
            if lock {
                warn!(user_id = user.id, "account locked after repeated failures");
            }
            return Err(DomainError::invalid_credentials());
        }

        if user.failed_logins > 0 {
            self.repo.reset_failed_logins(user.id).await.map_err(db_err)?;
        }

        info!(user_id = user.id, "login succeeded");
        self.open_session(User {
            failed_logins: 0,
            last_failed_login: None,
            ..user
        })
    }

    #[instrument(name = "auth.service.me", skip(self))]
    pub async fn me(&self, user_id: i64) -> Result<User, DomainError> {
        self.repo
            .find_by_id(user_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(user_id))
    }

    /// Returns the plaintext token for delivery. An unknown email yields
    /// `Ok(None)` so callers can answer with the same acknowledgement.
    #[instrument(name = "auth.service.request_password_reset", skip_all, fields(tenant = %tenant))]
    pub async fn request_password_reset(
        &self,
        tenant: &str,
        email: &str,
    ) -> Result<Option<String>, DomainError> {
        let email = normalize_email(email);
        let Some(user) = self
            .repo
            .find_by_email(tenant, &email)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let ttl = Duration::from_std(self.config.reset_token_ttl)
            .unwrap_or_else(|_| Duration::minutes(30));
        self.repo
            .store_reset_token(user.id, &token_hash(&token), Utc::now() + ttl)
            .await
            .map_err(db_err)?;

        info!(user_id = user.id, "password reset token issued");
        Ok(Some(token))
    }

    #[instrument(name = "auth.service.confirm_password_reset", skip_all, fields(tenant = %tenant))]
    pub async fn confirm_password_reset(
        &self,
        tenant: &str,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        let email = normalize_email(email);
        let Some(user) = self
            .repo
            .find_by_email(tenant, &email)
            .await
            .map_err(db_err)?
        else {
            return Err(DomainError::InvalidResetToken);
        };

        password::validate_strength(new_password)?;

        let Some(row) = self
            .repo
            .find_reset_token(user.id, &token_hash(token))
            .await
            .map_err(db_err)?
        else {
            return Err(DomainError::InvalidResetToken);
        };
        if row.expires_at < Utc::now() {
            return Err(DomainError::InvalidResetToken);
        }

        let hash = password::hash_password(new_password)?;
        self.repo.set_password_hash(user.id, &hash).await.map_err(db_err)?;
        self.repo.mark_reset_used(row.id).await.map_err(db_err)?;
        self.repo.reset_failed_logins(user.id).await.map_err(db_err)?;

        info!(user_id = user.id, "password reset completed");
        Ok(())
    }

    #[instrument(name = "auth.service.change_password", skip(self, current, new_password))]
    pub async fn change_password(
        &self,
        user_id: i64,
        current: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(user_id))?;

        if !password::verify_password(current, &user.password_hash) {
            return Err(DomainError::validation(
                "currentPassword",
                "does not match the current password",
            ));
        }
        password::validate_strength(new_password)?;

        let hash = password::hash_password(new_password)?;
        self.repo.set_password_hash(user.id, &hash).await.map_err(db_err)?;
        info!(user_id = user.id, "password changed");
        Ok(())
    }

    #[instrument(name = "auth.service.directory_lookup", skip(self))]
    pub async fn directory_lookup(&self, user_id: i64) -> Result<DirectoryEntry, DomainError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(user_id))?;
        Ok(DirectoryEntry::from(&user))
    }

    #[instrument(name = "auth.service.directory_batch", skip(self), fields(count = ids.len()))]
    pub async fn directory_batch(&self, ids: &[i64]) -> Result<Vec<DirectoryEntry>, DomainError> {
        if ids.len() > MAX_DIRECTORY_BATCH {
            return Err(DomainError::validation(
                "ids",
                "at most 200 ids per request",
            ));
        }
        let users = self.repo.find_many(ids).await.map_err(db_err)?;
        Ok(users.iter().map(DirectoryEntry::from).collect())
    }

    /// First-admin bootstrap; refused once the tenant already has one.
    #[instrument(name = "auth.service.bootstrap", skip(self, req), fields(tenant = %req.tenant))]
    pub async fn bootstrap(&self, req: RegisterRequest) -> Result<AuthSession, DomainError> {
        let email = normalize_email(&req.email);
        self.validate_registration(&email, &req.name, &req.phone, &req.tenant, &req.password)?;

        if self.repo.tenant_has_admin(&req.tenant).await.map_err(db_err)? {
            return Err(DomainError::admin_exists(&req.tenant));
        }
        self.ensure_unique(&req.tenant, &email, &req.phone).await?;

        let password_hash = password::hash_password(&req.password)?;
        let user = self
            .repo
            .insert_user(
                NewUser {
                    email,
                    password_hash,
                    name: req.name,
                    phone: req.phone,
                    tenant: req.tenant,
                    role: Role::Admin,
                },
                true,
            )
            .await
            .map_err(db_err)?;

        info!(user_id = user.id, "tenant bootstrapped with first admin");
        self.open_session(user)
    }

    #[instrument(name = "auth.service.admin_register", skip(self, req))]
    pub async fn admin_register(
        &self,
        caller_id: i64,
        req: RegisterRequest,
    ) -> Result<User, DomainError> {
        let caller = self.resolve_admin_caller(caller_id).await?;
        if req.tenant != caller.tenant {
            return Err(DomainError::NotAuthorized);
        }

        let email = normalize_email(&req.email);
        self.validate_registration(&email, &req.name, &req.phone, &req.tenant, &req.password)?;
        self.ensure_unique(&req.tenant, &email, &req.phone).await?;

        let password_hash = password::hash_password(&req.password)?;
        let user = self
            .repo
            .insert_user(
                NewUser {
                    email,
                    password_hash,
                    name: req.name,
                    phone: req.phone,
                    tenant: req.tenant,
                    role: Role::Admin,
                },
                true,
            )
            .await
            .map_err(db_err)?;

        info!(user_id = user.id, by = caller.id, "admin account created");
        Ok(user)
    }

    #[instrument(name = "auth.service.admin_list_users", skip(self))]
    pub async fn admin_list_users(&self, caller_id: i64) -> Result<Vec<User>, DomainError> {
        let caller = self.resolve_admin_caller(caller_id).await?;
        self.repo.list_tenant(&caller.tenant).await.map_err(db_err)
    }

    #[instrument(name = "auth.service.admin_get_user", skip(self))]
    pub async fn admin_get_user(&self, caller_id: i64, target_id: i64) -> Result<User, DomainError> {
        let caller = self.resolve_admin_caller(caller_id).await?;
        self.resolve_target(&caller, target_id).await
    }

    /// Admins cannot be demoted; promoting to `Admin` also flips the
    /// tenant registry flag.
    #[instrument(name = "auth.service.admin_set_role", skip(self), fields(role = %role))]
    pub async fn admin_set_role(
        &self,
        caller_id: i64,
        target_id: i64,
        role: Role,
    ) -> Result<User, DomainError> {
        let caller = self.resolve_admin_caller(caller_id).await?;
        let target = self.resolve_target(&caller, target_id).await?;

        if target.role == Role::Admin && role != Role::Admin {
            return Err(DomainError::AdminDemotion);
        }
        if target.role == role {
            return Ok(target);
        }

        self.repo
            .set_role(target.id, role, role == Role::Admin)
            .await
            .map_err(db_err)?;

        info!(user_id = target.id, by = caller.id, role = %role, "role changed");
        Ok(User { role, ..target })
    }

    #[instrument(name = "auth.service.admin_lock", skip(self))]
    pub async fn admin_lock(&self, caller_id: i64, target_id: i64) -> Result<(), DomainError> {
        let caller = self.resolve_admin_caller(caller_id).await?;
        let target = self.resolve_target(&caller, target_id).await?;

        self.repo
            .set_locked(target.id, true, Some(Utc::now()))
            .await
            .map_err(db_err)?;
        info!(user_id = target.id, by = caller.id, "account locked");
        Ok(())
    }

    /// Unlocking also clears the failed-login counter so the next mistake
    /// does not re-lock immediately.
    #[instrument(name = "auth.service.admin_unlock", skip(self))]
    pub async fn admin_unlock(&self, caller_id: i64, target_id: i64) -> Result<(), DomainError> {
        let caller = self.resolve_admin_caller(caller_id).await?;
        let target = self.resolve_target(&caller, target_id).await?;

        self.repo
            .set_locked(target.id, false, None)
            .await
            .map_err(db_err)?;
        self.repo.reset_failed_logins(target.id).await.map_err(db_err)?;
        info!(user_id = target.id, by = caller.id, "account unlocked");
        Ok(())
    }

    #[instrument(name = "auth.service.admin_delete", skip(self))]
    pub async fn admin_delete(&self, caller_id: i64, target_id: i64) -> Result<(), DomainError> {
        let caller = self.resolve_admin_caller(caller_id).await?;
        let target = self.resolve_target(&caller, target_id).await?;

        if caller.id == target.id {
            return Err(DomainError::SelfDeletion);
        }

        let removed = self.repo.delete_user(target.id).await.map_err(db_err)?;
        if !removed {
            return Err(DomainError::user_not_found(target.id));
        }
        info!(user_id = target.id, by = caller.id, "account deleted");
        Ok(())
    }
}
