//! SeaORM-backed implementation of the persistence port.
//!
//! Generic over `C: ConnectionTrait + TransactionTrait` so it works with a
//! plain `DatabaseConnection` as well as an outer transaction.

use anyhow::{Context, Result};
use apikit::auth::Role;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::model::{NewUser, ResetToken, User};
use crate::domain::repo::AuthRepository;
use crate::infra::storage::entities::{password_resets, tenants, users};
use crate::infra::storage::mapper;

pub struct SeaOrmAuthRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAuthRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Create the registry row when absent; flip `has_admin` when requested.
async fn upsert_tenant(txn: &DatabaseTransaction, tenant: &str, grants_admin: bool) -> Result<()> {
    match tenants::Entity::find_by_id(tenant)
        .one(txn)
        .await
        .context("tenant lookup failed")?
    {
        Some(row) => {
            if grants_admin && !row.has_admin {
                let am = tenants::ActiveModel {
                    tenant_id: Set(row.tenant_id),
                    has_admin: Set(true),
                    ..Default::default()
                };
                am.update(txn).await.context("tenant update failed")?;
            }
        }
        None => {
            let am = tenants::ActiveModel {
                tenant_id: Set(tenant.to_owned()),
                has_admin: Set(grants_admin),
                created_at: Set(Utc::now()),
            };
            am.insert(txn).await.context("tenant insert failed")?;
        }
    }
    Ok(())
}

#[async_trait]
impl<C> AuthRepository for SeaOrmAuthRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let found = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        found.map(mapper::user_from_row).transpose()
    }

    async fn find_by_email(&self, tenant: &str, email: &str) -> Result<Option<User>> {
        let found = users::Entity::find()
            .filter(users::Column::TenantId.eq(tenant))
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        found.map(mapper::user_from_row).transpose()
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("find_many failed")?;
        rows.into_iter().map(mapper::user_from_row).collect()
    }

    async fn list_tenant(&self, tenant: &str) -> Result<Vec<User>> {
        let rows = users::Entity::find()
            .filter(users::Column::TenantId.eq(tenant))
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("list_tenant failed")?;
        rows.into_iter().map(mapper::user_from_row).collect()
    }

    async fn email_taken(&self, tenant: &str, email: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::TenantId.eq(tenant))
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_taken failed")?;
        Ok(count > 0)
    }

    async fn phone_taken(&self, tenant: &str, phone: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::TenantId.eq(tenant))
            .filter(users::Column::Phone.eq(phone))
            .count(&self.conn)
            .await
            .context("phone_taken failed")?;
        Ok(count > 0)
    }

    async fn insert_user(&self, user: NewUser, grants_admin: bool) -> Result<User> {
        let txn = self
            .conn
            .begin()
            .await
            .context("begin insert_user transaction failed")?;

        upsert_tenant(&txn, &user.tenant, grants_admin).await?;

        let am = users::ActiveModel {
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            display_name: Set(user.name),
            phone: Set(user.phone),
            tenant_id: Set(user.tenant),
            role: Set(user.role.as_str().to_owned()),
            locked: Set(false),
            failed_logins: Set(0),
            mfa_enabled: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = am.insert(&txn).await.context("insert user failed")?;

        txn.commit()
            .await
            .context("commit insert_user transaction failed")?;
        mapper::user_from_row(row)
    }

    async fn tenant_has_admin(&self, tenant: &str) -> Result<bool> {
        let found = tenants::Entity::find_by_id(tenant)
            .one(&self.conn)
            .await
            .context("tenant_has_admin failed")?;
        Ok(found.map(|row| row.has_admin).unwrap_or(false))
    }

    async fn set_role(&self, id: i64, role: Role, grants_admin: bool) -> Result<()> {
        let txn = self
            .conn
            .begin()
            .await
            .context("begin set_role transaction failed")?;

        let row = users::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("set_role lookup failed")?
            .context("set_role target vanished")?;

        let am = users::ActiveModel {
            id: Set(id),
            role: Set(role.as_str().to_owned()),
            ..Default::default()
        };
        am.update(&txn).await.context("set_role update failed")?;

        if grants_admin {
            upsert_tenant(&txn, &row.tenant_id, true).await?;
        }

        txn.commit()
            .await
            .context("commit set_role transaction failed")?;
        Ok(())
    }

    async fn set_locked(&self, id: i64, locked: bool, at: Option<DateTime<Utc>>) -> Result<()> {
        let am = users::ActiveModel {
            id: Set(id),
            locked: Set(locked),
            locked_at: Set(at),
            ..Default::default()
        };
        am.update(&self.conn).await.context("set_locked failed")?;
        Ok(())
    }

    async fn reset_failed_logins(&self, id: i64) -> Result<()> {
        let am = users::ActiveModel {
            id: Set(id),
            failed_logins: Set(0),
            last_failed_login: Set(None),
            ..Default::default()
        };
        am.update(&self.conn)
            .await
            .context("reset_failed_logins failed")?;
        Ok(())
    }

    async fn record_failed_login(
        &self,
        id: i64,
        failed_logins: i32,
        at: DateTime<Utc>,
        lock: bool,
    ) -> Result<()> {
        let mut am = users::ActiveModel {
            id: Set(id),
            failed_logins: Set(failed_logins),
            last_failed_login: Set(Some(at)),
            ..Default::default()
        };
        if lock {
            am.locked = Set(true);
            am.locked_at = Set(Some(at));
        }
        am.update(&self.conn)
            .await
            .context("record_failed_login failed")?;
        Ok(())
    }

    async fn set_password_hash(&self, id: i64, hash: &str) -> Result<()> {
        let am = users::ActiveModel {
            id: Set(id),
            password_hash: Set(hash.to_owned()),
            ..Default::default()
        };
        am.update(&self.conn)
            .await
            .context("set_password_hash failed")?;
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        let res = users::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_user failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn store_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let am = password_resets::ActiveModel {
            user_id: Set(user_id),
            token_hash: Set(token_hash.to_owned()),
            expires_at: Set(expires_at),
            used: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        am.insert(&self.conn)
            .await
            .context("store_reset_token failed")?;
        Ok(())
    }

    async fn find_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
    ) -> Result<Option<ResetToken>> {
        let found = password_resets::Entity::find()
            .filter(password_resets::Column::UserId.eq(user_id))
            .filter(password_resets::Column::TokenHash.eq(token_hash))
            .filter(password_resets::Column::Used.eq(false))
            .order_by_desc(password_resets::Column::Id)
            .one(&self.conn)
            .await
            .context("find_reset_token failed")?;
        Ok(found.map(mapper::reset_token_from_row))
    }

    async fn mark_reset_used(&self, token_id: i64) -> Result<()> {
        let am = password_resets::ActiveModel {
            id: Set(token_id),
            used: Set(true),
            ..Default::default()
        };
        am.update(&self.conn)
            .await
            .context("mark_reset_used failed")?;
        Ok(())
    }
}
