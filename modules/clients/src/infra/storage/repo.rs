//! SeaORM-backed implementation of the profile persistence port.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::model::{ClientProfile, NewProfile, ProfilePatch, ProfileStatus};
use crate::domain::repo::ClientsRepository;
use crate::infra::storage::entities::client_profiles;
use crate::infra::storage::mapper;

pub struct SeaOrmClientsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmClientsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn active() -> sea_orm::sea_query::SimpleExpr {
    client_profiles::Column::Status.eq(ProfileStatus::Activo.as_str())
}

#[async_trait]
impl<C> ClientsRepository for SeaOrmClientsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_active(&self, id: i64) -> Result<Option<ClientProfile>> {
        let found = client_profiles::Entity::find_by_id(id)
            .filter(active())
            .one(&self.conn)
            .await
            .context("find_active failed")?;
        found.map(mapper::profile_from_row).transpose()
    }

    async fn find_active_by_user(&self, user_id: i64) -> Result<Option<ClientProfile>> {
        let found = client_profiles::Entity::find()
            .filter(client_profiles::Column::UserId.eq(user_id))
            .filter(active())
            .one(&self.conn)
            .await
            .context("find_active_by_user failed")?;
        found.map(mapper::profile_from_row).transpose()
    }

    async fn list_active(&self) -> Result<Vec<ClientProfile>> {
        let rows = client_profiles::Entity::find()
            .filter(active())
            .order_by_asc(client_profiles::Column::Id)
            .all(&self.conn)
            .await
            .context("list_active failed")?;
        rows.into_iter().map(mapper::profile_from_row).collect()
    }

    async fn document_taken(&self, document_id: &str, except: Option<i64>) -> Result<bool> {
        let mut query = client_profiles::Entity::find()
            .filter(client_profiles::Column::DocumentId.eq(document_id))
            .filter(active());
        if let Some(id) = except {
            query = query.filter(client_profiles::Column::Id.ne(id));
        }
        let count = query
            .count(&self.conn)
            .await
            .context("document_taken failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, user_id: i64, profile: NewProfile) -> Result<ClientProfile> {
        let am = client_profiles::ActiveModel {
            user_id: Set(user_id),
            document_id: Set(profile.document_id),
            emergency_phone: Set(profile.emergency_phone),
            document_verified: Set(false),
            status: Set(ProfileStatus::Activo.as_str().to_owned()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = am.insert(&self.conn).await.context("insert failed")?;
        mapper::profile_from_row(row)
    }

    async fn update(&self, id: i64, patch: ProfilePatch) -> Result<ClientProfile> {
        let mut am = client_profiles::ActiveModel {
            id: Set(id),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        if let Some(document_id) = patch.document_id {
            am.document_id = Set(document_id);
        }
        if let Some(phone) = patch.emergency_phone {
            am.emergency_phone = Set(phone);
        }
        let row = am.update(&self.conn).await.context("update failed")?;
        mapper::profile_from_row(row)
    }

    async fn soft_delete_by_user(&self, user_id: i64) -> Result<bool> {
        let found = client_profiles::Entity::find()
            .filter(client_profiles::Column::UserId.eq(user_id))
            .filter(active())
            .one(&self.conn)
            .await
            .context("soft_delete lookup failed")?;
        let Some(row) = found else {
            return Ok(false);
        };

        let am = client_profiles::ActiveModel {
            id: Set(row.id),
            status: Set(ProfileStatus::Eliminado.as_str().to_owned()),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        am.update(&self.conn).await.context("soft_delete failed")?;
        Ok(true)
    }

    async fn mark_verified(&self, id: i64) -> Result<()> {
        let am = client_profiles::ActiveModel {
            id: Set(id),
            document_verified: Set(true),
            verified_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        am.update(&self.conn).await.context("mark_verified failed")?;
        Ok(())
    }
}
