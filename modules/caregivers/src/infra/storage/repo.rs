//! SeaORM-backed implementation of the profile persistence port.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::model::{CaregiverProfile, NewProfile, ProfilePatch, ProfileStatus};
use crate::domain::repo::CaregiversRepository;
use crate::infra::storage::entities::caregiver_profiles;
use crate::infra::storage::mapper;

pub struct SeaOrmCaregiversRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmCaregiversRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn active() -> sea_orm::sea_query::SimpleExpr {
    caregiver_profiles::Column::Status.eq(ProfileStatus::Activo.as_str())
}

#[async_trait]
impl<C> CaregiversRepository for SeaOrmCaregiversRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_active(&self, id: i64) -> Result<Option<CaregiverProfile>> {
        let found = caregiver_profiles::Entity::find_by_id(id)
            .filter(active())
            .one(&self.conn)
            .await
            .context("find_active failed")?;
        found.map(mapper::profile_from_row).transpose()
    }

    async fn find_active_by_user(&self, user_id: i64) -> Result<Option<CaregiverProfile>> {
        let found = caregiver_profiles::Entity::find()
            .filter(caregiver_profiles::Column::UserId.eq(user_id))
            .filter(active())
            .one(&self.conn)
            .await
            .context("find_active_by_user failed")?;
        found.map(mapper::profile_from_row).transpose()
    }

    async fn list_active(&self) -> Result<Vec<CaregiverProfile>> {
        let rows = caregiver_profiles::Entity::find()
            .filter(active())
            .order_by_asc(caregiver_profiles::Column::Id)
            .all(&self.conn)
            .await
            .context("list_active failed")?;
        rows.into_iter().map(mapper::profile_from_row).collect()
    }

    async fn document_taken(&self, document_id: &str, except: Option<i64>) -> Result<bool> {
        let mut query = caregiver_profiles::Entity::find()
            .filter(caregiver_profiles::Column::DocumentId.eq(document_id))
            .filter(active());
        if let Some(id) = except {
            query = query.filter(caregiver_profiles::Column::Id.ne(id));
        }
        let count = query
            .count(&self.conn)
            .await
            .context("document_taken failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, user_id: i64, profile: NewProfile) -> Result<CaregiverProfile> {
        let am = caregiver_profiles::ActiveModel {
            user_id: Set(user_id),
            document_id: Set(profile.document_id),
            emergency_phone: Set(profile.emergency_phone),
            bio: Set(profile.bio),
            experience: Set(profile.experience),
            service_hours: Set(profile.service_hours),
            hourly_rate: Set(profile.hourly_rate),
            avg_rating: Set(Decimal::ZERO),
            document_verified: Set(false),
            status: Set(ProfileStatus::Activo.as_str().to_owned()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = am.insert(&self.conn).await.context("insert failed")?;
        mapper::profile_from_row(row)
    }

    async fn update(&self, id: i64, patch: ProfilePatch) -> Result<CaregiverProfile> {
        let mut am = caregiver_profiles::ActiveModel {
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
        if let Some(bio) = patch.bio {
            am.bio = Set(bio);
        }
        if let Some(experience) = patch.experience {
            am.experience = Set(experience);
        }
        if let Some(service_hours) = patch.service_hours {
            am.service_hours = Set(service_hours);
        }
        if let Some(rate) = patch.hourly_rate {
            am.hourly_rate = Set(rate);
        }
        let row = am.update(&self.conn).await.context("update failed")?;
        mapper::profile_from_row(row)
    }

    async fn soft_delete_by_user(&self, user_id: i64) -> Result<bool> {
        let found = caregiver_profiles::Entity::find()
            .filter(caregiver_profiles::Column::UserId.eq(user_id))
            .filter(active())
            .one(&self.conn)
            .await
            .context("soft_delete lookup failed")?;
        let Some(row) = found else {
            return Ok(false);
        };

        let am = caregiver_profiles::ActiveModel {
            id: Set(row.id),
            status: Set(ProfileStatus::Eliminado.as_str().to_owned()),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        am.update(&self.conn).await.context("soft_delete failed")?;
        Ok(true)
    }

    async fn mark_verified(&self, id: i64) -> Result<()> {
        let am = caregiver_profiles::ActiveModel {
            id: Set(id),
            document_verified: Set(true),
            verified_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        am.update(&self.conn).await.context("mark_verified failed")?;
        Ok(())
    }

    async fn set_avg_rating(&self, id: i64, avg: Decimal) -> Result<bool> {
        let found = caregiver_profiles::Entity::find_by_id(id)
            .filter(active())
            .one(&self.conn)
            .await
            .context("set_avg_rating lookup failed")?;
        if found.is_none() {
            return Ok(false);
        }

        let am = caregiver_profiles::ActiveModel {
            id: Set(id),
            avg_rating: Set(avg),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        am.update(&self.conn).await.context("set_avg_rating failed")?;
        Ok(true)
    }
}
