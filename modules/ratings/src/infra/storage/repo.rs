//! SeaORM-backed implementation of the rating persistence port.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::domain::model::{NewRating, Rating};
use crate::domain::repo::RatingsRepository;
use crate::infra::storage::entities::ratings;
use crate::infra::storage::mapper;

pub struct SeaOrmRatingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRatingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> RatingsRepository for SeaOrmRatingsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(
        &self,
        client_id: i64,
        caregiver_id: i64,
        rating: NewRating,
    ) -> Result<Rating> {
        let am = ratings::ActiveModel {
            booking_id: Set(rating.booking_id),
            client_id: Set(client_id),
            caregiver_id: Set(caregiver_id),
            score: Set(rating.score),
            comment: Set(rating.comment),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = am.insert(&self.conn).await.context("insert failed")?;
        Ok(mapper::rating_from_row(row))
    }

    async fn list_by_caregiver(&self, caregiver_id: i64) -> Result<Vec<Rating>> {
        let rows = ratings::Entity::find()
            .filter(ratings::Column::CaregiverId.eq(caregiver_id))
            .order_by_desc(ratings::Column::CreatedAt)
            .order_by_desc(ratings::Column::Id)
            .all(&self.conn)
            .await
            .context("list_by_caregiver failed")?;
        Ok(rows.into_iter().map(mapper::rating_from_row).collect())
    }

    async fn average_for_caregiver(&self, caregiver_id: i64) -> Result<Decimal> {
        let scores: Vec<i16> = ratings::Entity::find()
            .filter(ratings::Column::CaregiverId.eq(caregiver_id))
            .select_only()
            .column(ratings::Column::Score)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("average_for_caregiver failed")?;
        if scores.is_empty() {
            return Ok(Decimal::ZERO);
        }
        let sum: i64 = scores.iter().map(|s| i64::from(*s)).sum();
        Ok(Decimal::from(sum) / Decimal::from(scores.len() as i64))
    }
}
