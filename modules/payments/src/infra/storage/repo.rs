//! SeaORM-backed implementation of the card vault persistence port.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::model::{EncryptedCard, StoredCard};
use crate::domain::repo::CardsRepository;
use crate::infra::storage::entities::cards;
use crate::infra::storage::mapper;

pub struct SeaOrmCardsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmCardsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> CardsRepository for SeaOrmCardsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, user_id: i64, card: EncryptedCard) -> Result<StoredCard> {
        let am = cards::ActiveModel {
            user_id: Set(user_id),
            card_holder: Set(card.card_holder),
            encrypted_number: Set(card.encrypted_number),
            masked_number: Set(card.masked_number),
            expires: Set(card.expires),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = am.insert(&self.conn).await.context("insert failed")?;
        Ok(mapper::card_from_row(row))
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<StoredCard>> {
        let rows = cards::Entity::find()
            .filter(cards::Column::UserId.eq(user_id))
            .order_by_desc(cards::Column::CreatedAt)
            .order_by_desc(cards::Column::Id)
            .all(&self.conn)
            .await
            .context("list_by_user failed")?;
        Ok(rows.into_iter().map(mapper::card_from_row).collect())
    }

    async fn find(&self, id: i64) -> Result<Option<StoredCard>> {
        let row = cards::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find failed")?;
        Ok(row.map(mapper::card_from_row))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        cards::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(())
    }
}
