//! SeaORM-backed implementation of the booking persistence port.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::model::{Booking, BookingStatus, NewBooking};
use crate::domain::repo::BookingsRepository;
use crate::infra::storage::entities::bookings;
use crate::infra::storage::mapper;

pub struct SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> BookingsRepository for SeaOrmBookingsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find(&self, id: i64) -> Result<Option<Booking>> {
        let found = bookings::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find failed")?;
        found.map(mapper::booking_from_row).transpose()
    }

    async fn insert(&self, client_id: i64, booking: NewBooking) -> Result<Booking> {
        let am = bookings::ActiveModel {
            client_id: Set(client_id),
            caregiver_id: Set(booking.caregiver_id),
            start_at: Set(booking.start_at),
            end_at: Set(booking.end_at),
            service_type: Set(booking.service_type),
            notes: Set(booking.notes),
            status: Set(BookingStatus::Pendiente.as_str().to_owned()),
            is_paid: Set(false),
            is_rated: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let row = am.insert(&self.conn).await.context("insert failed")?;
        mapper::booking_from_row(row)
    }

    async fn list_by_client(&self, client_id: i64) -> Result<Vec<Booking>> {
        let rows = bookings::Entity::find()
            .filter(bookings::Column::ClientId.eq(client_id))
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .all(&self.conn)
            .await
            .context("list_by_client failed")?;
        rows.into_iter().map(mapper::booking_from_row).collect()
    }

    async fn list_by_caregiver(&self, caregiver_id: i64) -> Result<Vec<Booking>> {
        let rows = bookings::Entity::find()
            .filter(bookings::Column::CaregiverId.eq(caregiver_id))
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .all(&self.conn)
            .await
            .context("list_by_caregiver failed")?;
        rows.into_iter().map(mapper::booking_from_row).collect()
    }

    async fn set_status(&self, id: i64, status: BookingStatus) -> Result<Booking> {
        let am = bookings::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_owned()),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        let row = am.update(&self.conn).await.context("set_status failed")?;
        mapper::booking_from_row(row)
    }

    async fn set_paid(&self, id: i64, payment_method: &str) -> Result<Booking> {
        let am = bookings::ActiveModel {
            id: Set(id),
            is_paid: Set(true),
            payment_method: Set(Some(payment_method.to_owned())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        let row = am.update(&self.conn).await.context("set_paid failed")?;
        mapper::booking_from_row(row)
    }

    async fn set_rated(&self, id: i64) -> Result<Booking> {
        let am = bookings::ActiveModel {
            id: Set(id),
            is_rated: Set(true),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        let row = am.update(&self.conn).await.context("set_rated failed")?;
        mapper::booking_from_row(row)
    }
}
