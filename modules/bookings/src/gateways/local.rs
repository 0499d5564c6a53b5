use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{client::BookingsApi, error::BookingsError, model::RatingView};
use crate::domain::service::Service;

/// In-process implementation of [`BookingsApi`] delegating to the domain
/// service. Installed when all modules run in one binary.
pub struct BookingsLocalClient {
    service: Arc<Service>,
}

impl BookingsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl BookingsApi for BookingsLocalClient {
    async fn rating_view(&self, booking_id: i64) -> Result<Option<RatingView>, BookingsError> {
        let found = self
            .service
            .find_booking(booking_id)
            .await
            .map_err(BookingsError::from)?;
        Ok(found.as_ref().map(RatingView::from))
    }

    async fn mark_rated(&self, booking_id: i64) -> Result<(), BookingsError> {
        self.service.mark_rated(booking_id).await.map_err(Into::into)
    }

    async fn mark_paid(&self, booking_id: i64, payment_method: &str) -> Result<(), BookingsError> {
        self.service
            .mark_paid(booking_id, payment_method)
            .await
            .map_err(Into::into)
    }
}
