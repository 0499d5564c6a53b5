use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::contract::{client::CaregiversApi, error::CaregiversError};
use crate::domain::service::Service;

/// In-process implementation of [`CaregiversApi`] delegating to the
/// domain service. Installed when all modules run in one binary.
pub struct CaregiversLocalClient {
    service: Arc<Service>,
}

impl CaregiversLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CaregiversApi for CaregiversLocalClient {
    async fn exists_active(&self, profile_id: i64) -> Result<bool, CaregiversError> {
        self.service
            .exists_active(profile_id)
            .await
            .map_err(Into::into)
    }

    async fn profile_id_for_user(&self, user_id: i64) -> Result<Option<i64>, CaregiversError> {
        self.service
            .profile_id_for_user(user_id)
            .await
            .map_err(Into::into)
    }

    async fn set_avg_rating(&self, profile_id: i64, avg: Decimal) -> Result<(), CaregiversError> {
        self.service
            .set_avg_rating(profile_id, avg)
            .await
            .map_err(Into::into)
    }
}
