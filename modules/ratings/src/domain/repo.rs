use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use super::model::{NewRating, Rating};

/// Storage port for ratings. Implementations return raw storage errors;
/// the service translates them.
#[async_trait]
pub trait RatingsRepository: Send + Sync {
    async fn insert(
        &self,
        client_id: i64,
        caregiver_id: i64,
        rating: NewRating,
    ) -> Result<Rating>;

    /// Ratings received by this caregiver profile, newest first.
    async fn list_by_caregiver(&self, caregiver_id: i64) -> Result<Vec<Rating>>;

    /// Mean score for this caregiver profile; zero when unrated.
    async fn average_for_caregiver(&self, caregiver_id: i64) -> Result<Decimal>;
}
