use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::contract::error::CaregiversError;

/// What other modules may ask of the caregivers module. Bookings checks
/// profiles and maps user ids; ratings pushes average refreshes.
#[async_trait]
pub trait CaregiversApi: Send + Sync {
    /// Does an active caregiver profile with this id exist?
    async fn exists_active(&self, profile_id: i64) -> Result<bool, CaregiversError>;

    /// The active profile id owned by this user, if any.
    async fn profile_id_for_user(&self, user_id: i64) -> Result<Option<i64>, CaregiversError>;

    /// Overwrite the cached rating average (rounded to two decimals).
    async fn set_avg_rating(&self, profile_id: i64, avg: Decimal) -> Result<(), CaregiversError>;
}
