use anyhow::Result;
use async_trait::async_trait;

use super::model::{Booking, BookingStatus, NewBooking};

/// Storage port for bookings. Implementations return raw storage errors;
/// the service translates them into domain terms.
#[async_trait]
pub trait BookingsRepository: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Booking>>;

    async fn insert(&self, client_id: i64, booking: NewBooking) -> Result<Booking>;

    /// Bookings requested by this user, newest first.
    async fn list_by_client(&self, client_id: i64) -> Result<Vec<Booking>>;

    /// Bookings assigned to this caregiver profile, newest first.
    async fn list_by_caregiver(&self, caregiver_id: i64) -> Result<Vec<Booking>>;

    async fn set_status(&self, id: i64, status: BookingStatus) -> Result<Booking>;

    async fn set_paid(&self, id: i64, payment_method: &str) -> Result<Booking>;

    async fn set_rated(&self, id: i64) -> Result<Booking>;
}
