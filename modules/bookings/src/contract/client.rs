use async_trait::async_trait;

use crate::contract::error::BookingsError;
use crate::contract::model::RatingView;

/// What other modules may ask of the bookings module. Ratings validates
/// a booking before scoring it and flips the rated flag; payments flips
/// the paid flag once a capture succeeds.
#[async_trait]
pub trait BookingsApi: Send + Sync {
    /// The rating-relevant slice of a booking, if it exists.
    async fn rating_view(&self, booking_id: i64) -> Result<Option<RatingView>, BookingsError>;

    /// Flip the one-way rated flag of a finished booking.
    async fn mark_rated(&self, booking_id: i64) -> Result<(), BookingsError>;

    /// Flip the one-way paid flag and record how it was paid.
    async fn mark_paid(&self, booking_id: i64, payment_method: &str) -> Result<(), BookingsError>;
}
