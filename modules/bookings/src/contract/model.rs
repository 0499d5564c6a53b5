use crate::domain::model::{Booking, BookingStatus};

/// The slice of a booking the ratings module needs: who took part and
/// whether the work is finished and still unrated.
#[derive(Debug, Clone, Copy)]
pub struct RatingView {
    pub id: i64,
    pub client_id: i64,
    pub caregiver_id: i64,
    pub finished: bool,
    pub rated: bool,
}

impl From<&Booking> for RatingView {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id,
            client_id: b.client_id,
            caregiver_id: b.caregiver_id,
            finished: b.status == BookingStatus::Finalizada,
            rated: b.is_rated,
        }
    }
}
