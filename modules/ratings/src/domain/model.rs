use chrono::{DateTime, Utc};

/// One score for one finished booking. `client_id` and `caregiver_id`
/// are copied from the booking at write time, never from the request.
#[derive(Debug, Clone)]
pub struct Rating {
    pub id: i64,
    pub booking_id: i64,
    pub client_id: i64,
    pub caregiver_id: i64,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creation payload; the participants come from the booking.
#[derive(Debug, Clone)]
pub struct NewRating {
    pub booking_id: i64,
    pub score: i16,
    pub comment: Option<String>,
}
