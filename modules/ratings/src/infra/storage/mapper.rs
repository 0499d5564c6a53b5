use crate::domain::model::Rating;
use crate::infra::storage::entities::ratings;

pub fn rating_from_row(row: ratings::Model) -> Rating {
    Rating {
        id: row.id,
        booking_id: row.booking_id,
        client_id: row.client_id,
        caregiver_id: row.caregiver_id,
        score: row.score,
        comment: row.comment,
        created_at: row.created_at,
    }
}
