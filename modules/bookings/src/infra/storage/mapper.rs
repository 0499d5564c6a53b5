use anyhow::{anyhow, Result};

use crate::domain::model::Booking;
use crate::infra::storage::entities::bookings;

pub fn booking_from_row(row: bookings::Model) -> Result<Booking> {
    let status = row
        .status
        .parse()
        .map_err(|_| anyhow!("booking {} has unknown status '{}'", row.id, row.status))?;
    Ok(Booking {
        id: row.id,
        client_id: row.client_id,
        caregiver_id: row.caregiver_id,
        start_at: row.start_at,
        end_at: row.end_at,
        service_type: row.service_type,
        notes: row.notes,
        status,
        is_paid: row.is_paid,
        is_rated: row.is_rated,
        payment_method: row.payment_method,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::BookingStatus;
    use chrono::{Duration, Utc};

    fn row(status: &str) -> bookings::Model {
        let start = Utc::now() + Duration::days(1);
        bookings::Model {
            id: 1,
            client_id: 7,
            caregiver_id: 3,
            start_at: start,
            end_at: start + Duration::hours(4),
            service_type: "Paseo".to_owned(),
            notes: None,
            status: status.to_owned(),
            is_paid: false,
            is_rated: false,
            payment_method: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn maps_known_status() {
        let booking = booking_from_row(row("EnProgreso")).unwrap();
        assert_eq!(booking.status, BookingStatus::EnProgreso);
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(booking_from_row(row("Pausada")).is_err());
    }
}
