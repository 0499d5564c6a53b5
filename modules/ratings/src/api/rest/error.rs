use apikit::problem::{from_parts, ProblemResponse};
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Map a domain error to an RFC 9457 problem response.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotYourBooking => from_parts(
            StatusCode::FORBIDDEN,
            "RATINGS_FORBIDDEN",
            "Not allowed",
            "The caller may not rate this booking",
            instance,
        ),
        DomainError::NotFinished => from_parts(
            StatusCode::CONFLICT,
            "RATINGS_BOOKING_NOT_FINISHED",
            "Booking not finished",
            "Only a finished booking can be rated",
            instance,
        ),
        DomainError::AlreadyRated => from_parts(
            StatusCode::CONFLICT,
            "RATINGS_ALREADY_RATED",
            "Already rated",
            "The booking is already rated",
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "RATINGS_VALIDATION",
            "Validation error",
            format!("{e}"),
            instance,
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "ratings operation failed");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "RATINGS_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
