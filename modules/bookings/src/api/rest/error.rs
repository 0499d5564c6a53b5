use apikit::problem::{from_parts, ProblemResponse};
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Map a domain error to an RFC 9457 problem response.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::BookingNotFound => from_parts(
            StatusCode::NOT_FOUND,
            "BOOKINGS_NOT_FOUND",
            "Booking not found",
            "No booking matches the request",
            instance,
        ),
        DomainError::NotAuthorized => from_parts(
            StatusCode::FORBIDDEN,
            "BOOKINGS_FORBIDDEN",
            "Not allowed",
            "The caller may not act on this booking",
            instance,
        ),
        DomainError::InvalidTransition { from, to } => from_parts(
            StatusCode::CONFLICT,
            "BOOKINGS_INVALID_TRANSITION",
            "Invalid status change",
            format!("Cannot move a booking from {from} to {to}"),
            instance,
        ),
        DomainError::AlreadyPaid => from_parts(
            StatusCode::CONFLICT,
            "BOOKINGS_ALREADY_PAID",
            "Already paid",
            "The booking is already paid",
            instance,
        ),
        DomainError::NotPayable { status } => from_parts(
            StatusCode::CONFLICT,
            "BOOKINGS_NOT_PAYABLE",
            "Not payable",
            format!("A booking in status {status} cannot be paid"),
            instance,
        ),
        DomainError::AlreadyRated => from_parts(
            StatusCode::CONFLICT,
            "BOOKINGS_ALREADY_RATED",
            "Already rated",
            "The booking is already rated",
            instance,
        ),
        DomainError::NotFinished { status } => from_parts(
            StatusCode::CONFLICT,
            "BOOKINGS_NOT_FINISHED",
            "Not finished",
            format!("A booking in status {status} cannot be rated"),
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "BOOKINGS_VALIDATION",
            "Validation error",
            format!("{e}"),
            instance,
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "bookings operation failed");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "BOOKINGS_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
