use apikit::problem::{from_parts, ProblemResponse};
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Map a domain error to an RFC 9457 problem response.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Gateway { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "PAYMENTS_GATEWAY",
            "Payment gateway error",
            message.clone(),
            instance,
        ),
        DomainError::CardNotFound => from_parts(
            StatusCode::NOT_FOUND,
            "PAYMENTS_CARD_NOT_FOUND",
            "Card not found",
            "No card of yours matches the request",
            instance,
        ),
        DomainError::BookingNotFound => from_parts(
            StatusCode::NOT_FOUND,
            "PAYMENTS_BOOKING_NOT_FOUND",
            "Booking not found",
            "The booking tied to this order does not exist",
            instance,
        ),
        DomainError::BookingConflict { message } => from_parts(
            StatusCode::CONFLICT,
            "PAYMENTS_BOOKING_CONFLICT",
            "Booking not payable",
            message.clone(),
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "PAYMENTS_VALIDATION",
            "Validation error",
            format!("{e}"),
            instance,
        ),
        DomainError::Crypto { .. } | DomainError::Database { .. } => {
            tracing::error!(error = ?e, "payments operation failed");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PAYMENTS_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
