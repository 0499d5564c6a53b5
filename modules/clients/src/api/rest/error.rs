use apikit::problem::{from_parts, ProblemResponse};
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Map a domain error to an RFC 9457 problem response.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::ProfileExists { user_id } => from_parts(
            StatusCode::CONFLICT,
            "CLIENTS_PROFILE_EXISTS",
            "Profile already exists",
            format!("User {user_id} already has an active client profile"),
            instance,
        ),
        DomainError::DocumentTaken { document } => from_parts(
            StatusCode::CONFLICT,
            "CLIENTS_DOCUMENT_CONFLICT",
            "Document already registered",
            format!("Document '{document}' belongs to another active profile"),
            instance,
        ),
        DomainError::ProfileNotFound => from_parts(
            StatusCode::NOT_FOUND,
            "CLIENTS_PROFILE_NOT_FOUND",
            "Profile not found",
            "No active client profile matches the request",
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "CLIENTS_VALIDATION",
            "Validation error",
            format!("{e}"),
            instance,
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "clients operation failed");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CLIENTS_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
