use apikit::problem::{from_parts, ProblemResponse};
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Map a domain error to an RFC 9457 problem response.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::ProfileExists { user_id } => from_parts(
            StatusCode::CONFLICT,
            "CAREGIVERS_PROFILE_EXISTS",
            "Profile already exists",
            format!("User {user_id} already has an active caregiver profile"),
            instance,
        ),
        DomainError::DocumentTaken { document } => from_parts(
            StatusCode::CONFLICT,
            "CAREGIVERS_DOCUMENT_CONFLICT",
            "Document already registered",
            format!("Document '{document}' belongs to another active profile"),
            instance,
        ),
        DomainError::ProfileNotFound => from_parts(
            StatusCode::NOT_FOUND,
            "CAREGIVERS_PROFILE_NOT_FOUND",
            "Profile not found",
            "No active caregiver profile matches the request",
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "CAREGIVERS_VALIDATION",
            "Validation error",
            format!("{e}"),
            instance,
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "caregivers operation failed");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CAREGIVERS_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_details_stay_private() {
        let e = DomainError::database("UNIQUE constraint failed: caregiver_profiles.document_id");
        let p = map_domain_error(&e, "/api/cuidadores");
        assert_eq!(p.0.status, 500);
        assert!(!p.0.detail.contains("UNIQUE"));
    }
}
