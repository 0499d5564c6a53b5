use apikit::problem::{from_parts, ProblemResponse};
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Map a domain error to an RFC 9457 problem response.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "AUTH_INVALID_CREDENTIALS",
            "Invalid credentials",
            "Email or password is incorrect",
            instance,
        ),
        DomainError::UserNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "AUTH_USER_NOT_FOUND",
            "User not found",
            format!("User with id {id} was not found"),
            instance,
        ),
        DomainError::NotAuthorized => from_parts(
            StatusCode::FORBIDDEN,
            "AUTH_FORBIDDEN",
            "Not authorized",
            "The caller is not allowed to perform this operation",
            instance,
        ),
        DomainError::EmailTaken { email } => from_parts(
            StatusCode::CONFLICT,
            "AUTH_EMAIL_CONFLICT",
            "Email already registered",
            format!("Email '{email}' is already registered in this tenant"),
            instance,
        ),
        DomainError::PhoneTaken { phone } => from_parts(
            StatusCode::CONFLICT,
            "AUTH_PHONE_CONFLICT",
            "Phone already registered",
            format!("Phone '{phone}' is already registered in this tenant"),
            instance,
        ),
        DomainError::AdminExists { tenant } => from_parts(
            StatusCode::CONFLICT,
            "AUTH_ADMIN_EXISTS",
            "Admin already exists",
            format!(
                "Tenant '{tenant}' already has an admin; use the authenticated endpoint"
            ),
            instance,
        ),
        DomainError::AdminDemotion => from_parts(
            StatusCode::CONFLICT,
            "AUTH_ADMIN_DEMOTION",
            "Cannot demote admin",
            "Admin accounts cannot be demoted",
            instance,
        ),
        DomainError::SelfDeletion => from_parts(
            StatusCode::CONFLICT,
            "AUTH_SELF_DELETION",
            "Cannot delete own account",
            "Admins cannot delete their own account",
            instance,
        ),
        DomainError::InvalidResetToken => from_parts(
            StatusCode::BAD_REQUEST,
            "AUTH_INVALID_RESET_TOKEN",
            "Invalid reset token",
            "The reset token is invalid, expired, or already used",
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "AUTH_VALIDATION",
            "Validation error",
            format!("{e}"),
            instance,
        ),
        DomainError::Database { .. } | DomainError::Internal { .. } => {
            tracing::error!(error = ?e, "auth operation failed");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
