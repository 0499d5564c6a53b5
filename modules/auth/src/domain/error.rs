use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    /// Uniform failure for login: wrong email, wrong password, wrong tenant,
    /// and locked accounts are indistinguishable from the outside.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found: {id}")]
    UserNotFound { id: i64 },

    #[error("not authorized")]
    NotAuthorized,

    #[error("email '{email}' is already registered in this tenant")]
    EmailTaken { email: String },

    #[error("phone '{phone}' is already registered in this tenant")]
    PhoneTaken { phone: String },

    #[error("tenant '{tenant}' already has an admin")]
    AdminExists { tenant: String },

    #[error("cannot demote an admin account")]
    AdminDemotion,

    #[error("cannot delete your own account")]
    SelfDeletion,

    #[error("reset token is invalid or expired")]
    InvalidResetToken,

    #[error("validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("database error: {message}")]
    Database { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    pub fn user_not_found(id: i64) -> Self {
        Self::UserNotFound { id }
    }

    pub fn not_authorized() -> Self {
        Self::NotAuthorized
    }

    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::EmailTaken {
            email: email.into(),
        }
    }

    pub fn phone_taken(phone: impl Into<String>) -> Self {
        Self::PhoneTaken {
            phone: phone.into(),
        }
    }

    pub fn admin_exists(tenant: impl Into<String>) -> Self {
        Self::AdminExists {
            tenant: tenant.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
