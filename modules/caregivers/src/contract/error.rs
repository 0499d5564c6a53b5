use thiserror::Error;

/// Errors safe to expose to other modules.
#[derive(Error, Debug, Clone)]
pub enum CaregiversError {
    #[error("caregiver profile not found")]
    NotFound,

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("internal error")]
    Internal,
}

impl From<crate::domain::error::DomainError> for CaregiversError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match e {
            ProfileNotFound => Self::NotFound,
            Validation { field, message } => Self::Validation {
                message: format!("{field}: {message}"),
            },
            ProfileExists { .. } | DocumentTaken { .. } | Database { .. } => Self::Internal,
        }
    }
}
