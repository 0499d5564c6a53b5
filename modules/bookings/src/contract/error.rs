use thiserror::Error;

/// Errors safe to expose to other modules.
#[derive(Error, Debug, Clone)]
pub enum BookingsError {
    #[error("booking not found")]
    NotFound,

    #[error("{message}")]
    Conflict { message: String },

    #[error("internal error")]
    Internal,
}

impl From<crate::domain::error::DomainError> for BookingsError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match &e {
            BookingNotFound => Self::NotFound,
            InvalidTransition { .. }
            | AlreadyPaid
            | NotPayable { .. }
            | AlreadyRated
            | NotFinished { .. } => Self::Conflict {
                message: e.to_string(),
            },
            NotAuthorized | Validation { .. } | Database { .. } => Self::Internal,
        }
    }
}
