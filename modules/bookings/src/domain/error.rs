use thiserror::Error;

use super::model::BookingStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("no booking matches the request")]
    BookingNotFound,

    #[error("the caller is not a participant of this booking")]
    NotAuthorized,

    #[error("cannot move a booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("the booking is already paid")]
    AlreadyPaid,

    #[error("a booking in status {status} cannot be paid")]
    NotPayable { status: BookingStatus },

    #[error("the booking is already rated")]
    AlreadyRated,

    #[error("a booking in status {status} cannot be rated")]
    NotFinished { status: BookingStatus },

    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
