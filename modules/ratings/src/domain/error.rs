use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Covers both an unknown booking id and someone else's booking, so
    /// ids cannot be probed through the rating surface.
    #[error("the caller may not rate this booking")]
    NotYourBooking,

    #[error("only a finished booking can be rated")]
    NotFinished,

    #[error("the booking is already rated")]
    AlreadyRated,

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
