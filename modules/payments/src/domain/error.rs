use thiserror::Error;

/// Domain errors for payment operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// The gateway refused the call; its answer is surfaced to the
    /// caller so the browser SDK can show what went wrong.
    #[error("payment gateway error: {message}")]
    Gateway { message: String },

    /// Missing and foreign cards answer identically.
    #[error("no card of yours matches the request")]
    CardNotFound,

    #[error("booking not found")]
    BookingNotFound,

    /// The booking refused the paid flag, e.g. it was already paid.
    #[error("{message}")]
    BookingConflict { message: String },

    #[error("validation error: {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("crypto error: {message}")]
    Crypto { message: String },

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

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
