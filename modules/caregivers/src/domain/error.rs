use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("user {user_id} already has an active profile")]
    ProfileExists { user_id: i64 },

    #[error("document '{document}' is already registered to an active profile")]
    DocumentTaken { document: String },

    #[error("profile not found")]
    ProfileNotFound,

    #[error("validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn profile_exists(user_id: i64) -> Self {
        Self::ProfileExists { user_id }
    }

    pub fn document_taken(document: impl Into<String>) -> Self {
        Self::DocumentTaken {
            document: document.into(),
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
}
