use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Duplicate submission: {0}")]
    DuplicateSubmission(String),

    #[error("Invalid input for `{field}`: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an `InvalidInput` error naming the offending field
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Field name carried by `InvalidInput`, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::InvalidInput { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}

/// Find the domain error inside an `anyhow` chain
pub fn domain_error(err: &anyhow::Error) -> Option<&Error> {
    err.downcast_ref::<Error>()
}
