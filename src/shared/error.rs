use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to load: {0}")]
    LoadFailed(String),

    #[error("Failed to save changes: {0}")]
    SaveFailed(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AppError {
    /// Message suitable for the `error` field a UI renders.
    pub fn user_message(&self) -> String {
        match self {
            AppError::LoadFailed(msg)
            | AppError::SaveFailed(msg)
            | AppError::InvalidOperation(msg)
            | AppError::Network(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidInput(msg)
            | AppError::Storage(msg)
            | AppError::SerializationError(msg)
            | AppError::DeserializationError(msg)
            | AppError::ConfigurationError(msg) => msg.clone(),
            AppError::Api { message, .. } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::DeserializationError(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_strips_variant_prefix() {
        let err = AppError::Api {
            status: 422,
            message: "quantity: must be positive".to_string(),
        };
        assert_eq!(err.user_message(), "quantity: must be positive");
        assert_eq!(
            err.to_string(),
            "API error (422): quantity: must be positive"
        );
    }
}
