//! Error types and handling for the delivery fee service

use thiserror::Error;

use crate::fee::FeeError;

/// Main error type for the delivery fee service
#[derive(Error, Debug)]
pub enum DeliveryFeeError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather observation import errors
    #[error("Import error: {message}")]
    Import { message: String },

    /// HTTP request validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Fee calculation refused the request
    #[error(transparent)]
    Fee(#[from] FeeError),
}

impl DeliveryFeeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new import error
    pub fn import<S: Into<String>>(message: S) -> Self {
        Self::Import {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DeliveryFeeError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            DeliveryFeeError::Import { .. } => {
                "Unable to import weather observations. Fees use the last stored observation."
                    .to_string()
            }
            DeliveryFeeError::Validation { message } => format!("Invalid input: {message}"),
            DeliveryFeeError::Fee(err) => err.to_string(),
        }
    }
}
