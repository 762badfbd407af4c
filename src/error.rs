use std::result;

use crate::auth::AuthErrorCode;
use thiserror::Error;

/// Error types for bookshelf client operations
#[derive(Error, Debug)]
pub enum BookshelfError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Volume not found in the catalog
    #[error("Volume not found: {id}")]
    VolumeNotFound { id: String },

    /// Volume id was empty
    #[error("Invalid volume id: {id:?}")]
    InvalidVolumeId { id: String },

    /// An owner-scoped operation was attempted without a session
    #[error("No authenticated session")]
    NotAuthenticated,

    /// A reference operation was attempted without a resolved document id
    #[error("Reference has no id")]
    MissingReferenceId,

    /// Authentication provider rejected the operation
    #[error("Authentication failed ({code}): {}", .code.message())]
    Auth { code: AuthErrorCode },

    /// A form field failed validation
    #[error("Invalid {field}: {reason}")]
    InvalidForm {
        field: &'static str,
        reason: &'static str,
    },

    /// Document or blob store operation failed
    #[error("Store error: {message}")]
    Store { message: String },

    /// Configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = result::Result<T, BookshelfError>;

impl BookshelfError {
    /// Localized text suitable for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            BookshelfError::RequestError(_)
            | BookshelfError::JsonError(_)
            | BookshelfError::ApiError { .. } => {
                "Algo salió mal; inténtalo de nuevo más tarde.".to_string()
            }
            BookshelfError::VolumeNotFound { .. } | BookshelfError::InvalidVolumeId { .. } => {
                "No se encontró el libro".to_string()
            }
            BookshelfError::NotAuthenticated => {
                "Debes iniciar sesión para guardar referencias".to_string()
            }
            BookshelfError::MissingReferenceId => {
                "No se puede eliminar la referencia: ID inválido".to_string()
            }
            BookshelfError::Auth { code } => code.message().to_string(),
            BookshelfError::InvalidForm { reason, .. } => reason.to_string(),
            BookshelfError::Store { .. } => "Error al acceder a los datos".to_string(),
            BookshelfError::InvalidConfig(msg) => msg.clone(),
        }
    }

    pub(crate) fn store<E: std::fmt::Display>(err: E) -> Self {
        BookshelfError::Store {
            message: err.to_string(),
        }
    }
}
