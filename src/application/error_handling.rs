// src/application/error_handling.rs
//
// Error Handling for Commands
//
// ARCHITECTURE:
// - Maps internal errors → user-facing responses
// - Provides consistent error format for the command line
// - Never exposes internal implementation details
// - Logs errors for debugging

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Resource not found (404)
    NotFound,

    /// Invalid input/validation error (400)
    Validation,

    /// Domain invariant violation (422)
    DomainError,

    /// Database/persistence error (500)
    Database,

    /// Local storage is full; shown as a warning, nothing was written
    StorageQuota,

    /// Remote backend unreachable or timed out (503)
    RemoteUnavailable,

    /// Remote backend refused the request (502)
    ExternalService,

    /// Remote backend is not configured
    RemoteNotConfigured,

    /// Wrong or missing access PIN (403)
    AccessDenied,

    /// File system error (500)
    FileSystem,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorType {
    /// Errors the user can act on without reading logs
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ErrorType::StorageQuota | ErrorType::RemoteUnavailable | ErrorType::NotFound
        )
    }
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::NotFound => Self::new(ErrorType::NotFound, "Entry not found", None),

            AppError::Domain(domain_error) => Self::new(
                ErrorType::DomainError,
                "Entry validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::QuotaExceeded(details) => {
                log::warn!("Local storage quota exceeded: {}", details);
                Self::new(
                    ErrorType::StorageQuota,
                    "Local storage is full; the change was not saved",
                    Some(details),
                )
            }

            AppError::RemoteUnavailable(details) => {
                log::error!("Remote backend unavailable: {}", details);
                Self::new(
                    ErrorType::RemoteUnavailable,
                    "Cloud storage is unreachable",
                    Some(details),
                )
            }

            AppError::RemoteRejected { status, message } => {
                log::error!("Remote backend rejected request ({}): {}", status, message);
                Self::new(
                    ErrorType::ExternalService,
                    format!("Cloud storage rejected the request ({})", status),
                    Some(message),
                )
            }

            AppError::RemoteNotConfigured => Self::new(
                ErrorType::RemoteNotConfigured,
                "Cloud storage is not configured",
                Some("Set SUPABASE_URL and SUPABASE_ANON_KEY".to_string()),
            ),

            AppError::AccessDenied(reason) => {
                Self::new(ErrorType::AccessDenied, "Access denied", Some(reason))
            }

            AppError::InvalidImport(reason) => Self::new(
                ErrorType::Validation,
                "Invalid import file",
                Some(reason),
            ),

            AppError::Database(db_error) => {
                log::error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Serialization(serde_error) => {
                log::error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::FileSystem,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    /// Create validation error
    pub fn validation(message: String) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    /// Create not found error
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from_app_error(error)
    }
}

/// Result type returned by every command
pub type CommandResult<T> = Result<T, ErrorResponse>;

/// Helper trait for converting service results
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> CommandResult<T>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> CommandResult<T> {
        self.map_err(ErrorResponse::from_app_error)
    }
}
