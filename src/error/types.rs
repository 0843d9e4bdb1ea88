// src/error/types.rs
use crate::domain::DomainError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Remote backend is not configured")]
    RemoteNotConfigured,

    /// Network failure, timeout or a response that could not be understood
    #[error("Remote backend unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Remote backend rejected the request ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    #[error("Local storage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid import file: {0}")]
    InvalidImport(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    /// True for failures of the remote transport rather than of the request itself.
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(self, AppError::RemoteUnavailable(_))
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, AppError::QuotaExceeded(_))
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failures only; HTTP status handling happens in the client
        if err.is_timeout() {
            AppError::RemoteUnavailable(format!("request timed out: {}", err))
        } else {
            AppError::RemoteUnavailable(err.to_string())
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
