use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type ClinicResult<T> = Result<T, ClinicError>;

/// Broad class of a failed remote call, as seen by a client of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    Validation,
    NotFound,
    Conflict,
    Server,
    /// The request never produced a response.
    Transport,
    /// A response arrived but its body could not be read.
    Decode,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => FailureKind::Validation,
            404 => FailureKind::NotFound,
            409 => FailureKind::Conflict,
            _ => FailureKind::Server,
        }
    }
}

/// A remote call that did not succeed. Returned, never raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Server, message)
    }
}
