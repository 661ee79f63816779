//! Error types for the genealogy engine
//!
//! One enum covers every failure an operation can surface to its caller.

use hyper::StatusCode;

/// Main error type for genealogy operations
#[derive(Debug, thiserror::Error)]
pub enum GenealogyError {
    /// Identity token is not a well-formed store key
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Required field missing or payload malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// A relationship endpoint does not resolve to a person
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Underlying store unreachable, timed out, or the operation errored
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GenealogyError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidIdentity(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable kind, used as the `code` field of error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentity(_) => "invalid_identity",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::InvalidReference(_) => "invalid_reference",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the caller (not the server) is at fault
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<mongodb::error::Error> for GenealogyError {
    fn from(err: mongodb::error::Error) -> Self {
        match *err.kind {
            // A stored document that no longer fits its schema is a data
            // problem, not an outage
            mongodb::error::ErrorKind::BsonDeserialization(ref e) => {
                Self::Internal(format!("Stored document does not decode: {}", e))
            }
            _ => Self::StorageUnavailable(err.to_string()),
        }
    }
}

impl From<bson::ser::Error> for GenealogyError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Internal(format!("BSON encode failed: {}", err))
    }
}

impl From<bson::de::Error> for GenealogyError {
    fn from(err: bson::de::Error) -> Self {
        Self::Internal(format!("BSON decode failed: {}", err))
    }
}

impl From<serde_json::Error> for GenealogyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("Malformed payload: {}", err))
    }
}

/// Result type alias for genealogy operations
pub type Result<T> = std::result::Result<T, GenealogyError>;
