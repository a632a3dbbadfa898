use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::errors::{CatalogError, LibraryError, StoreError};

/// Envelope returned across the FFI boundary, serialized as JSON.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    CorruptData(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::CorruptData(msg) => write!(f, "Corrupt data: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<StoreError> for AppResponse {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Lmdb(lmdb::Error::Corrupted) => {
                AppResponse::CorruptData("Database is corrupted".to_string())
            }
            StoreError::Serialization(e) => AppResponse::from(e),
            StoreError::InvalidUtf8 => {
                AppResponse::CorruptData("Stored value is not valid UTF-8".to_string())
            }
            other => AppResponse::DatabaseError(other.to_string()),
        }
    }
}

impl From<CatalogError> for AppResponse {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Store(e) => AppResponse::from(e),
            CatalogError::CorruptStore(msg) => AppResponse::CorruptData(msg),
            CatalogError::Serialization(e) => AppResponse::from(e),
            e @ (CatalogError::Validation(_) | CatalogError::DuplicateSlug { .. }) => {
                AppResponse::ValidationError(e.to_string())
            }
        }
    }
}

impl From<LibraryError> for AppResponse {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Store(e) => AppResponse::from(e),
            LibraryError::NotFound(msg) => AppResponse::NotFound(msg),
            LibraryError::Validation(msg) => AppResponse::ValidationError(msg),
            LibraryError::Transient(msg) => {
                AppResponse::DatabaseError(format!("Temporary failure, retry: {}", msg))
            }
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }
}
