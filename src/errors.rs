//! Typed errors for the store, catalog and library layers.
//!
//! The FFI bridge flattens all of these into [`crate::app_response::AppResponse`].

use thiserror::Error;

use crate::debate_model::CategoryId;

/// Failures raised by a [`crate::store_adapter::StoreAdapter`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lmdb error: {0}")]
    Lmdb(#[from] lmdb::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value is not valid UTF-8")]
    InvalidUtf8,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store is closed")]
    Closed,
}

/// Errors returned by [`crate::catalog::CatalogRepository`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The persisted catalog document could not be parsed as a category tree.
    #[error("stored catalog is corrupt: {0}")]
    CorruptStore(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("slug '{slug}' is already used in category {category_id}")]
    DuplicateSlug { slug: String, category_id: CategoryId },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors returned by a [`crate::library::LibraryService`].
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Connectivity or backend hiccup; the caller may retry.
    #[error("transient library failure: {0}")]
    Transient(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LibraryError {
    pub fn is_transient(&self) -> bool {
        match self {
            LibraryError::Transient(_) => true,
            // MapFull persists until the map is resized, so it is not retryable.
            LibraryError::Store(StoreError::Lmdb(e)) => {
                matches!(e, lmdb::Error::ReadersFull | lmdb::Error::TxnFull)
            }
            _ => false,
        }
    }
}

impl From<lmdb::Error> for LibraryError {
    fn from(err: lmdb::Error) -> Self {
        LibraryError::Store(StoreError::Lmdb(err))
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::Store(StoreError::Serialization(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type CatalogResult<T> = Result<T, CatalogError>;
pub type LibraryResult<T> = Result<T, LibraryError>;
