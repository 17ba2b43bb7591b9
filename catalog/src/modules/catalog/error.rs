use errors::AppError;
use sea_orm::{DbErr, SqlErr};

/// Errors surfaced by the catalog stores.
///
/// Translation into wire-level status codes belongs to the calling service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Malformed or missing field, rejected before any storage call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record does not exist or is soft-deleted
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Cursor does not resolve to a live row of the current result set
    #[error("Invalid page token: {0}")]
    InvalidPageToken(String),

    /// Concurrent tag creation the atomic upsert could not resolve
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Storage(#[from] DbErr),
}

impl CatalogError {
    /// Maps a unique-constraint violation to `Conflict`, anything else to `Storage`.
    pub(crate) fn from_upsert(err: DbErr, name: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                CatalogError::Conflict(format!("tag '{}': {}", name, detail))
            }
            _ => CatalogError::Storage(err),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidInput(msg) => AppError::InvalidInput(msg),
            CatalogError::NotFound(msg) => AppError::NotFound(msg),
            CatalogError::InvalidPageToken(msg) => {
                AppError::InvalidInput(format!("invalid page token: {}", msg))
            }
            CatalogError::Conflict(msg) => AppError::Conflict(msg),
            CatalogError::Storage(db_err) => AppError::Storage(Box::new(db_err)),
        }
    }
}
