//! Process-level error type shared by the catalog crates.
//!
//! Module errors (`CatalogError`, configuration failures, migration failures)
//! convert into [`AppError`] at the boundary where the process wires its
//! components together.

use std::error::Error as StdError;

pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(BoxError),

    #[error("Migration error: {0}")]
    Migration(BoxError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
