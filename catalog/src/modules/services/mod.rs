//! Application services over a shared [`ContentStore`].
//!
//! [`ContentStore`]: crate::modules::catalog::ContentStore

pub mod discovery;
pub mod management;

pub use discovery::DiscoveryService;
pub use management::ManagementService;

use crate::modules::catalog::CatalogError;

/// Rejects blank record ids before they reach the store.
pub(crate) fn require_id(id: &str) -> Result<&str, CatalogError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CatalogError::InvalidInput("id is required".to_string()));
    }
    Ok(id)
}
