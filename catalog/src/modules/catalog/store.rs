use async_trait::async_trait;

use super::cursor::{Page, PageRequest};
use super::error::CatalogError;
use super::types::{Content, ContentDraft, SearchHit};

/// Maps tag names to stable identifiers.
#[async_trait]
pub trait TagRegistry: Send + Sync {
    /// Returns the identifier of the tag called `name`, creating it on first use.
    ///
    /// Concurrent calls for the same name resolve to the same identifier.
    async fn ensure_tag(&self, name: &str) -> Result<String, CatalogError>;
}

/// Storage capability behind both catalog services.
///
/// Implemented by [`SeaOrmContentStore`](super::SeaOrmContentStore) for
/// production and by [`MemoryContentStore`](super::MemoryContentStore) as a
/// fixture; callers pick one at construction time.
#[async_trait]
pub trait ContentStore: TagRegistry {
    /// Persists a new record with its tags in one atomic unit.
    async fn create_content(&self, draft: ContentDraft) -> Result<Content, CatalogError>;

    /// Live record by id, tags sorted by name.
    async fn get_content(&self, id: &str) -> Result<Content, CatalogError>;

    /// Overwrites every mutable field and replaces the whole tag set.
    async fn update_content(&self, id: &str, draft: ContentDraft)
    -> Result<Content, CatalogError>;

    /// Soft-deletes a live record. Deleting twice reports `NotFound`.
    async fn delete_content(&self, id: &str) -> Result<(), CatalogError>;

    /// Live records, most recently created first.
    async fn list_contents(&self, page: &PageRequest) -> Result<Page<Content>, CatalogError>;

    /// Live records matching `query`, best match first.
    ///
    /// A blank query yields an empty page.
    async fn search_contents(
        &self,
        query: &str,
        page: &PageRequest,
    ) -> Result<Page<SearchHit>, CatalogError>;
}
