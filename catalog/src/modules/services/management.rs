//! Content management: the write side of the catalog.

use std::sync::Arc;

use tracing::{info, warn};

use super::require_id;
use crate::modules::catalog::{
    CatalogError, Content, ContentDraft, ContentStore, Page, PageRequest,
};

/// Create, read, update, delete and list operations for catalog editors.
#[derive(Clone)]
pub struct ManagementService {
    store: Arc<dyn ContentStore>,
}

impl ManagementService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// The store validates the draft; an invalid one never reaches storage.
    pub async fn create(&self, draft: ContentDraft) -> Result<Content, CatalogError> {
        info!(title = %draft.title, content_type = %draft.content_type, "Creating content");

        let content = self.store.create_content(draft).await.inspect_err(|e| {
            warn!(error = %e, "Content creation failed");
        })?;

        info!(content_id = %content.id, tags = content.tags.len(), "Content created");
        Ok(content)
    }

    pub async fn get(&self, id: &str) -> Result<Content, CatalogError> {
        let id = require_id(id)?;
        self.store.get_content(id).await
    }

    pub async fn update(&self, id: &str, draft: ContentDraft) -> Result<Content, CatalogError> {
        let id = require_id(id)?;
        info!(content_id = %id, "Updating content");

        let content = self.store.update_content(id, draft).await.inspect_err(|e| {
            warn!(content_id = %id, error = %e, "Content update failed");
        })?;

        info!(content_id = %id, updated_at = %content.updated_at, "Content updated");
        Ok(content)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let id = require_id(id)?;
        info!(content_id = %id, "Deleting content");

        self.store.delete_content(id).await.inspect_err(|e| {
            warn!(content_id = %id, error = %e, "Content deletion failed");
        })?;

        info!(content_id = %id, "Content deleted");
        Ok(())
    }

    /// Live records, newest first. A page size of zero or less means the default.
    pub async fn list(
        &self,
        page_size: i32,
        page_token: Option<&str>,
    ) -> Result<Page<Content>, CatalogError> {
        let request = PageRequest::new(page_size, page_token);
        let page = self.store.list_contents(&request).await?;

        info!(
            returned = page.items.len(),
            has_more = page.next_page_token.is_some(),
            "Listed contents"
        );
        Ok(page)
    }
}
