//! Content discovery: the read side of the catalog.

use std::sync::Arc;

use tracing::{debug, info};

use super::require_id;
use crate::modules::catalog::{CatalogError, Content, ContentStore, Page, PageRequest, SearchHit};

/// Read-only access for listeners and viewers: lookup, browse and search.
#[derive(Clone)]
pub struct DiscoveryService {
    store: Arc<dyn ContentStore>,
}

impl DiscoveryService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: &str) -> Result<Content, CatalogError> {
        let id = require_id(id)?;
        self.store.get_content(id).await
    }

    pub async fn list(
        &self,
        page_size: i32,
        page_token: Option<&str>,
    ) -> Result<Page<Content>, CatalogError> {
        let request = PageRequest::new(page_size, page_token);
        let page = self.store.list_contents(&request).await?;
        debug!(returned = page.items.len(), "Listed contents for discovery");
        Ok(page)
    }

    /// Best matches first. A blank query returns an empty page.
    pub async fn search(
        &self,
        query: &str,
        page_size: i32,
        page_token: Option<&str>,
    ) -> Result<Page<SearchHit>, CatalogError> {
        let request = PageRequest::new(page_size, page_token);
        let page = self.store.search_contents(query, &request).await?;

        info!(
            query = %query.trim(),
            returned = page.items.len(),
            has_more = page.next_page_token.is_some(),
            "Searched contents"
        );
        Ok(page)
    }
}
