//! In-memory content store used as a test fixture.
//!
//! One `RwLock` guards the whole state, so every operation is atomic with
//! respect to the others. Semantics mirror [`SeaOrmContentStore`]: soft
//! deletes, tag replacement on update, the same ordering and cursor rules.
//!
//! [`SeaOrmContentStore`]: super::SeaOrmContentStore

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::cursor::{self, Page, PageRequest};
use super::error::CatalogError;
use super::repository::{next_after, now};
use super::search;
use super::store::{ContentStore, TagRegistry};
use super::types::{Content, ContentDraft, SearchHit};

#[derive(Debug, Clone)]
struct StoredContent {
    draft: ContentDraft,
    tag_ids: BTreeSet<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredContent {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    contents: HashMap<String, StoredContent>,
    tag_ids_by_name: HashMap<String, String>,
    tag_names_by_id: HashMap<String, String>,
    /// Latest timestamp handed out; creation times never repeat.
    clock: Option<DateTime<Utc>>,
}

impl MemoryState {
    fn ensure_tag(&mut self, name: &str) -> String {
        if let Some(id) = self.tag_ids_by_name.get(name) {
            return id.clone();
        }
        let id = Uuid::new_v4().to_string();
        self.tag_ids_by_name.insert(name.to_string(), id.clone());
        self.tag_names_by_id.insert(id.clone(), name.to_string());
        id
    }

    fn tick(&mut self) -> DateTime<Utc> {
        let t = match self.clock {
            Some(previous) => next_after(previous),
            None => now(),
        };
        self.clock = Some(t);
        t
    }

    fn to_content(&self, id: &str, stored: &StoredContent) -> Content {
        let mut tags: Vec<String> = stored
            .tag_ids
            .iter()
            .filter_map(|tag_id| self.tag_names_by_id.get(tag_id).cloned())
            .collect();
        tags.sort();

        let draft = &stored.draft;
        Content {
            id: id.to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            tags,
            language: draft.language.clone(),
            duration_seconds: draft.duration_seconds,
            published_at: draft.published_at,
            content_type: draft.content_type,
            url: draft.url.clone(),
            platform_name: draft.platform_name.clone(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    fn live_contents(&self) -> Vec<Content> {
        self.contents
            .iter()
            .filter(|(_, stored)| stored.is_live())
            .map(|(id, stored)| self.to_content(id, stored))
            .collect()
    }
}

/// Content store holding everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    state: RwLock<MemoryState>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct tags ever created.
    pub async fn tag_count(&self) -> usize {
        self.state.read().await.tag_ids_by_name.len()
    }
}

#[async_trait]
impl TagRegistry for MemoryContentStore {
    async fn ensure_tag(&self, name: &str) -> Result<String, CatalogError> {
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidInput(
                "tag name must not be empty".to_string(),
            ));
        }
        Ok(self.state.write().await.ensure_tag(name))
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn create_content(&self, draft: ContentDraft) -> Result<Content, CatalogError> {
        let draft = draft.validate()?;
        let id = Uuid::new_v4().to_string();

        let mut state = self.state.write().await;
        let created_at = state.tick();
        let tag_ids = draft.tags.iter().map(|name| state.ensure_tag(name)).collect();
        let stored = StoredContent {
            draft,
            tag_ids,
            created_at,
            updated_at: created_at,
            deleted_at: None,
        };
        let content = state.to_content(&id, &stored);
        state.contents.insert(id.clone(), stored);

        info!(content_id = %id, "Content created in memory store");
        Ok(content)
    }

    async fn get_content(&self, id: &str) -> Result<Content, CatalogError> {
        let state = self.state.read().await;
        state
            .contents
            .get(id)
            .filter(|stored| stored.is_live())
            .map(|stored| state.to_content(id, stored))
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn update_content(
        &self,
        id: &str,
        draft: ContentDraft,
    ) -> Result<Content, CatalogError> {
        let draft = draft.validate()?;

        let mut state = self.state.write().await;
        let previous = match state.contents.get(id) {
            Some(stored) if stored.is_live() => stored.updated_at,
            _ => return Err(CatalogError::NotFound(id.to_string())),
        };
        let updated_at = next_after(previous.max(state.tick()));
        state.clock = Some(updated_at);
        let tag_ids: BTreeSet<String> =
            draft.tags.iter().map(|name| state.ensure_tag(name)).collect();

        let stored = state
            .contents
            .get_mut(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        stored.draft = draft;
        stored.tag_ids = tag_ids;
        stored.updated_at = updated_at;
        let snapshot = stored.clone();

        info!(content_id = %id, "Content updated in memory store");
        Ok(state.to_content(id, &snapshot))
    }

    async fn delete_content(&self, id: &str) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        if !state.contents.get(id).is_some_and(StoredContent::is_live) {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        let deleted_at = state.tick();
        let stored = state
            .contents
            .get_mut(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        stored.deleted_at = Some(deleted_at);
        stored.updated_at = deleted_at;

        info!(content_id = %id, "Content soft-deleted in memory store");
        Ok(())
    }

    async fn list_contents(&self, page: &PageRequest) -> Result<Page<Content>, CatalogError> {
        let mut contents = self.state.read().await.live_contents();
        contents.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        cursor::paginate(contents, page, |c| c.id.as_str())
    }

    async fn search_contents(
        &self,
        query: &str,
        page: &PageRequest,
    ) -> Result<Page<SearchHit>, CatalogError> {
        let Some(query) = search::normalize_query(query) else {
            return Ok(Page::empty());
        };

        let contents = self.state.read().await.live_contents();
        let hits = search::rank_contents(query, contents);
        debug!(query = %query, candidates = hits.len(), "Searched memory store");

        cursor::paginate(hits, page, |hit| hit.content.id.as_str())
    }
}
