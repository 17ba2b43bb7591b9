//! Database-backed content store.
//!
//! Every write that touches more than one table runs in a single
//! transaction. Dropping a future mid-way (caller cancellation, timeout)
//! drops the open `DatabaseTransaction`, which rolls back.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use entity::content;
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, EntityTrait, IsolationLevel,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::cursor::{Page, PageRequest, seal_page};
use super::error::CatalogError;
use super::search;
use super::store::{ContentStore, TagRegistry};
use super::tags;
use super::types::{Content, ContentDraft, ContentType, SearchHit};

/// Content store over a SeaORM connection (PostgreSQL in production, SQLite
/// in tests).
#[derive(Clone)]
pub struct SeaOrmContentStore {
    db: DatabaseConnection,
}

impl SeaOrmContentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Read transaction giving every statement of a page the same snapshot.
    async fn read_txn(&self) -> Result<DatabaseTransaction, DbErr> {
        match self.db.get_database_backend() {
            DbBackend::Postgres => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::RepeatableRead),
                        Some(AccessMode::ReadOnly),
                    )
                    .await
            }
            _ => self.db.begin().await,
        }
    }
}

// ============================================================================
// Row Helpers
// ============================================================================

/// Current time at the microsecond precision the database stores.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly later than `previous`.
pub(crate) fn next_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

async fn find_live<C>(conn: &C, id: &str, lock: bool) -> Result<Option<content::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = content::Entity::find_by_id(id.to_string())
        .filter(content::Column::DeletedAt.is_null());
    if lock {
        query = query.lock_exclusive();
    }
    query.one(conn).await
}

fn into_content(model: content::Model, tags: Vec<String>) -> Result<Content, CatalogError> {
    let content_type: ContentType = model.content_type.parse().map_err(|_| {
        CatalogError::Storage(DbErr::Type(format!(
            "content {} has unknown content_type '{}'",
            model.id, model.content_type
        )))
    })?;

    Ok(Content {
        id: model.id,
        title: model.title,
        description: model.description,
        tags,
        language: model.language,
        duration_seconds: model.duration_seconds,
        published_at: model.published_at.map(Into::into),
        content_type,
        url: model.url,
        platform_name: model.platform_name,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    })
}

/// Attaches sorted tag names to each model, keeping the input order.
pub(crate) async fn hydrate<C>(
    conn: &C,
    models: Vec<content::Model>,
) -> Result<Vec<Content>, CatalogError>
where
    C: ConnectionTrait,
{
    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
    let mut tags_by_id = tags::tags_for(conn, &ids).await?;

    models
        .into_iter()
        .map(|model| {
            let tags = tags_by_id.remove(&model.id).unwrap_or_default();
            into_content(model, tags)
        })
        .collect()
}

/// Every live record with its tags, in no particular order.
pub(crate) async fn live_contents<C>(conn: &C) -> Result<Vec<Content>, CatalogError>
where
    C: ConnectionTrait,
{
    let models = content::Entity::find()
        .filter(content::Column::DeletedAt.is_null())
        .all(conn)
        .await?;
    hydrate(conn, models).await
}

fn apply_draft(active: &mut content::ActiveModel, draft: &ContentDraft) {
    active.title = Set(draft.title.clone());
    active.description = Set(draft.description.clone());
    active.language = Set(draft.language.clone());
    active.duration_seconds = Set(draft.duration_seconds);
    active.published_at = Set(draft.published_at.map(Into::into));
    active.content_type = Set(draft.content_type.as_str().to_string());
    active.url = Set(draft.url.clone());
    active.platform_name = Set(draft.platform_name.clone());
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

// ============================================================================
// Store Implementation
// ============================================================================

#[async_trait]
impl TagRegistry for SeaOrmContentStore {
    async fn ensure_tag(&self, name: &str) -> Result<String, CatalogError> {
        tags::ensure_tag(&self.db, name).await
    }
}

#[async_trait]
impl ContentStore for SeaOrmContentStore {
    async fn create_content(&self, draft: ContentDraft) -> Result<Content, CatalogError> {
        let draft = draft.validate()?;
        let id = Uuid::new_v4().to_string();
        let created_at = now();

        let mut active = content::ActiveModel {
            id: Set(id.clone()),
            created_at: Set(created_at.into()),
            updated_at: Set(created_at.into()),
            deleted_at: Set(None),
            ..Default::default()
        };
        apply_draft(&mut active, &draft);

        let txn = self.db.begin().await?;
        let model = active.insert(&txn).await?;
        tags::link_tags(&txn, &id, &draft.tags).await?;
        txn.commit().await?;

        info!(content_id = %id, tags = draft.tags.len(), "Content created");
        into_content(model, sorted(draft.tags))
    }

    async fn get_content(&self, id: &str) -> Result<Content, CatalogError> {
        let txn = self.read_txn().await?;
        let model = find_live(&txn, id, false)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let mut contents = hydrate(&txn, vec![model]).await?;
        txn.commit().await?;

        contents
            .pop()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn update_content(
        &self,
        id: &str,
        draft: ContentDraft,
    ) -> Result<Content, CatalogError> {
        let draft = draft.validate()?;

        let txn = self.db.begin().await?;
        let existing = find_live(&txn, id, true)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let updated_at = next_after(existing.updated_at.into());

        let mut active: content::ActiveModel = existing.into();
        apply_draft(&mut active, &draft);
        active.updated_at = Set(updated_at.into());
        let model = active.update(&txn).await?;

        let removed = tags::unlink_all(&txn, id).await?;
        tags::link_tags(&txn, id, &draft.tags).await?;
        txn.commit().await?;

        info!(
            content_id = %id,
            removed_links = removed,
            tags = draft.tags.len(),
            "Content updated"
        );
        into_content(model, sorted(draft.tags))
    }

    async fn delete_content(&self, id: &str) -> Result<(), CatalogError> {
        let deleted_at: sea_orm::prelude::DateTimeWithTimeZone = now().into();

        let result = content::Entity::update_many()
            .col_expr(content::Column::DeletedAt, Expr::value(deleted_at))
            .col_expr(content::Column::UpdatedAt, Expr::value(deleted_at))
            .filter(content::Column::Id.eq(id))
            .filter(content::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        info!(content_id = %id, "Content soft-deleted");
        Ok(())
    }

    async fn list_contents(&self, page: &PageRequest) -> Result<Page<Content>, CatalogError> {
        let txn = self.read_txn().await?;

        let mut query = content::Entity::find().filter(content::Column::DeletedAt.is_null());
        if let Some(token) = page.page_token() {
            let anchor = find_live(&txn, token, false)
                .await?
                .ok_or_else(|| CatalogError::InvalidPageToken(token.to_string()))?;
            query = query.filter(
                Condition::any()
                    .add(content::Column::CreatedAt.lt(anchor.created_at))
                    .add(
                        Condition::all()
                            .add(content::Column::CreatedAt.eq(anchor.created_at))
                            .add(content::Column::Id.lt(anchor.id)),
                    ),
            );
        }

        let models = query
            .order_by_desc(content::Column::CreatedAt)
            .order_by_desc(content::Column::Id)
            .limit(page.fetch_limit())
            .all(&txn)
            .await?;
        let contents = hydrate(&txn, models).await?;
        txn.commit().await?;

        debug!(rows = contents.len(), page_size = page.page_size(), "Listed contents");
        Ok(seal_page(contents, page.page_size(), |c| c.id.as_str()))
    }

    async fn search_contents(
        &self,
        query: &str,
        page: &PageRequest,
    ) -> Result<Page<SearchHit>, CatalogError> {
        let Some(query) = search::normalize_query(query) else {
            return Ok(Page::empty());
        };

        let txn = self.read_txn().await?;
        let result = match txn.get_database_backend() {
            DbBackend::Postgres => search::search_postgres(&txn, query, page).await?,
            _ => search::search_in_process(&txn, query, page).await?,
        };
        txn.commit().await?;

        debug!(
            query = %query,
            hits = result.items.len(),
            has_more = result.next_page_token.is_some(),
            "Searched contents"
        );
        Ok(result)
    }
}
