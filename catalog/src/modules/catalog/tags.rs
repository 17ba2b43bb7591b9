//! Tag registry and content-tag link helpers for the database-backed store.
//!
//! Every helper is generic over [`ConnectionTrait`] so it runs the same on a
//! plain connection and inside an open transaction.

use std::collections::HashMap;

use entity::{content_tag, tag};
use sea_orm::sea_query::{OnConflict, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::error::CatalogError;

/// Returns the identifier of the tag called `name`, creating it if needed.
///
/// Runs as one `INSERT .. ON CONFLICT (name) DO UPDATE .. RETURNING id`
/// statement: racing callers for the same name all get the surviving row's
/// identifier and never a second row.
pub async fn ensure_tag<C>(conn: &C, name: &str) -> Result<String, CatalogError>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(CatalogError::InvalidInput(
            "tag name must not be empty".to_string(),
        ));
    }

    let mut insert = Query::insert();
    insert
        .into_table(tag::Entity)
        .columns([tag::Column::Id, tag::Column::Name]);
    insert
        .values([Uuid::new_v4().to_string().into(), name.into()])
        .map_err(|e| DbErr::Custom(e.to_string()))?;
    insert
        .on_conflict(
            OnConflict::column(tag::Column::Name)
                .update_column(tag::Column::Name)
                .to_owned(),
        )
        .returning_col(tag::Column::Id);

    let statement = conn.get_database_backend().build(&insert);
    let row = conn
        .query_one(statement)
        .await
        .map_err(|e| CatalogError::from_upsert(e, name))?
        .ok_or_else(|| CatalogError::Conflict(format!("tag '{}' upsert returned no row", name)))?;

    let tag_id: String = row.try_get("", "id")?;
    debug!(tag = %name, tag_id = %tag_id, "Tag resolved");

    Ok(tag_id)
}

/// Order in which a transaction upserts its tags.
///
/// Each upsert holds the tag's row lock until commit, so every writer must
/// take them in the same order or two transactions can wait on each other.
pub fn lock_order(names: &[String]) -> Vec<&str> {
    let mut ordered: Vec<&str> = names.iter().map(String::as_str).collect();
    ordered.sort_unstable();
    ordered.dedup();
    ordered
}

/// Resolves every name and links it to `content_id`.
pub async fn link_tags<C>(conn: &C, content_id: &str, names: &[String]) -> Result<(), CatalogError>
where
    C: ConnectionTrait,
{
    if names.is_empty() {
        return Ok(());
    }

    let mut links = Vec::with_capacity(names.len());
    for name in lock_order(names) {
        let tag_id = ensure_tag(conn, name).await?;
        links.push(content_tag::ActiveModel {
            content_id: sea_orm::ActiveValue::Set(content_id.to_string()),
            tag_id: sea_orm::ActiveValue::Set(tag_id),
        });
    }

    content_tag::Entity::insert_many(links)
        .on_conflict(
            OnConflict::columns([content_tag::Column::ContentId, content_tag::Column::TagId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

/// Removes every tag link of `content_id`. Tags themselves are kept.
pub async fn unlink_all<C>(conn: &C, content_id: &str) -> Result<u64, CatalogError>
where
    C: ConnectionTrait,
{
    let result = content_tag::Entity::delete_many()
        .filter(content_tag::Column::ContentId.eq(content_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Tag names for a batch of content ids, each list sorted ascending.
///
/// Ids without tags are absent from the map.
pub async fn tags_for<C>(
    conn: &C,
    content_ids: &[String],
) -> Result<HashMap<String, Vec<String>>, CatalogError>
where
    C: ConnectionTrait,
{
    if content_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, String)> = content_tag::Entity::find()
        .select_only()
        .column(content_tag::Column::ContentId)
        .column(tag::Column::Name)
        .join(JoinType::InnerJoin, content_tag::Relation::Tag.def())
        .filter(content_tag::Column::ContentId.is_in(content_ids.iter().cloned()))
        .into_tuple()
        .all(conn)
        .await?;

    let mut by_content: HashMap<String, Vec<String>> = HashMap::new();
    for (content_id, name) in rows {
        by_content.entry(content_id).or_default().push(name);
    }
    // Byte order, independent of the database collation
    for names in by_content.values_mut() {
        names.sort();
    }

    Ok(by_content)
}
