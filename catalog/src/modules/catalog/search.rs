//! Similarity search over live content.
//!
//! A row is a candidate when its title, description, platform name or tag
//! text contains the query (case-insensitive) or is trigram-similar to it
//! above [`SIMILARITY_THRESHOLD`]. Candidates are ranked by the best of the
//! four similarities, then by creation time and identifier, all descending.
//!
//! On PostgreSQL the candidate set is computed by `pg_trgm` in a single
//! query; other backends load the live rows and score them with
//! [`super::trigram`], which follows the same definition.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use entity::content;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, Statement, Value};
use tracing::debug;

use super::cursor::{self, Page, PageRequest};
use super::error::CatalogError;
use super::repository::{hydrate, live_contents};
use super::trigram::{self, SIMILARITY_THRESHOLD, Trigram};
use super::types::{Content, SearchHit};

/// Trimmed query, or `None` when nothing is left to search for.
pub fn normalize_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Pre-computed query features, reused across every scored row.
pub struct QueryMatcher {
    lowered: String,
    trigrams: HashSet<Trigram>,
}

impl QueryMatcher {
    pub fn new(query: &str) -> Self {
        Self {
            lowered: query.to_lowercase(),
            trigrams: trigram::trigrams(query),
        }
    }

    /// Rank of `content` if it is a candidate for this query.
    pub fn score(&self, content: &Content) -> Option<f32> {
        let tag_text = content.tag_text();
        let fields = [
            content.title.as_str(),
            content.description.as_deref().unwrap_or(""),
            content.platform_name.as_deref().unwrap_or(""),
            tag_text.as_str(),
        ];

        let mut rank = 0.0_f32;
        let mut contains = false;
        for field in fields {
            if field.is_empty() {
                continue;
            }
            rank = rank.max(trigram::set_similarity(
                &trigram::trigrams(field),
                &self.trigrams,
            ));
            contains |= field.to_lowercase().contains(&self.lowered);
        }

        (contains || rank > SIMILARITY_THRESHOLD).then_some(rank)
    }
}

/// Search result order: rank, then creation time, then id, all descending.
pub fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.rank
        .total_cmp(&a.rank)
        .then_with(|| b.content.created_at.cmp(&a.content.created_at))
        .then_with(|| b.content.id.cmp(&a.content.id))
}

/// Filters `contents` down to candidates and sorts them in result order.
pub fn rank_contents(query: &str, contents: Vec<Content>) -> Vec<SearchHit> {
    let matcher = QueryMatcher::new(query);
    let mut hits: Vec<SearchHit> = contents
        .into_iter()
        .filter_map(|content| {
            matcher
                .score(&content)
                .map(|rank| SearchHit { content, rank })
        })
        .collect();
    hits.sort_by(compare_hits);
    hits
}

/// Scores every live row in process and paginates the ranked list.
pub(super) async fn search_in_process<C>(
    conn: &C,
    query: &str,
    page: &PageRequest,
) -> Result<Page<SearchHit>, CatalogError>
where
    C: ConnectionTrait,
{
    let contents = live_contents(conn).await?;
    let scanned = contents.len();
    let hits = rank_contents(query, contents);

    debug!(
        query = %query,
        scanned = scanned,
        candidates = hits.len(),
        "In-process similarity search"
    );

    cursor::paginate(hits, page, |hit| hit.content.id.as_str())
}

// ============================================================================
// PostgreSQL (pg_trgm)
// ============================================================================

/// Shared candidate set. `$1` query, `$2` escaped ILIKE pattern, `$3` threshold.
///
/// `similarity()` folds case itself and runs on the bare columns the trigram
/// indexes cover. `GREATEST` skips the NULLs of absent optional fields.
const CANDIDATES_CTE: &str = r#"
WITH tag_text AS (
    SELECT ct.content_id,
           string_agg(t.name, ' ' ORDER BY t.name COLLATE "C") AS tags
    FROM content_tag ct
    JOIN tag t ON t.id = ct.tag_id
    GROUP BY ct.content_id
),
scored AS (
    SELECT c.id,
           c.created_at,
           GREATEST(
               similarity(c.title, $1),
               similarity(c.description, $1),
               similarity(c.platform_name, $1),
               similarity(tt.tags, $1)
           ) AS rank,
           (c.title ILIKE $2 ESCAPE '\'
               OR c.description ILIKE $2 ESCAPE '\'
               OR c.platform_name ILIKE $2 ESCAPE '\'
               OR tt.tags ILIKE $2 ESCAPE '\') AS exact_match
    FROM content c
    LEFT JOIN tag_text tt ON tt.content_id = c.id
    WHERE c.deleted_at IS NULL
),
candidates AS (
    SELECT id, created_at, rank
    FROM scored
    WHERE exact_match OR rank > $3
)
"#;

/// Escapes LIKE wildcards so the query only matches literally.
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn candidate_params(query: &str) -> Vec<Value> {
    vec![
        query.into(),
        format!("%{}%", escape_like(query)).into(),
        SIMILARITY_THRESHOLD.into(),
    ]
}

/// Ranks candidates with `similarity()` and loads the page's records.
pub(super) async fn search_postgres<C>(
    conn: &C,
    query: &str,
    page: &PageRequest,
) -> Result<Page<SearchHit>, CatalogError>
where
    C: ConnectionTrait,
{
    let mut values = candidate_params(query);

    let sql = match page.page_token() {
        None => {
            values.push((page.fetch_limit() as i64).into());
            format!(
                "{CANDIDATES_CTE} SELECT id, rank FROM candidates \
                 ORDER BY rank DESC, created_at DESC, id DESC LIMIT $4"
            )
        }
        Some(token) => {
            let anchor_sql =
                format!("{CANDIDATES_CTE} SELECT rank, created_at FROM candidates WHERE id = $4");
            let mut anchor_values = candidate_params(query);
            anchor_values.push(token.into());

            let anchor = conn
                .query_one(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    anchor_sql,
                    anchor_values,
                ))
                .await?
                .ok_or_else(|| CatalogError::InvalidPageToken(token.to_string()))?;
            let anchor_rank: f32 = anchor.try_get("", "rank")?;
            let anchor_created: DateTimeWithTimeZone = anchor.try_get("", "created_at")?;

            values.push(anchor_rank.into());
            values.push(anchor_created.into());
            values.push(token.into());
            values.push((page.fetch_limit() as i64).into());
            format!(
                "{CANDIDATES_CTE} SELECT id, rank FROM candidates \
                 WHERE (rank, created_at, id) < ($4, $5, $6) \
                 ORDER BY rank DESC, created_at DESC, id DESC LIMIT $7"
            )
        }
    };

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            values,
        ))
        .await?;

    let mut ranked = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.try_get("", "id")?;
        let rank: f32 = row.try_get("", "rank")?;
        ranked.push((id, rank));
    }

    let ids: Vec<String> = ranked.iter().map(|(id, _)| id.clone()).collect();
    let models = content::Entity::find()
        .filter(content::Column::Id.is_in(ids.iter().cloned()))
        .all(conn)
        .await?;
    let mut by_id: HashMap<String, Content> = hydrate(conn, models)
        .await?
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect();

    // A row soft-deleted between the two statements invalidates the page.
    let mut hits = Vec::with_capacity(ranked.len());
    for (id, rank) in ranked {
        let content = by_id.remove(&id).ok_or_else(|| {
            CatalogError::Storage(sea_orm::DbErr::RecordNotFound(format!(
                "content {} vanished during search",
                id
            )))
        })?;
        hits.push(SearchHit { content, rank });
    }

    Ok(cursor::seal_page(hits, page.page_size(), |hit| {
        hit.content.id.as_str()
    }))
}
