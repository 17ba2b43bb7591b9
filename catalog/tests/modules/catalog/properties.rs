//! Behaviour every `ContentStore` variant must share.
//!
//! Each check takes a fresh store; `store_suite!` instantiates the whole set
//! once per variant. The PostgreSQL variant only runs when
//! `TEST_DATABASE_URL` is set.

use std::sync::Arc;

use catalog::modules::catalog::trigram;
use catalog::modules::catalog::{
    CatalogError, ContentDraft, ContentStore, ContentType, PageRequest, TagRegistry,
};
use chrono::{Duration, SubsecRound, Utc};
use futures::future::join_all;

fn podcast(title: &str) -> ContentDraft {
    ContentDraft::new(title, ContentType::Podcast)
}

pub async fn create_then_get_returns_unchanged_fields(store: Arc<dyn ContentStore>) {
    let published = Utc::now().trunc_subsecs(0) - Duration::days(10);
    let draft = ContentDraft::new("Cold Waters", ContentType::Documentary)
        .with_description("Arctic fisheries")
        .with_language("no")
        .with_duration_seconds(5400)
        .with_published_at(published)
        .with_url("https://example.com/cold-waters")
        .with_platform_name("NRK")
        .with_tags(["ocean", "economy"]);

    let created = store.create_content(draft.clone()).await.unwrap();
    let fetched = store.get_content(&created.id).await.unwrap();

    assert_eq!(fetched.title, draft.title);
    assert_eq!(fetched.description, draft.description);
    assert_eq!(fetched.language, draft.language);
    assert_eq!(fetched.duration_seconds, Some(5400));
    assert_eq!(fetched.published_at, Some(published));
    assert_eq!(fetched.content_type, ContentType::Documentary);
    assert_eq!(fetched.url, draft.url);
    assert_eq!(fetched.platform_name, draft.platform_name);
    assert_eq!(fetched.tags, vec!["economy", "ocean"]);
    assert_eq!(fetched.created_at, fetched.updated_at);
    assert!(fetched.created_at.timestamp() > 0);
}

pub async fn update_reflects_every_change(store: Arc<dyn ContentStore>) {
    let created = store
        .create_content(podcast("Draft Title").with_tags(["old", "shared"]))
        .await
        .unwrap();

    let updated = store
        .update_content(
            &created.id,
            ContentDraft::new("Final Title", ContentType::Documentary)
                .with_description("now with a description")
                .with_duration_seconds(60)
                .with_tags(["shared", "new", "another"]),
        )
        .await
        .unwrap();

    let fetched = store.get_content(&created.id).await.unwrap();
    assert_eq!(fetched, updated);
    assert_eq!(fetched.title, "Final Title");
    assert_eq!(fetched.content_type, ContentType::Documentary);
    assert_eq!(fetched.description.as_deref(), Some("now with a description"));
    assert_eq!(fetched.tags, vec!["another", "new", "shared"]);
    assert_eq!(fetched.created_at, created.created_at);
    assert!(fetched.updated_at > created.updated_at);
}

pub async fn update_can_clear_optional_fields(store: Arc<dyn ContentStore>) {
    let created = store
        .create_content(
            podcast("Full")
                .with_description("text")
                .with_url("https://example.com")
                .with_tags(["t"]),
        )
        .await
        .unwrap();

    let updated = store
        .update_content(&created.id, podcast("Bare"))
        .await
        .unwrap();

    assert_eq!(updated.description, None);
    assert_eq!(updated.url, None);
    assert!(updated.tags.is_empty());
}

pub async fn delete_hides_and_second_delete_is_not_found(store: Arc<dyn ContentStore>) {
    let created = store.create_content(podcast("Ephemeral")).await.unwrap();

    store.delete_content(&created.id).await.unwrap();

    assert!(matches!(
        store.get_content(&created.id).await,
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        store.delete_content(&created.id).await,
        Err(CatalogError::NotFound(_))
    ));

    let page = store.list_contents(&PageRequest::default()).await.unwrap();
    assert!(page.items.iter().all(|c| c.id != created.id));
}

pub async fn list_pages_newest_first(store: Arc<dyn ContentStore>) {
    let mut created = Vec::new();
    for title in ["First", "Second", "Third"] {
        created.push(store.create_content(podcast(title)).await.unwrap());
    }
    created.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let first = store
        .list_contents(&PageRequest::first(2))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].id, created[0].id);
    assert_eq!(first.items[1].id, created[1].id);
    assert_eq!(first.next_page_token.as_deref(), Some(created[1].id.as_str()));

    let second = store
        .list_contents(&PageRequest::new(2, first.next_page_token.as_deref()))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].id, created[2].id);
    assert_eq!(second.next_page_token, None);
}

pub async fn list_exact_fit_has_no_token(store: Arc<dyn ContentStore>) {
    store.create_content(podcast("One")).await.unwrap();
    store.create_content(podcast("Two")).await.unwrap();

    let page = store.list_contents(&PageRequest::first(2)).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.next_page_token, None);
}

pub async fn list_rejects_unknown_token(store: Arc<dyn ContentStore>) {
    store.create_content(podcast("Only")).await.unwrap();

    assert!(matches!(
        store
            .list_contents(&PageRequest::new(5, Some("no-such-id")))
            .await,
        Err(CatalogError::InvalidPageToken(_))
    ));
}

pub async fn blank_search_is_empty(store: Arc<dyn ContentStore>) {
    store.create_content(podcast("Anything")).await.unwrap();

    for query in ["", "   "] {
        let page = store
            .search_contents(query, &PageRequest::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_page_token, None);
    }
}

pub async fn search_ranks_title_match(store: Arc<dyn ContentStore>) {
    let created = store
        .create_content(podcast("Test Podcast").with_tags(["technology", "podcast"]))
        .await
        .unwrap();

    let page = store
        .search_contents("podcast", &PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    let hit = &page.items[0];
    assert_eq!(hit.content.id, created.id);
    assert_eq!(hit.content.tags, vec!["podcast", "technology"]);
    let expected = trigram::similarity("Test Podcast", "podcast");
    assert!((hit.rank - expected).abs() < 1e-4, "rank {} != {}", hit.rank, expected);
}

pub async fn search_finds_tag_only_match(store: Arc<dyn ContentStore>) {
    let created = store
        .create_content(podcast("Late Night Talk").with_tags(["cosmology"]))
        .await
        .unwrap();
    store
        .create_content(podcast("Cooking Basics").with_tags(["food"]))
        .await
        .unwrap();

    let page = store
        .search_contents("cosmology", &PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].content.id, created.id);
    let expected = trigram::similarity("cosmology", "cosmology");
    assert!((page.items[0].rank - expected).abs() < 1e-4);
}

pub async fn search_tolerates_typos(store: Arc<dyn ContentStore>) {
    let created = store.create_content(podcast("Podcast")).await.unwrap();

    let page = store
        .search_contents("podcsat", &PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].content.id, created.id);
}

pub async fn search_skips_deleted(store: Arc<dyn ContentStore>) {
    let created = store.create_content(podcast("Vanishing Act")).await.unwrap();
    store.delete_content(&created.id).await.unwrap();

    let page = store
        .search_contents("vanishing", &PageRequest::default())
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

pub async fn search_pages_follow_rank_order(store: Arc<dyn ContentStore>) {
    store.create_content(podcast("Jazz")).await.unwrap();
    store.create_content(podcast("Jazz Hour")).await.unwrap();
    store.create_content(podcast("Late Jazz Hour Live")).await.unwrap();

    let all = store
        .search_contents("jazz", &PageRequest::first(10))
        .await
        .unwrap();
    assert_eq!(all.items.len(), 3);
    assert!(all.items.windows(2).all(|w| w[0].rank >= w[1].rank));

    let first = store
        .search_contents("jazz", &PageRequest::first(2))
        .await
        .unwrap();
    let token = first.next_page_token.clone().unwrap();
    assert_eq!(token, first.items[1].content.id);

    let second = store
        .search_contents("jazz", &PageRequest::new(2, Some(&token)))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.next_page_token, None);

    let paged: Vec<&str> = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|h| h.content.id.as_str())
        .collect();
    let unpaged: Vec<&str> = all.items.iter().map(|h| h.content.id.as_str()).collect();
    assert_eq!(paged, unpaged);
}

pub async fn concurrent_ensure_tag_agrees(store: Arc<dyn ContentStore>) {
    let (a, b) = tokio::join!(store.ensure_tag("x"), store.ensure_tag("x"));
    assert_eq!(a.unwrap(), b.unwrap());

    let ids = join_all((0..8).map(|_| store.ensure_tag("y"))).await;
    let first = ids[0].as_ref().unwrap();
    assert!(ids.iter().all(|id| id.as_ref().unwrap() == first));
}

pub async fn invalid_drafts_are_rejected(store: Arc<dyn ContentStore>) {
    assert!(matches!(
        store.create_content(podcast("  ")).await,
        Err(CatalogError::InvalidInput(_))
    ));
    assert!(matches!(
        store
            .create_content(podcast("Negative").with_duration_seconds(-1))
            .await,
        Err(CatalogError::InvalidInput(_))
    ));
    assert!(matches!(
        store
            .create_content(podcast("Blank tag").with_tags(["ok", " "]))
            .await,
        Err(CatalogError::InvalidInput(_))
    ));

    let page = store.list_contents(&PageRequest::default()).await.unwrap();
    assert!(page.items.is_empty());
}

pub async fn search_treats_wildcards_literally(store: Arc<dyn ContentStore>) {
    let created = store.create_content(podcast("snake_case tips")).await.unwrap();
    store.create_content(podcast("Plain Title")).await.unwrap();

    let page = store
        .search_contents("_", &PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].content.id, created.id);
}

pub async fn search_rejects_token_outside_results(store: Arc<dyn ContentStore>) {
    let jazz = store.create_content(podcast("Jazz")).await.unwrap();
    store.create_content(podcast("Opera")).await.unwrap();

    assert!(matches!(
        store
            .search_contents("opera", &PageRequest::new(1, Some(&jazz.id)))
            .await,
        Err(CatalogError::InvalidPageToken(_))
    ));
}

pub async fn concurrent_writes_with_shared_tags_succeed(store: Arc<dyn ContentStore>) {
    let creates = (0..20).map(|i| {
        let store = store.clone();
        let tags = if i % 2 == 0 {
            ["alpha", "beta", "gamma"]
        } else {
            ["gamma", "beta", "alpha"]
        };
        tokio::spawn(async move {
            store
                .create_content(podcast(&format!("Episode {}", i)).with_tags(tags))
                .await
        })
    });

    let mut ids = Vec::new();
    for result in join_all(creates).await {
        let content = result.expect("create task panicked").expect("create failed");
        assert_eq!(content.tags, vec!["alpha", "beta", "gamma"]);
        ids.push(content.id);
    }

    let updates = ids.iter().enumerate().map(|(i, id)| {
        let store = store.clone();
        let id = id.clone();
        let tags = if i % 2 == 0 {
            ["delta", "alpha"]
        } else {
            ["alpha", "delta"]
        };
        tokio::spawn(async move {
            store
                .update_content(&id, podcast("Re-tagged").with_tags(tags))
                .await
        })
    });

    for result in join_all(updates).await {
        let content = result.expect("update task panicked").expect("update failed");
        assert_eq!(content.tags, vec!["alpha", "delta"]);
    }

    let page = store.list_contents(&PageRequest::first(100)).await.unwrap();
    assert_eq!(page.items.len(), 20);
    assert!(page.items.iter().all(|c| c.tags == vec!["alpha", "delta"]));
}

macro_rules! store_suite {
    ($variant:ident, $factory:path) => {
        mod $variant {
            use super::*;

            #[tokio::test]
            async fn test_create_then_get() {
                if let Some(store) = $factory().await {
                    create_then_get_returns_unchanged_fields(store).await;
                }
            }

            #[tokio::test]
            async fn test_update() {
                if let Some(store) = $factory().await {
                    update_reflects_every_change(store).await;
                }
            }

            #[tokio::test]
            async fn test_update_clears_optional_fields() {
                if let Some(store) = $factory().await {
                    update_can_clear_optional_fields(store).await;
                }
            }

            #[tokio::test]
            async fn test_delete() {
                if let Some(store) = $factory().await {
                    delete_hides_and_second_delete_is_not_found(store).await;
                }
            }

            #[tokio::test]
            async fn test_list_pages() {
                if let Some(store) = $factory().await {
                    list_pages_newest_first(store).await;
                }
            }

            #[tokio::test]
            async fn test_list_exact_fit() {
                if let Some(store) = $factory().await {
                    list_exact_fit_has_no_token(store).await;
                }
            }

            #[tokio::test]
            async fn test_list_unknown_token() {
                if let Some(store) = $factory().await {
                    list_rejects_unknown_token(store).await;
                }
            }

            #[tokio::test]
            async fn test_blank_search() {
                if let Some(store) = $factory().await {
                    blank_search_is_empty(store).await;
                }
            }

            #[tokio::test]
            async fn test_search_title() {
                if let Some(store) = $factory().await {
                    search_ranks_title_match(store).await;
                }
            }

            #[tokio::test]
            async fn test_search_tag_only() {
                if let Some(store) = $factory().await {
                    search_finds_tag_only_match(store).await;
                }
            }

            #[tokio::test]
            async fn test_search_typo() {
                if let Some(store) = $factory().await {
                    search_tolerates_typos(store).await;
                }
            }

            #[tokio::test]
            async fn test_search_skips_deleted() {
                if let Some(store) = $factory().await {
                    search_skips_deleted(store).await;
                }
            }

            #[tokio::test]
            async fn test_search_pagination() {
                if let Some(store) = $factory().await {
                    search_pages_follow_rank_order(store).await;
                }
            }

            #[tokio::test]
            async fn test_search_wildcards() {
                if let Some(store) = $factory().await {
                    search_treats_wildcards_literally(store).await;
                }
            }

            #[tokio::test]
            async fn test_search_foreign_token() {
                if let Some(store) = $factory().await {
                    search_rejects_token_outside_results(store).await;
                }
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_tagged_writes() {
                if let Some(store) = $factory().await {
                    concurrent_writes_with_shared_tags_succeed(store).await;
                }
            }

            #[tokio::test]
            async fn test_concurrent_ensure_tag() {
                if let Some(store) = $factory().await {
                    concurrent_ensure_tag_agrees(store).await;
                }
            }

            #[tokio::test]
            async fn test_invalid_drafts() {
                if let Some(store) = $factory().await {
                    invalid_drafts_are_rejected(store).await;
                }
            }
        }
    };
}

store_suite!(memory, crate::bootstrap::init::memory_store);
store_suite!(sqlite, crate::bootstrap::init::sqlite_store);
store_suite!(postgres, crate::bootstrap::init::postgres_store);
