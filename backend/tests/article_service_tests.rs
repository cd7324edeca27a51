//! Integration tests for the article usecase over the in-memory store.

mod support;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use articles_service::db::repository::{ArticleRepository, RepositoryError};
use articles_service::services::{ArticleService, ArticleUsecase};

use support::{draft, seeded_repo, service_over, SlowRepository, StallingAuthors};

#[tokio::test]
async fn test_get_by_id_round_trip() {
    let (repo, ada, _) = seeded_repo();
    let service = service_over(&repo);

    let created = service.store(draft("Round trip", ada.id)).await.unwrap();
    let fetched = service.get_by_id(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.author.name, "Ada");
}

#[tokio::test]
async fn test_get_by_title() {
    let (repo, _, alan) = seeded_repo();
    let service = service_over(&repo);

    let created = service.store(draft("Computing Machinery", alan.id)).await.unwrap();
    let fetched = service.get_by_title("Computing Machinery").await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.author, alan);

    assert!(service.get_by_title("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_fetch_chains_cursors_without_gaps_or_overlap() {
    let (repo, ada, alan) = seeded_repo();
    let service = service_over(&repo);

    for i in 0..23 {
        let author = if i % 2 == 0 { ada.id } else { alan.id };
        service.store(draft(&format!("article {}", i), author)).await.unwrap();
    }

    let mut seen = Vec::new();
    let mut cursor = 0;
    loop {
        let page = service.fetch(cursor, 5).await.unwrap();
        assert!(page.items.len() <= 5);
        assert!(page.items.iter().all(|a| a.id > cursor));
        assert!(page.items.windows(2).all(|w| w[0].id < w[1].id));
        assert!(page.items.iter().all(|a| !a.author.name.is_empty()));

        seen.extend(page.items.iter().map(|a| a.id));
        match page.next_cursor {
            Some(next) => cursor = next,
            None => break,
        }
    }

    let distinct: HashSet<i64> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 23);
    assert_eq!(distinct.len(), 23);
}

#[tokio::test]
async fn test_delete_missing_leaves_store_unchanged() {
    let (repo, ada, _) = seeded_repo();
    let service = service_over(&repo);
    service.store(draft("kept", ada.id)).await.unwrap();

    let err = service.delete(999).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(repo.article_count(), 1);
}

#[tokio::test]
async fn test_store_with_unknown_author_creates_nothing() {
    let (repo, _, _) = seeded_repo();
    let service = service_over(&repo);

    let err = service.store(draft("orphan", 42)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(repo.article_count(), 0);
}

#[tokio::test]
async fn test_update_missing_article_is_not_found() {
    let (repo, ada, _) = seeded_repo();
    let service = service_over(&repo);

    let err = service.update(7, draft("nope", ada.id)).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_timeout_fails_and_writes_nothing() {
    let (repo, ada, _) = seeded_repo();
    let slow = Arc::new(SlowRepository::new(repo.clone(), Duration::from_millis(500)));
    let service = ArticleService::new(slow, repo.clone(), Duration::from_millis(50));

    let err = service.store(draft("late", ada.id)).await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.context().operation.as_deref(), Some("store_article"));

    // Let the abandoned delay elapse; the dropped call must not have written.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(repo.article_count(), 0);
}

#[tokio::test]
async fn test_timeout_on_fetch() {
    let (repo, _, _) = seeded_repo();
    let slow = Arc::new(SlowRepository::new(repo.clone(), Duration::from_millis(300)));
    let service = ArticleService::new(slow, repo, Duration::from_millis(20));

    assert!(service.fetch(0, 10).await.unwrap_err().is_timeout());
}

#[tokio::test]
async fn test_store_does_not_look_up_author_after_commit() {
    let (repo, ada, _) = seeded_repo();
    let authors = Arc::new(StallingAuthors::new(repo.clone(), 1, Duration::from_millis(300)));
    let service = ArticleService::new(repo.clone(), authors.clone(), Duration::from_millis(50));

    let stored = service.store(draft("late", ada.id)).await.unwrap();

    assert_eq!(stored.author, ada);
    assert_eq!(authors.calls(), 1);
    assert_eq!(repo.article_count(), 1);
}

#[tokio::test]
async fn test_store_past_deadline_at_commit_writes_nothing() {
    let (repo, ada, _) = seeded_repo();
    let slow = Arc::new(SlowRepository::writes_only(repo.clone(), Duration::from_millis(200)));
    let service = ArticleService::new(slow, repo.clone(), Duration::from_millis(30));

    let err = service.store(draft("late", ada.id)).await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.context().operation.as_deref(), Some("store_article"));
    assert_eq!(repo.article_count(), 0);
    assert!(service_over(&repo).get_by_title("late").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_update_does_not_look_up_author_after_commit() {
    let (repo, ada, alan) = seeded_repo();
    let original = repo.create(&draft("before", ada.id)).await.unwrap();
    let authors = Arc::new(StallingAuthors::new(repo.clone(), 1, Duration::from_millis(300)));
    let service = ArticleService::new(repo.clone(), authors.clone(), Duration::from_millis(50));

    let updated = service
        .update(original.id, draft("after", alan.id))
        .await
        .unwrap();

    assert_eq!(updated.title, "after");
    assert_eq!(updated.author, alan);
    assert_eq!(authors.calls(), 1);
}

#[tokio::test]
async fn test_update_past_deadline_at_commit_keeps_stored_row() {
    let (repo, ada, alan) = seeded_repo();
    let original = repo.create(&draft("before", ada.id)).await.unwrap();
    let slow = Arc::new(SlowRepository::writes_only(repo.clone(), Duration::from_millis(200)));
    let service = ArticleService::new(slow, repo.clone(), Duration::from_millis(30));

    let err = service
        .update(original.id, draft("after", alan.id))
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    let stored = ArticleRepository::get_by_id(&*repo, original.id).await.unwrap();
    assert_eq!(stored.title, "before");
    assert_eq!(stored.author_id(), ada.id);
    assert_eq!(repo.article_count(), 1);
}

#[tokio::test]
async fn test_delete_past_deadline_at_commit_keeps_row() {
    let (repo, ada, _) = seeded_repo();
    let original = repo.create(&draft("kept", ada.id)).await.unwrap();
    let slow = Arc::new(SlowRepository::writes_only(repo.clone(), Duration::from_millis(200)));
    let service = ArticleService::new(slow, repo.clone(), Duration::from_millis(30));

    assert!(service.delete(original.id).await.unwrap_err().is_timeout());
    assert_eq!(repo.article_count(), 1);
}
