//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use articles_service::db::repositories::LocalRepository;
use articles_service::db::repository::{ArticleRepository, AuthorRepository, RepositoryResult};
use articles_service::models::{Article, ArticlePage, Author, NewArticle};
use articles_service::services::ArticleService;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to the process
/// environment across parallel tests.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// In-memory store seeded with the authors Ada (id 1) and Alan (id 2).
pub fn seeded_repo() -> (Arc<LocalRepository>, Author, Author) {
    let repo = Arc::new(LocalRepository::new());
    let ada = repo.insert_author("Ada");
    let alan = repo.insert_author("Alan");
    (repo, ada, alan)
}

pub fn service_over(repo: &Arc<LocalRepository>) -> ArticleService {
    ArticleService::new(repo.clone(), repo.clone(), TEST_TIMEOUT)
}

pub fn draft(title: &str, author_id: i64) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        content: format!("content of {}", title),
        author_id,
    }
}

/// Article repository that sleeps before calls, then delegates.
pub struct SlowRepository {
    inner: Arc<LocalRepository>,
    delay: Duration,
    reads_delayed: bool,
}

impl SlowRepository {
    /// Delay every call.
    pub fn new(inner: Arc<LocalRepository>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            reads_delayed: true,
        }
    }

    /// Delay only `create`, `update` and `delete`.
    pub fn writes_only(inner: Arc<LocalRepository>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            reads_delayed: false,
        }
    }

    async fn read_delay(&self) {
        if self.reads_delayed {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl ArticleRepository for SlowRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.read_delay().await;
        self.inner.health_check().await
    }

    async fn list(&self, cursor: i64, page_size: i64) -> RepositoryResult<ArticlePage> {
        self.read_delay().await;
        self.inner.list(cursor, page_size).await
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Article> {
        self.read_delay().await;
        ArticleRepository::get_by_id(&*self.inner, id).await
    }

    async fn get_by_title(&self, title: &str) -> RepositoryResult<Article> {
        self.read_delay().await;
        self.inner.get_by_title(title).await
    }

    async fn create(&self, article: &NewArticle) -> RepositoryResult<Article> {
        tokio::time::sleep(self.delay).await;
        self.inner.create(article).await
    }

    async fn update(&self, article: &Article) -> RepositoryResult<Article> {
        tokio::time::sleep(self.delay).await;
        self.inner.update(article).await
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(id).await
    }
}

/// Author repository whose lookups after the first `fast_lookups` sleep.
pub struct StallingAuthors {
    inner: Arc<LocalRepository>,
    fast_lookups: usize,
    delay: Duration,
    calls: AtomicUsize,
}

impl StallingAuthors {
    pub fn new(inner: Arc<LocalRepository>, fast_lookups: usize, delay: Duration) -> Self {
        Self {
            inner,
            fast_lookups,
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorRepository for StallingAuthors {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Author> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.fast_lookups {
            tokio::time::sleep(self.delay).await;
        }
        AuthorRepository::get_by_id(&*self.inner, id).await
    }
}
